#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary TOML must either be rejected or produce a config whose
    // validation and timing conversion never panic.
    if let Ok(cfg) = actuator_config::load_toml(data)
        && cfg.validate().is_ok()
    {
        let timing: actuator_core::TimingCfg = (&cfg.timing).into();
        let _ = timing.validate();
    }
});
