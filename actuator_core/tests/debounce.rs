use actuator_core::mocks::ScriptedSwitches;
use actuator_core::{DebounceResult, Debouncer, SwitchState};

fn run(debouncer: &mut Debouncer, switches: &mut ScriptedSwitches, n: usize) -> Vec<DebounceResult> {
    (0..n).map(|_| debouncer.sample(switches).expect("sample")).collect()
}

#[test]
fn rested_pair_settles_after_threshold() {
    let mut sw = ScriptedSwitches::fixed(false, false);
    let mut d = Debouncer::new(3);
    let out = run(&mut d, &mut sw, 5);
    let flags: Vec<bool> = out.iter().map(|r| r.settled).collect();
    assert_eq!(flags, vec![false, false, false, true, true]);
}

#[test]
fn x_change_settles_after_four_stable_polls() {
    // settle 3: let both settle rested, then X flips to actuated and stays
    let mut script = vec![(false, false); 6];
    script.extend(std::iter::repeat_n((true, false), 10));
    let mut sw = ScriptedSwitches::new(script);
    let mut d = Debouncer::new(3);
    let before = run(&mut d, &mut sw, 6);
    assert!(before.last().is_some_and(|r| r.settled));

    let after = run(&mut d, &mut sw, 5);
    // change poll plus three stable polls: still rested, flag false
    for r in &after[..4] {
        assert_eq!(r.x, SwitchState::Rested);
        assert!(!r.settled);
    }
    // fourth stable poll after the change
    assert_eq!(after[4].x, SwitchState::Actuated);
    assert_eq!(after[4].y, SwitchState::Rested);
    assert!(after[4].settled);
}

#[test]
fn flag_needs_both_switches_stable() {
    // Y keeps toggling while X is steady
    let script: Vec<(bool, bool)> = (0..20).map(|i| (true, i % 2 == 0)).collect();
    let mut sw = ScriptedSwitches::new(script);
    let mut d = Debouncer::new(3);
    let out = run(&mut d, &mut sw, 20);
    assert!(out.iter().all(|r| !r.settled));
    assert!(out.last().is_some_and(|r| r.x == SwitchState::Actuated));
    assert!(out.iter().all(|r| r.y == SwitchState::Rested));
}

#[test]
fn reset_restores_initial_state() {
    let mut sw = ScriptedSwitches::fixed(true, true);
    let mut d = Debouncer::new(2);
    run(&mut d, &mut sw, 10);
    assert_eq!(d.x().settled(), SwitchState::Actuated);
    d.reset();
    assert_eq!(d.x().settled(), SwitchState::Rested);
    assert_eq!(d.y().settled(), SwitchState::Rested);
    assert_eq!(d.x().count(), 0);
}
