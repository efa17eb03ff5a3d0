//! Maps `Box<dyn Error>` from capability boundaries to typed `HomingError`.
//!
//! The traits in `actuator_traits` return `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `actuator_hardware::HwError` downcasting.

use crate::error::HomingError;

/// Map a capability error to a typed `HomingError`.
///
/// Known hardware error types are downcast first; anything else is carried
/// as its message.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> HomingError {
    #[cfg(feature = "hardware-errors")]
    {
        use actuator_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::PinConflict(_) => HomingError::Config(hw.to_string()),
                other => HomingError::HardwareFault(other.to_string()),
            };
        }
    }

    HomingError::Hardware(e.to_string())
}
