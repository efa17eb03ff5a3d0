//! Timed switch transition check.
//!
//! One call drives the actuator, samples the debouncer and classifies the
//! result against a `[min, max]` window of elapsed ticks.

use actuator_traits::{Actuator, Direction, LimitSwitches};
use eyre::WrapErr;

use crate::config::{Ticks, Window};
use crate::debounce::{DebounceResult, Debouncer, SwitchState};
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Desired settled state of one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchExpect {
    Rested,
    Actuated,
    /// Never satisfied; the check can only end through its ceiling.
    Masked,
}

impl SwitchExpect {
    pub fn matches(self, state: SwitchState) -> bool {
        match self {
            SwitchExpect::Rested => state == SwitchState::Rested,
            SwitchExpect::Actuated => state == SwitchState::Actuated,
            SwitchExpect::Masked => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Desired state observed inside the window.
    Reached,
    /// Keep polling.
    Waiting,
    /// Ceiling reached; checked before the desired state.
    MaxTimeout,
    /// Desired state observed at or before the floor.
    MinTimeout,
}

/// Classify a debounce sample against the expectation and window.
pub fn classify(
    sample: &DebounceResult,
    expect: (SwitchExpect, SwitchExpect),
    window: Window,
    elapsed: Ticks,
) -> TransitionOutcome {
    if elapsed >= window.max {
        return TransitionOutcome::MaxTimeout;
    }
    if expect.0.matches(sample.x) && expect.1.matches(sample.y) {
        if elapsed <= window.min {
            return TransitionOutcome::MinTimeout;
        }
        return TransitionOutcome::Reached;
    }
    TransitionOutcome::Waiting
}

/// Drive, sample, classify. Returns the outcome together with the sample.
pub fn check_transition<S, A>(
    debouncer: &mut Debouncer,
    switches: &mut S,
    actuator: &mut A,
    expect: (SwitchExpect, SwitchExpect),
    direction: Direction,
    window: Window,
    elapsed: Ticks,
) -> Result<(TransitionOutcome, DebounceResult)>
where
    S: LimitSwitches + ?Sized,
    A: Actuator + ?Sized,
{
    actuator
        .drive(direction)
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err_with(|| format!("driving actuator {direction}"))?;
    let sample = debouncer.sample(switches)?;
    Ok((classify(&sample, expect, window, elapsed), sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use SwitchExpect::{Actuated, Masked, Rested};

    fn sample(x: SwitchState, y: SwitchState) -> DebounceResult {
        DebounceResult {
            x,
            y,
            settled: true,
        }
    }

    #[rstest]
    #[case(2, TransitionOutcome::MinTimeout)]
    #[case(5, TransitionOutcome::MinTimeout)]
    #[case(6, TransitionOutcome::Reached)]
    #[case(99, TransitionOutcome::Reached)]
    #[case(100, TransitionOutcome::MaxTimeout)]
    fn window_edges(#[case] elapsed: Ticks, #[case] want: TransitionOutcome) {
        let s = sample(SwitchState::Rested, SwitchState::Actuated);
        let got = classify(&s, (Rested, Actuated), Window::new(5, 100), elapsed);
        assert_eq!(got, want);
    }

    #[test]
    fn unmatched_state_waits() {
        let s = sample(SwitchState::Rested, SwitchState::Rested);
        let got = classify(&s, (Rested, Actuated), Window::new(5, 100), 50);
        assert_eq!(got, TransitionOutcome::Waiting);
    }

    #[test]
    fn masked_never_matches() {
        for x in [SwitchState::Rested, SwitchState::Actuated] {
            let s = sample(x, x);
            assert_eq!(
                classify(&s, (Masked, Masked), Window::new(0, 10), 9),
                TransitionOutcome::Waiting
            );
        }
    }
}
