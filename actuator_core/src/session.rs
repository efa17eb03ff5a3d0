//! Per-run homing state: phase, fault record, phase timer, calibration.

use crate::calibration::TravelCalibration;
use crate::config::Ticks;
use crate::debounce::DebounceResult;
use crate::phase::{Fault, FaultKind, Phase, Zone};
use crate::status::HomingStatus;

#[derive(Debug, Clone)]
pub struct HomingSession {
    phase: Phase,
    fault: Option<Fault>,
    entered_at: Ticks,
    elapsed: Ticks,
    calibration: TravelCalibration,
    zone: Zone,
    last_sample: DebounceResult,
}

impl Default for HomingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl HomingSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Reset,
            fault: None,
            entered_at: 0,
            elapsed: 0,
            calibration: TravelCalibration::default(),
            zone: Zone::A,
            last_sample: DebounceResult::default(),
        }
    }

    /// Back to `Reset` with everything zeroed. The debouncer is not touched.
    pub fn restart(&mut self) {
        let last_sample = self.last_sample;
        *self = Self::new();
        self.last_sample = last_sample;
    }

    pub fn status(&self) -> HomingStatus {
        match self.phase {
            Phase::Parked => HomingStatus::Success,
            Phase::FaultMax | Phase::FaultMin => {
                HomingStatus::Error(self.fault.map_or(self.phase, |f| f.phase))
            }
            Phase::Reset
            | Phase::DebounceWait
            | Phase::ZoneDisambiguate
            | Phase::SeekY
            | Phase::SeekX
            | Phase::ReturnToX
            | Phase::ClearX
            | Phase::MeasureXToY
            | Phase::PassY
            | Phase::ReenterY
            | Phase::ClearY
            | Phase::MeasureYToX
            | Phase::PassX
            | Phase::ReenterX
            | Phase::LeaveX
            | Phase::MidpointSeek => HomingStatus::InProgress,
        }
    }

    /// Update the phase timer for this poll and return the elapsed ticks.
    pub(crate) fn tick(&mut self, tick: Ticks) -> Ticks {
        self.elapsed = tick.saturating_sub(self.entered_at);
        self.elapsed
    }

    pub(crate) fn enter(&mut self, next: Phase, tick: Ticks) {
        tracing::debug!(
            from = self.phase.name(),
            to = next.name(),
            elapsed = self.elapsed,
            tick,
            "phase transition"
        );
        self.phase = next;
        self.entered_at = tick;
        self.elapsed = 0;
    }

    /// Record a fault for the current phase and move to the matching terminal phase.
    pub(crate) fn fail(&mut self, kind: FaultKind, tick: Ticks) {
        let fault = Fault {
            phase: self.phase,
            kind,
        };
        tracing::warn!(
            phase = fault.phase.name(),
            code = fault.phase.code(),
            kind = kind.name(),
            elapsed = self.elapsed,
            "homing fault"
        );
        self.fault = Some(fault);
        let terminal = match kind {
            FaultKind::MinTimeout => Phase::FaultMin,
            FaultKind::DebounceTimeout | FaultKind::InvalidZone | FaultKind::MaxTimeout => {
                Phase::FaultMax
            }
        };
        self.enter(terminal, tick);
    }

    pub(crate) fn set_zone(&mut self, zone: Zone) {
        self.zone = zone;
    }

    pub(crate) fn set_sample(&mut self, sample: DebounceResult) {
        self.last_sample = sample;
    }

    pub(crate) fn calibration_mut(&mut self) -> &mut TravelCalibration {
        &mut self.calibration
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn elapsed(&self) -> Ticks {
        self.elapsed
    }

    pub fn calibration(&self) -> TravelCalibration {
        self.calibration
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn last_sample(&self) -> DebounceResult {
        self.last_sample
    }
}
