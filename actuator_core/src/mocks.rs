//! Test and helper mocks for actuator_core.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use actuator_traits::{Actuator, Direction, HwResult, LimitSwitches};

/// Switches that replay a script of raw `(x, y)` readings, one pair per
/// sample. The last pair repeats once the script is exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSwitches {
    script: VecDeque<(bool, bool)>,
    last: (bool, bool),
    pending_y: Option<bool>,
}

impl ScriptedSwitches {
    pub fn new(script: impl IntoIterator<Item = (bool, bool)>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: (false, false),
            pending_y: None,
        }
    }

    /// Constant readings.
    pub fn fixed(x: bool, y: bool) -> Self {
        let mut s = Self::new([]);
        s.last = (x, y);
        s
    }
}

impl LimitSwitches for ScriptedSwitches {
    fn read_x(&mut self) -> HwResult<bool> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.pending_y = Some(self.last.1);
        Ok(self.last.0)
    }

    fn read_y(&mut self) -> HwResult<bool> {
        Ok(self.pending_y.take().unwrap_or(self.last.1))
    }
}

/// Actuator that records every command it receives, including repeats.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    log: Rc<RefCell<Vec<Direction>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the command log.
    pub fn log(&self) -> Rc<RefCell<Vec<Direction>>> {
        Rc::clone(&self.log)
    }

    pub fn last(&self) -> Option<Direction> {
        self.log.borrow().last().copied()
    }
}

impl Actuator for RecordingActuator {
    fn drive(&mut self, direction: Direction) -> HwResult<()> {
        self.log.borrow_mut().push(direction);
        Ok(())
    }
}

/// Actuator whose every command fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingActuator;

impl Actuator for FailingActuator {
    fn drive(&mut self, _direction: Direction) -> HwResult<()> {
        Err(Box::new(std::io::Error::other("actuator driver offline")))
    }
}
