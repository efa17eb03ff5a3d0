//! Raspberry Pi GPIO backend (`rppal`).
//!
//! The direction pins are always written as a pair: exactly one of them is
//! high while moving, both are low when stopped.

use actuator_traits::{Actuator, Direction, HwResult, LimitSwitches};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::error::{HwError, Result};

/// BCM pin assignment for one actuator.
#[derive(Debug, Clone, Copy)]
pub struct PinMap {
    pub limit_x: u8,
    pub limit_y: u8,
    pub dir_x_to_y: u8,
    pub dir_y_to_x: u8,
    /// Switch reads low when actuated.
    pub active_low: bool,
}

impl PinMap {
    fn check_unique(&self) -> Result<()> {
        let pins = [self.limit_x, self.limit_y, self.dir_x_to_y, self.dir_y_to_x];
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(HwError::PinConflict(*a));
            }
        }
        Ok(())
    }
}

pub struct GpioSwitches {
    x: InputPin,
    y: InputPin,
    active_low: bool,
}

impl GpioSwitches {
    fn read(&self, pin: &InputPin) -> bool {
        pin.is_high() != self.active_low
    }
}

impl LimitSwitches for GpioSwitches {
    fn read_x(&mut self) -> HwResult<bool> {
        Ok(self.read(&self.x))
    }

    fn read_y(&mut self) -> HwResult<bool> {
        Ok(self.read(&self.y))
    }
}

pub struct GpioActuator {
    x_to_y: OutputPin,
    y_to_x: OutputPin,
    current: Option<Direction>,
}

impl Actuator for GpioActuator {
    fn drive(&mut self, direction: Direction) -> HwResult<()> {
        if self.current == Some(direction) {
            return Ok(());
        }
        match direction {
            Direction::TowardY => {
                self.y_to_x.set_low();
                self.x_to_y.set_high();
            }
            Direction::TowardX => {
                self.x_to_y.set_low();
                self.y_to_x.set_high();
            }
            Direction::Stop => {
                self.x_to_y.set_low();
                self.y_to_x.set_low();
            }
        }
        tracing::trace!(%direction, "gpio drive");
        self.current = Some(direction);
        Ok(())
    }
}

impl Drop for GpioActuator {
    fn drop(&mut self) {
        self.x_to_y.set_low();
        self.y_to_x.set_low();
    }
}

/// Claim all four pins. The actuator starts stopped.
pub fn open(pins: PinMap) -> Result<(GpioSwitches, GpioActuator)> {
    pins.check_unique()?;
    let gpio = Gpio::new()?;
    let (x, y) = if pins.active_low {
        (
            gpio.get(pins.limit_x)?.into_input_pullup(),
            gpio.get(pins.limit_y)?.into_input_pullup(),
        )
    } else {
        (
            gpio.get(pins.limit_x)?.into_input_pulldown(),
            gpio.get(pins.limit_y)?.into_input_pulldown(),
        )
    };
    let mut x_to_y = gpio.get(pins.dir_x_to_y)?.into_output();
    let mut y_to_x = gpio.get(pins.dir_y_to_x)?.into_output();
    x_to_y.set_low();
    y_to_x.set_low();
    tracing::info!(
        limit_x = pins.limit_x,
        limit_y = pins.limit_y,
        dir_x_to_y = pins.dir_x_to_y,
        dir_y_to_x = pins.dir_y_to_x,
        active_low = pins.active_low,
        "gpio actuator ready"
    );
    Ok((
        GpioSwitches {
            x,
            y,
            active_low: pins.active_low,
        },
        GpioActuator {
            x_to_y,
            y_to_x,
            current: Some(Direction::Stop),
        },
    ))
}
