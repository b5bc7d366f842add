//! Test doubles for the hardware seams.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use motion::{Actuator, ActuatorError, Direction, Shutdown};
use sensors::{AnalogSource, Channel};
use std::convert::Infallible;

#[derive(Default)]
pub struct RecordingActuator {
    pub moves: Vec<Direction>,
    pub stops: usize,
    pub fail_next: Option<ActuatorError>,
}

impl Actuator for RecordingActuator {
    fn move_to(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        self.moves.push(direction);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// One `(light, wind)` pair per sample; the last pair repeats.
pub struct ScriptedSource {
    readings: Vec<(u16, u16)>,
    index: usize,
}

impl ScriptedSource {
    pub fn new(readings: &[(u16, u16)]) -> Self {
        ScriptedSource {
            readings: readings.to_vec(),
            index: 0,
        }
    }
}

impl AnalogSource for ScriptedSource {
    type Error = Infallible;

    fn read_channel(&mut self, channel: Channel) -> Result<u16, Infallible> {
        let (light, wind) = self.readings[self.index];
        match channel {
            Channel::Light => Ok(light),
            Channel::Wind => {
                self.index = (self.index + 1).min(self.readings.len() - 1);
                Ok(wind)
            }
        }
    }
}

#[derive(Default)]
pub struct MockPin {
    pub high: bool,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

/// Requests shutdown once the given number of milliseconds has been slept.
pub struct TrippingDelay {
    elapsed_ms: u32,
    trip: Option<(u32, Shutdown)>,
}

impl TrippingDelay {
    pub fn new(trip: Option<(u32, Shutdown)>) -> Self {
        TrippingDelay { elapsed_ms: 0, trip }
    }
}

impl DelayNs for TrippingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += ms;
        if let Some((at, shutdown)) = &self.trip {
            if self.elapsed_ms >= *at {
                shutdown.request();
            }
        }
    }
}
