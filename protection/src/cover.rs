//! Cover protection policy.
//!
//! Rules are evaluated in strict priority order every control cycle:
//!
//! 1. Wind safety: above `wind_max` the cover is retracted, whatever the light.
//! 2. Night: below `light_threshold` the cover is extended.
//! 3. Day: otherwise the cover is retracted.
//!
//! A rule whose target is already the current state issues nothing, so a
//! steady environment never re-triggers the motors.

use motion::{Actuator, ActuatorCommand, CoverState, Direction};
use sensors::SensorSample;

use crate::calibration::CalibrationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    WindSafety,
    Nightfall,
    Daybreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub trigger: Trigger,
}

/// Pure form of the policy: which move, if any, `current` needs for `sample`.
pub fn decide(
    current: CoverState,
    sample: &SensorSample,
    calibration: &CalibrationConfig,
) -> Option<Decision> {
    let (direction, trigger) = if sample.wind_speed > calibration.wind_max {
        (Direction::Retract, Trigger::WindSafety)
    } else if sample.light_raw < calibration.light_threshold {
        (Direction::Extend, Trigger::Nightfall)
    } else {
        (Direction::Retract, Trigger::Daybreak)
    };

    if direction.target_state() == current {
        return None;
    }
    Some(Decision { direction, trigger })
}

pub struct CoverStateMachine<A> {
    actuator: A,
    calibration: CalibrationConfig,
    current: CoverState,
    high_wind: bool,
}

impl<A> CoverStateMachine<A>
where
    A: Actuator,
{
    pub fn new(actuator: A, calibration: CalibrationConfig) -> CoverStateMachine<A> {
        CoverStateMachine {
            actuator,
            calibration,
            current: CoverState::Retracted,
            high_wind: false,
        }
    }

    pub fn state(&self) -> CoverState {
        self.current
    }

    pub fn calibration(&self) -> &CalibrationConfig {
        &self.calibration
    }

    pub fn in_high_wind(&self) -> bool {
        self.high_wind
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Applies the policy to `sample`, moving the cover if needed. Returns
    /// the command that completed, `None` for a no-op cycle or a failed move.
    pub fn evaluate(&mut self, sample: SensorSample) -> Option<ActuatorCommand> {
        self.track_wind(&sample);

        let decision = decide(self.current, &sample, &self.calibration)?;
        match decision.trigger {
            Trigger::WindSafety => log::warn!("ALERT: High wind! Emergency retraction."),
            Trigger::Nightfall => log::info!("EVENT: Nightfall. Engaging protection."),
            Trigger::Daybreak => log::info!("EVENT: Daybreak. Releasing panel."),
        }

        let previous = self.current;
        self.current = CoverState::Moving;
        match self.actuator.move_to(decision.direction) {
            Ok(()) => {
                self.current = decision.direction.target_state();
                log::info!("Cover now {:?}", self.current);
                Some(decision.direction.into())
            }
            Err(e) => {
                // Position is unconfirmed; keep the old state so the next
                // cycle asks for the move again.
                self.current = previous;
                log::error!("Cover move {:?} failed: {}", decision.direction, e);
                None
            }
        }
    }

    /// Releases the motors, used when the control loop exits.
    pub fn release(&mut self) {
        if let Err(e) = self.actuator.execute(ActuatorCommand::Stop) {
            log::error!("Failed to stop actuator: {}", e);
        }
    }

    fn track_wind(&mut self, sample: &SensorSample) {
        let high_wind = sample.wind_speed > self.calibration.wind_max;
        if high_wind && !self.high_wind {
            log::warn!(
                "ALERT: Wind {:.1} m/s above limit of {:.1} m/s",
                sample.wind_speed,
                self.calibration.wind_max
            );
        } else if !high_wind && self.high_wind {
            log::info!("Wind back to {:.1} m/s", sample.wind_speed);
        }
        self.high_wind = high_wind;
    }
}
