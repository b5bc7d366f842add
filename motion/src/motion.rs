use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};
use std::time::Duration;
use thiserror::Error;

use crate::shutdown::Shutdown;
use crate::states::{ActuatorCommand, Direction};

/// The four H-bridge inputs, in the order the driver stores them.
/// Channel A and channel B move the cover together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorLine {
    AForward,
    AReverse,
    BForward,
    BReverse,
}

impl MotorLine {
    pub const ALL: [MotorLine; 4] = [
        MotorLine::AForward,
        MotorLine::AReverse,
        MotorLine::BForward,
        MotorLine::BReverse,
    ];

    /// Whether this line is asserted while travelling in `direction`
    fn asserted_for(&self, direction: Direction) -> bool {
        match direction {
            Direction::Extend => matches!(self, MotorLine::AForward | MotorLine::BForward),
            Direction::Retract => matches!(self, MotorLine::AReverse | MotorLine::BReverse),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActuatorError {
    #[error("actuator fault on {line:?}: {kind:?}")]
    Fault { line: MotorLine, kind: ErrorKind },
    #[error("move aborted by shutdown request")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between releasing the motors and driving a new direction
    pub settle: Duration,
    /// Time for the cover to travel end to end
    pub travel: Duration,
}

/// Anything that can move the cover. The state machine only talks to this.
pub trait Actuator {
    /// Blocking move in `direction`; the motors are stopped on return,
    /// whatever the outcome.
    fn move_to(&mut self, direction: Direction) -> Result<(), ActuatorError>;

    /// Releases every motor line. Never fails.
    fn stop(&mut self);

    fn execute(&mut self, command: ActuatorCommand) -> Result<(), ActuatorError> {
        match command.direction() {
            Some(direction) => self.move_to(direction),
            None => {
                self.stop();
                Ok(())
            }
        }
    }
}

/// Open-loop driver for the two cover motors. There is no position
/// feedback; a move is considered complete once `Timing::travel` elapses.
pub struct ActuatorDriver<P, D> {
    lines: [P; 4],
    delay: D,
    timing: Timing,
    shutdown: Shutdown,
    energized: bool,
}

impl<P, D> ActuatorDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(
        a_forward: P,
        a_reverse: P,
        b_forward: P,
        b_reverse: P,
        delay: D,
        timing: Timing,
        shutdown: Shutdown,
    ) -> ActuatorDriver<P, D> {
        let mut driver = ActuatorDriver {
            lines: [a_forward, a_reverse, b_forward, b_reverse],
            delay,
            timing,
            shutdown,
            // Pin levels are unknown at power-up, force the first release
            energized: true,
        };
        driver.release();
        driver
    }

    pub fn is_stopped(&self) -> bool {
        !self.energized
    }

    fn release(&mut self) {
        if !self.energized {
            return;
        }

        let mut released = true;
        for (line, pin) in MotorLine::ALL.iter().zip(self.lines.iter_mut()) {
            if let Err(e) = pin.set_low() {
                log::error!("Failed to release motor line {:?}: {:?}", line, e.kind());
                released = false;
            }
        }
        // A line that refused to go low is retried on the next stop
        self.energized = !released;
    }

    fn drive(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        self.energized = true;

        // Inactive lines first so the two inputs of a bridge never overlap
        for level_high in [false, true] {
            for (line, pin) in MotorLine::ALL.iter().zip(self.lines.iter_mut()) {
                if line.asserted_for(direction) != level_high {
                    continue;
                }
                let result = if level_high { pin.set_high() } else { pin.set_low() };
                result.map_err(|e| ActuatorError::Fault {
                    line: *line,
                    kind: e.kind(),
                })?;
            }
        }
        Ok(())
    }

    fn wait(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        self.shutdown
            .wait(&mut self.delay, duration)
            .map_err(|_| ActuatorError::Aborted)
    }
}

impl<P, D> Actuator for ActuatorDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn move_to(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        self.release();
        self.wait(self.timing.settle)?;

        log::info!("STATUS: {}", direction.status());

        let travel = Travel::engage(self, direction)?;
        let duration = travel.driver.timing.travel;
        travel.driver.wait(duration)?;
        log::debug!("Travel of {:?} complete after {:?}", direction, duration);
        Ok(())
    }

    fn stop(&mut self) {
        self.release();
    }
}

/// Motors driven for the lifetime of this guard; dropping it releases them.
struct Travel<'d, P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    driver: &'d mut ActuatorDriver<P, D>,
}

impl<'d, P, D> Travel<'d, P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn engage(
        driver: &'d mut ActuatorDriver<P, D>,
        direction: Direction,
    ) -> Result<Travel<'d, P, D>, ActuatorError> {
        let travel = Travel { driver };
        travel.driver.drive(direction)?;
        Ok(travel)
    }
}

impl<P, D> Drop for Travel<'_, P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn drop(&mut self) {
        self.driver.release();
    }
}
