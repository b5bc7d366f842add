pub mod motion;
pub mod shutdown;
pub mod states;

pub use motion::{Actuator, ActuatorDriver, ActuatorError, MotorLine, Timing};
pub use shutdown::{Interrupted, Shutdown};
pub use states::{ActuatorCommand, CoverState, Direction};
