pub mod calibration;
pub mod control;
pub mod cover;
pub mod indicator;

#[cfg(test)]
mod mock;

pub use calibration::CalibrationConfig;
pub use control::{ControlLoop, CycleReport};
pub use cover::{decide, CoverStateMachine, Decision, Trigger};
pub use indicator::Indicator;
