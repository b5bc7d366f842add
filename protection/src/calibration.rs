use motion::Timing;
use std::time::Duration;

pub const LIGHT_THRESHOLD: u16 = 400;
/// ADC counts to m/s
pub const WIND_FACTOR: f32 = 0.048;
/// m/s
pub const WIND_MAX: f32 = 30.0;
pub const TRAVEL_DURATION: Duration = Duration::from_millis(5000);
pub const SETTLE_DURATION: Duration = Duration::from_millis(500);
pub const CYCLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Thresholds and timings fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Single day/night boundary on the raw light reading, no hysteresis
    pub light_threshold: u16,
    pub wind_factor: f32,
    pub wind_max: f32,
    pub travel_duration: Duration,
    pub settle_duration: Duration,
    pub cycle_interval: Duration,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            light_threshold: LIGHT_THRESHOLD,
            wind_factor: WIND_FACTOR,
            wind_max: WIND_MAX,
            travel_duration: TRAVEL_DURATION,
            settle_duration: SETTLE_DURATION,
            cycle_interval: CYCLE_INTERVAL,
        }
    }
}

impl CalibrationConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            settle: self.settle_duration,
            travel: self.travel_duration,
        }
    }
}
