//! Host stand-in for the panel hardware. Plays a fixed day of weather
//! through the real control loop and shuts it down at the end.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use motion::{ActuatorDriver, Shutdown};
use protection::{CalibrationConfig, ControlLoop, CoverStateMachine, Indicator};
use sensors::{AnalogSource, Channel, SensorReader};
use std::convert::Infallible;
use std::thread;
use std::time::Duration;

struct Phase {
    name: &'static str,
    light_raw: u16,
    wind_raw: u16,
    cycles: u32,
}

static SCRIPT: [Phase; 5] = [
    Phase {
        name: "dusk",
        light_raw: 200,
        wind_raw: 100,
        cycles: 1,
    },
    Phase {
        name: "calm night",
        light_raw: 200,
        wind_raw: 100,
        cycles: 2,
    },
    Phase {
        name: "morning",
        light_raw: 600,
        wind_raw: 100,
        cycles: 2,
    },
    Phase {
        name: "evening",
        light_raw: 200,
        wind_raw: 100,
        cycles: 1,
    },
    Phase {
        name: "night storm",
        light_raw: 200,
        wind_raw: 700,
        cycles: 2,
    },
];

struct ScriptedWeather {
    phase: usize,
    cycle: u32,
    shutdown: Shutdown,
}

impl AnalogSource for ScriptedWeather {
    type Error = Infallible;

    fn read_channel(&mut self, channel: Channel) -> Result<u16, Infallible> {
        let phase = &SCRIPT[self.phase];
        if self.cycle == 0 && channel == Channel::Light {
            log::info!("Simulating {}", phase.name);
        }
        match channel {
            Channel::Light => Ok(phase.light_raw),
            Channel::Wind => {
                self.advance();
                Ok(phase.wind_raw)
            }
        }
    }
}

impl ScriptedWeather {
    fn advance(&mut self) {
        self.cycle += 1;
        if self.cycle < SCRIPT[self.phase].cycles {
            return;
        }
        self.cycle = 0;
        if self.phase + 1 < SCRIPT.len() {
            self.phase += 1;
        } else {
            log::info!("End of simulated day");
            self.shutdown.request();
        }
    }
}

/// Output line that only reports level changes.
struct LoggedPin {
    name: &'static str,
    high: bool,
}

impl LoggedPin {
    fn new(name: &'static str) -> Self {
        LoggedPin { name, high: false }
    }

    fn set(&mut self, high: bool) {
        if self.high != high {
            log::debug!("{} -> {}", self.name, if high { "HIGH" } else { "LOW" });
        }
        self.high = high;
    }
}

impl ErrorType for LoggedPin {
    type Error = Infallible;
}

impl OutputPin for LoggedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.set(true);
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

pub fn run(calibration: CalibrationConfig) -> anyhow::Result<()> {
    let shutdown = Shutdown::new();
    let weather = ScriptedWeather {
        phase: 0,
        cycle: 0,
        shutdown: shutdown.clone(),
    };

    let driver = ActuatorDriver::new(
        LoggedPin::new("motor A forward"),
        LoggedPin::new("motor A reverse"),
        LoggedPin::new("motor B forward"),
        LoggedPin::new("motor B reverse"),
        ThreadDelay,
        calibration.timing(),
        shutdown.clone(),
    );

    let mut control = ControlLoop::new(
        SensorReader::new(weather, calibration.wind_factor),
        CoverStateMachine::new(driver, calibration),
        Indicator::new(LoggedPin::new("indicator")),
        ThreadDelay,
        shutdown,
    );
    control.run();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_requests_shutdown_after_last_phase() {
        let shutdown = Shutdown::new();
        let mut reader = SensorReader::new(
            ScriptedWeather {
                phase: 0,
                cycle: 0,
                shutdown: shutdown.clone(),
            },
            0.048,
        );
        let total: u32 = SCRIPT.iter().map(|p| p.cycles).sum();

        let samples: Vec<_> = (0..total).map(|_| reader.sample()).collect();

        assert!(shutdown.is_requested());
        assert_eq!(samples[0].light_raw, 200);
        assert_eq!(samples[3].light_raw, 600);
        assert_eq!(samples[total as usize - 1].wind_raw, 700);
    }
}
