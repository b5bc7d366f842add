use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use motion::{Actuator, ActuatorCommand, CoverState, Shutdown};
use sensors::{AnalogSource, SensorReader, SensorSample};

use crate::cover::CoverStateMachine;
use crate::indicator::{generating, Indicator};

/// What one control cycle saw and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub sample: SensorSample,
    pub generating: bool,
    pub command: Option<ActuatorCommand>,
    pub state: CoverState,
}

/// Read, decide, act, sleep. Runs on a single thread; a cover move blocks
/// the loop for the whole settle and travel time.
pub struct ControlLoop<S, A, I, D> {
    reader: SensorReader<S>,
    cover: CoverStateMachine<A>,
    indicator: Indicator<I>,
    delay: D,
    shutdown: Shutdown,
}

impl<S, A, I, D> ControlLoop<S, A, I, D>
where
    S: AnalogSource,
    A: Actuator,
    I: OutputPin,
    D: DelayNs,
{
    pub fn new(
        reader: SensorReader<S>,
        cover: CoverStateMachine<A>,
        indicator: Indicator<I>,
        delay: D,
        shutdown: Shutdown,
    ) -> ControlLoop<S, A, I, D> {
        ControlLoop {
            reader,
            cover,
            indicator,
            delay,
            shutdown,
        }
    }

    pub fn cover(&self) -> &CoverStateMachine<A> {
        &self.cover
    }

    pub fn indicator(&self) -> &Indicator<I> {
        &self.indicator
    }

    pub fn cycle(&mut self) -> CycleReport {
        let sample = self.reader.sample();
        let light_threshold = self.cover.calibration().light_threshold;

        let generating = generating(&sample, light_threshold);
        self.indicator.show(generating);

        log::debug!(
            "Light: {} | Wind: {} ({:.1} m/s) | Generating: {}",
            sample.light_raw,
            sample.wind_raw,
            sample.wind_speed,
            generating
        );

        let command = self.cover.evaluate(sample);
        CycleReport {
            sample,
            generating,
            command,
            state: self.cover.state(),
        }
    }

    /// Cycles until shutdown is requested, then releases the motors.
    /// Returns the number of cycles run.
    pub fn run(&mut self) -> u64 {
        let interval = self.cover.calibration().cycle_interval;
        log::info!("Control loop started, cycle interval {:?}", interval);

        let mut cycles = 0;
        while !self.shutdown.is_requested() {
            self.cycle();
            cycles += 1;
            if self.shutdown.wait(&mut self.delay, interval).is_err() {
                break;
            }
        }

        self.cover.release();
        log::info!(
            "Control loop stopped after {} cycles, cover {:?}",
            cycles,
            self.cover.state()
        );
        cycles
    }
}
