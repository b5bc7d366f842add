pub mod sensors {
    use std::fmt::Debug;
    use thiserror::Error;

    /// Full scale of the 10-bit analog readings.
    pub const ADC_MAX: u16 = 1023;

    /// Reading used for a channel that has never been read successfully.
    /// Full-scale light reads as daylight and full-scale wind as a storm,
    /// both of which keep the cover retracted.
    pub const SENTINEL_RAW: u16 = ADC_MAX;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Channel {
        Light,
        Wind,
    }

    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum SensorError {
        #[error("{channel:?} sensor unavailable")]
        Unavailable { channel: Channel },
    }

    /// Raw analog input, one 10-bit reading per channel.
    pub trait AnalogSource {
        type Error: Debug;

        fn read_channel(&mut self, channel: Channel) -> Result<u16, Self::Error>;
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct SensorSample {
        pub light_raw: u16,
        pub wind_raw: u16,
        /// m/s
        pub wind_speed: f32,
    }

    impl SensorSample {
        pub fn new(light_raw: u16, wind_raw: u16, wind_factor: f32) -> Self {
            SensorSample {
                light_raw,
                wind_raw,
                wind_speed: wind_raw as f32 * wind_factor,
            }
        }
    }

    pub struct SensorReader<A> {
        source: A,
        wind_factor: f32,
        last_light: Option<u16>,
        last_wind: Option<u16>,
    }

    impl<A> SensorReader<A>
    where
        A: AnalogSource,
    {
        pub fn new(source: A, wind_factor: f32) -> SensorReader<A> {
            SensorReader {
                source,
                wind_factor,
                last_light: None,
                last_wind: None,
            }
        }

        /// Reads both channels, reporting the first one that fails.
        pub fn try_sample(&mut self) -> Result<SensorSample, SensorError> {
            let light_raw = self.read(Channel::Light)?;
            let wind_raw = self.read(Channel::Wind)?;
            Ok(SensorSample::new(light_raw, wind_raw, self.wind_factor))
        }

        /// Reads both channels, never failing. A channel that cannot be read
        /// repeats its last good value, or `SENTINEL_RAW` if it has none.
        pub fn sample(&mut self) -> SensorSample {
            let light_raw = self.read_or_fallback(Channel::Light);
            let wind_raw = self.read_or_fallback(Channel::Wind);
            SensorSample::new(light_raw, wind_raw, self.wind_factor)
        }

        fn read_or_fallback(&mut self, channel: Channel) -> u16 {
            match self.read(channel) {
                Ok(raw) => raw,
                Err(e) => {
                    let fallback = self.last_known(channel).unwrap_or(SENTINEL_RAW);
                    log::warn!("{}, using {} instead", e, fallback);
                    fallback
                }
            }
        }

        fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
            let raw = match self.source.read_channel(channel) {
                Ok(raw) => raw,
                Err(e) => {
                    log::debug!("Reading {:?} channel failed: {:?}", channel, e);
                    return Err(SensorError::Unavailable { channel });
                }
            };

            let raw = if raw > ADC_MAX {
                log::warn!("{:?} reading {} out of range, clamped to {}", channel, raw, ADC_MAX);
                ADC_MAX
            } else {
                raw
            };

            match channel {
                Channel::Light => self.last_light = Some(raw),
                Channel::Wind => self.last_wind = Some(raw),
            }
            Ok(raw)
        }

        fn last_known(&self, channel: Channel) -> Option<u16> {
            match channel {
                Channel::Light => self.last_light,
                Channel::Wind => self.last_wind,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::VecDeque;

        /// Replays queued readings; `None` simulates a failed conversion.
        struct ScriptedSource {
            light: VecDeque<Option<u16>>,
            wind: VecDeque<Option<u16>>,
        }

        impl ScriptedSource {
            fn new(light: &[Option<u16>], wind: &[Option<u16>]) -> Self {
                ScriptedSource {
                    light: light.iter().copied().collect(),
                    wind: wind.iter().copied().collect(),
                }
            }
        }

        impl AnalogSource for ScriptedSource {
            type Error = ();

            fn read_channel(&mut self, channel: Channel) -> Result<u16, ()> {
                let queue = match channel {
                    Channel::Light => &mut self.light,
                    Channel::Wind => &mut self.wind,
                };
                queue.pop_front().flatten().ok_or(())
            }
        }

        #[test]
        fn converts_wind_to_metres_per_second() {
            let source = ScriptedSource::new(&[Some(200)], &[Some(100)]);
            let mut reader = SensorReader::new(source, 0.048);
            let sample = reader.sample();

            assert_eq!(sample.light_raw, 200);
            assert_eq!(sample.wind_raw, 100);
            assert!((sample.wind_speed - 4.8).abs() < 1e-4);
        }

        #[test]
        fn strong_wind_exceeds_thirty_metres_per_second() {
            let sample = SensorSample::new(200, 700, 0.048);
            assert!((sample.wind_speed - 33.6).abs() < 1e-4);
            assert!(sample.wind_speed > 30.0);
        }

        #[test]
        fn failed_read_repeats_last_known_value() {
            let source = ScriptedSource::new(&[Some(650), None], &[Some(90), None]);
            let mut reader = SensorReader::new(source, 0.048);

            let first = reader.sample();
            let second = reader.sample();

            assert_eq!(first, second);
        }

        #[test]
        fn channel_without_history_reads_as_sentinel() {
            let source = ScriptedSource::new(&[Some(300)], &[None]);
            let mut reader = SensorReader::new(source, 0.048);

            let sample = reader.sample();

            assert_eq!(sample.light_raw, 300);
            assert_eq!(sample.wind_raw, SENTINEL_RAW);
        }

        #[test]
        fn try_sample_reports_unavailable_channel() {
            let source = ScriptedSource::new(&[None], &[Some(10)]);
            let mut reader = SensorReader::new(source, 0.048);

            assert_eq!(
                reader.try_sample(),
                Err(SensorError::Unavailable {
                    channel: Channel::Light
                })
            );
        }

        #[test]
        fn out_of_range_reading_is_clamped() {
            let source = ScriptedSource::new(&[Some(4095)], &[Some(0)]);
            let mut reader = SensorReader::new(source, 0.048);

            let sample = reader.sample();

            assert_eq!(sample.light_raw, ADC_MAX);
            assert_eq!(sample.wind_speed, 0.0);
        }
    }
}

pub use sensors::{AnalogSource, Channel, SensorError, SensorReader, SensorSample, ADC_MAX};
