use esp_idf_svc::hal::adc::{
    AdcContConfig, AdcContDriver, AdcMeasurement, Attenuated, EmptyAdcChannels, ADC1,
};
use esp_idf_svc::hal::gpio::{ADCPin, AnyOutputPin, Gpio2, Gpio3, Output, OutputPin as _, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::sys::{adc_channel_t, EspError};
use sensors::{AnalogSource, Channel};
use thiserror::Error;

const SAMPLES: usize = 128;
const READ_TIMEOUT_TICKS: u32 = 128;

const LIGHT_CHANNEL: adc_channel_t = <Gpio2 as ADCPin>::CHANNEL;
const WIND_CHANNEL: adc_channel_t = <Gpio3 as ADCPin>::CHANNEL;

pub type OutputLine<'a> = PinDriver<'a, AnyOutputPin, Output>;

#[derive(Debug, Error)]
pub enum AdcReadError {
    #[error("ADC driver error: {0}")]
    Esp(#[from] EspError),
    #[error("no conversion for {0:?} channel in batch")]
    NoData(Channel),
}

/// LDR on GPIO2 and anemometer on GPIO3, sampled continuously on ADC1.
///
/// Each light read pulls one batch of conversions and averages it per
/// channel; the wind average from that batch is held for the wind read
/// that follows, so both halves of a sample come from the same batch.
pub struct EspAnalog<'a> {
    driver: AdcContDriver<'a>,
    pending_wind: Option<u16>,
}

impl EspAnalog<'_> {
    pub fn new<'a>(adc: ADC1, light: Gpio2, wind: Gpio3) -> anyhow::Result<EspAnalog<'a>> {
        let channels =
            EmptyAdcChannels::chain(Attenuated::db11(light)).chain(Attenuated::db11(wind));

        let mut driver = AdcContDriver::new(adc, &AdcContConfig::default(), channels)?;
        driver.start()?;

        Ok(EspAnalog {
            driver,
            pending_wind: None,
        })
    }

    /// Reads one batch and returns the `(light, wind)` averages.
    fn read_batch(&mut self) -> Result<(Option<u16>, Option<u16>), AdcReadError> {
        let mut samples: [AdcMeasurement; SAMPLES] = [Default::default(); SAMPLES];
        let count = self.driver.read(&mut samples, READ_TIMEOUT_TICKS)?;
        let batch = &samples[..count];
        Ok((average(batch, LIGHT_CHANNEL), average(batch, WIND_CHANNEL)))
    }
}

/// Mean of the conversions for `channel`, scaled from 12 bits down to the
/// 0-1023 range the calibration uses.
fn average(batch: &[AdcMeasurement], channel: adc_channel_t) -> Option<u16> {
    let (sum, n) = batch
        .iter()
        .filter(|m| m.channel() == channel)
        .fold((0u32, 0u32), |(sum, n), m| (sum + m.data() as u32, n + 1));
    if n == 0 {
        return None;
    }
    Some(((sum / n) >> 2) as u16)
}

impl AnalogSource for EspAnalog<'_> {
    type Error = AdcReadError;

    fn read_channel(&mut self, channel: Channel) -> Result<u16, AdcReadError> {
        match channel {
            Channel::Light => {
                self.pending_wind = None;
                let (light, wind) = self.read_batch()?;
                self.pending_wind = wind;
                light.ok_or(AdcReadError::NoData(channel))
            }
            Channel::Wind => match self.pending_wind.take() {
                Some(wind) => Ok(wind),
                None => self.read_batch()?.1.ok_or(AdcReadError::NoData(channel)),
            },
        }
    }
}

pub struct Board<'a> {
    pub analog: EspAnalog<'a>,
    /// A forward, A reverse, B forward, B reverse
    pub motor_lines: [OutputLine<'a>; 4],
    pub indicator: OutputLine<'a>,
}

impl Board<'static> {
    pub fn take() -> anyhow::Result<Self> {
        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        let analog = EspAnalog::new(peripherals.adc1, pins.gpio2, pins.gpio3)?;
        let motor_lines = [
            PinDriver::output(pins.gpio15.downgrade_output())?,
            PinDriver::output(pins.gpio16.downgrade_output())?,
            PinDriver::output(pins.gpio17.downgrade_output())?,
            PinDriver::output(pins.gpio18.downgrade_output())?,
        ];
        let indicator = PinDriver::output(pins.gpio13.downgrade_output())?;

        Ok(Board {
            analog,
            motor_lines,
            indicator,
        })
    }
}
