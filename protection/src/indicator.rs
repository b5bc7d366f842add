use embedded_hal::digital::{Error as _, OutputPin, PinState};
use sensors::SensorSample;

/// Whether the panel counts as generating. Uses a strict `>` while the
/// cover's night rule uses `<`, so a reading exactly at the threshold is
/// neither night nor generating.
pub fn generating(sample: &SensorSample, light_threshold: u16) -> bool {
    sample.light_raw > light_threshold
}

/// "Generating" output driven straight from the light reading.
pub struct Indicator<P> {
    pin: P,
    lit: Option<bool>,
}

impl<P> Indicator<P>
where
    P: OutputPin,
{
    pub fn new(pin: P) -> Indicator<P> {
        Indicator { pin, lit: None }
    }

    pub fn is_lit(&self) -> Option<bool> {
        self.lit
    }

    pub fn show(&mut self, on: bool) {
        if let Err(e) = self.pin.set_state(PinState::from(on)) {
            log::warn!("Failed to drive indicator: {:?}", e.kind());
            return;
        }
        if self.lit != Some(on) {
            log::debug!("Indicator {}", if on { "on" } else { "off" });
        }
        self.lit = Some(on);
    }
}
