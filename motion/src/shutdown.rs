use embedded_hal::delay::DelayNs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Granularity of interruptible waits.
pub const WAIT_SLICE_MS: u64 = 100;

/// Shared stop request, checked between control cycles and during waits.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

/// A wait ended early because shutdown was requested.
#[derive(Debug, PartialEq, Eq)]
pub struct Interrupted;

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` in `WAIT_SLICE_MS` slices, returning early once
    /// shutdown is requested.
    pub fn wait<D: DelayNs>(&self, delay: &mut D, duration: Duration) -> Result<(), Interrupted> {
        let mut remaining = duration.as_millis() as u64;
        loop {
            if self.is_requested() {
                return Err(Interrupted);
            }
            if remaining == 0 {
                return Ok(());
            }
            let slice = remaining.min(WAIT_SLICE_MS);
            delay.delay_ms(slice as u32);
            remaining -= slice;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDelay {
        slices: Vec<u32>,
        trip_after: Option<(usize, Shutdown)>,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.slices.push(ms);
            if let Some((n, shutdown)) = &self.trip_after {
                if self.slices.len() >= *n {
                    shutdown.request();
                }
            }
        }
    }

    #[test]
    fn wait_is_sliced() {
        let shutdown = Shutdown::new();
        let mut delay = CountingDelay { slices: Vec::new(), trip_after: None };

        shutdown.wait(&mut delay, Duration::from_millis(250)).unwrap();

        assert_eq!(delay.slices, vec![100, 100, 50]);
    }

    #[test]
    fn wait_returns_early_on_request() {
        let shutdown = Shutdown::new();
        let mut delay = CountingDelay {
            slices: Vec::new(),
            trip_after: Some((3, shutdown.clone())),
        };

        assert_eq!(shutdown.wait(&mut delay, Duration::from_secs(5)), Err(Interrupted));
        assert_eq!(delay.slices.len(), 3);
    }

    #[test]
    fn requested_shutdown_skips_wait() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let mut delay = CountingDelay { slices: Vec::new(), trip_after: None };

        assert!(shutdown.wait(&mut delay, Duration::from_millis(500)).is_err());
        assert!(delay.slices.is_empty());
    }
}
