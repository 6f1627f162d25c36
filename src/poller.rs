// src/poller.rs

use core::fmt::Debug;

use log::warn;

use crate::state::{Instrument, MIN_SAMPLE_INTERVAL_MS};

/// One raw measurement from the hardware, in canonical units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Capability trait for the physical sensor: attempt one measurement.
///
/// Implementations must return promptly or fail; the poller never waits on
/// them. Test code substitutes a scripted fake.
pub trait SensorDriver {
    /// Driver-specific failure type.
    type Error: Debug;

    /// Attempts a single measurement.
    fn sample(&mut self) -> Result<RawSample, Self::Error>;
}

/// Rate-limited wrapper around the sensor capability.
///
/// The sensor tolerates at most one attempt per [`MIN_SAMPLE_INTERVAL_MS`],
/// successful or not, so the attempt timestamp advances on every try. A
/// failed attempt leaves the previous reading and its validity untouched:
/// stale data stays served rather than being invalidated, and no protocol
/// error is raised until a query finds no valid reading at all.
#[derive(Debug, Default)]
pub struct SensorPoller {
    last_attempt_ms: Option<u64>,
}

impl SensorPoller {
    pub const fn new() -> Self {
        Self { last_attempt_ms: None }
    }

    /// Gives the poller one chance to sample. Returns `true` if a fresh
    /// reading was stored.
    pub fn tick<D: SensorDriver>(
        &mut self,
        driver: &mut D,
        instrument: &mut Instrument,
        now_ms: u64,
    ) -> bool {
        if let Some(last) = self.last_attempt_ms {
            if now_ms.wrapping_sub(last) < u64::from(MIN_SAMPLE_INTERVAL_MS) {
                return false;
            }
        }
        self.last_attempt_ms = Some(now_ms);

        match driver.sample() {
            Ok(sample) => {
                let (temperature_c, humidity_pct) =
                    instrument.averager.push(sample.temperature_c, sample.humidity_pct);
                instrument.reading.temperature_c = temperature_c;
                instrument.reading.humidity_pct = humidity_pct;
                instrument.reading.valid = true;
                instrument.reading.sampled_at_ms = now_ms;
                true
            }
            Err(e) => {
                warn!("sensor sample failed: {:?}", e);
                false
            }
        }
    }
}
