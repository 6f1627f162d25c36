// src/state.rs

use crate::averaging::{AveragingBuffer, AVG_CAPACITY};
use crate::error::ProtocolError;
use crate::units::TempUnit;

/// Hard floor on how often the sensor may be polled and how often stream
/// lines may be emitted, in milliseconds. Dictated by the sensor hardware.
pub const MIN_SAMPLE_INTERVAL_MS: u32 = 2000;

/// Default unsolicited stream emission interval.
pub const DEFAULT_STREAM_INTERVAL_MS: u32 = 3000;

/// Operating mode of the instrument.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Mode {
    /// Responses only on request.
    #[default]
    Query,
    /// Unsolicited data lines permitted while streaming is active.
    Stream,
}

impl Mode {
    pub const fn name(&self) -> &'static str {
        match self {
            Mode::Query => "QUERY",
            Mode::Stream => "STREAM",
        }
    }
}

/// Identification strings substituted verbatim into the `*IDN?` reply.
#[derive(Debug, Copy, Clone)]
pub struct Identity {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial: &'static str,
    pub firmware: &'static str,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            manufacturer: "OpenLab",
            model: "ENV-SENSE-1",
            serial: "000001",
            firmware: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// The most recent averaged measurement, always stored in canonical units
/// (Celsius, percent) regardless of the configured display unit.
#[derive(Debug, Copy, Clone, Default)]
pub struct SensorReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// False until the first successful sample; never cleared afterwards
    /// except by a full reset.
    pub valid: bool,
    /// Monotonic timestamp of the sample that produced the current average.
    pub sampled_at_ms: u64,
}

/// The canonical configuration and status record.
///
/// Mutated only by command handlers; read by the stream scheduler.
#[derive(Debug)]
pub struct InstrumentState {
    mode: Mode,
    unit: TempUnit,
    stream_interval_ms: u32,
    averaging_count: u8,
    streaming_active: bool,
    last_error: Option<ProtocolError>,
}

impl InstrumentState {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Query,
            unit: TempUnit::Celsius,
            stream_interval_ms: DEFAULT_STREAM_INTERVAL_MS,
            averaging_count: 1,
            streaming_active: false,
            last_error: None,
        }
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches mode. Leaving Stream mode forces streaming off, preserving
    /// the invariant that Query mode never streams.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode == Mode::Query {
            self.streaming_active = false;
        }
    }

    pub const fn unit(&self) -> TempUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: TempUnit) {
        self.unit = unit;
    }

    pub const fn stream_interval_ms(&self) -> u32 {
        self.stream_interval_ms
    }

    /// Accepts the interval only at or above [`MIN_SAMPLE_INTERVAL_MS`];
    /// rejected values leave the prior setting untouched.
    pub fn set_stream_interval_ms(&mut self, interval_ms: u32) -> Result<(), ProtocolError> {
        if interval_ms < MIN_SAMPLE_INTERVAL_MS {
            return Err(ProtocolError::interval_too_small());
        }
        self.stream_interval_ms = interval_ms;
        Ok(())
    }

    pub const fn averaging_count(&self) -> u8 {
        self.averaging_count
    }

    pub const fn streaming_active(&self) -> bool {
        self.streaming_active
    }

    /// Arms streaming. Only legal in Stream mode.
    pub fn start_streaming(&mut self) -> Result<(), ProtocolError> {
        if self.mode != Mode::Stream {
            return Err(ProtocolError::stream_requires_stream_mode());
        }
        self.streaming_active = true;
        Ok(())
    }

    pub fn stop_streaming(&mut self) {
        self.streaming_active = false;
    }

    /// Records an error for later retrieval via the error query. Each new
    /// error replaces the previous one.
    pub fn record_error(&mut self, error: ProtocolError) {
        self.last_error = Some(error);
    }

    /// Read-once-and-clear: returns the pending error, leaving none behind.
    pub fn take_error(&mut self) -> Option<ProtocolError> {
        self.last_error.take()
    }
}

impl Default for InstrumentState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the command interpreter operates on: configuration, the cached
/// reading, and the averaging pipeline, owned together so handlers can be
/// exercised without any hardware.
#[derive(Debug)]
pub struct Instrument {
    pub state: InstrumentState,
    pub reading: SensorReading,
    pub averager: AveragingBuffer,
    pub identity: Identity,
}

impl Instrument {
    pub fn new(identity: Identity) -> Self {
        Self {
            state: InstrumentState::new(),
            reading: SensorReading::default(),
            averager: AveragingBuffer::new(),
            identity,
        }
    }

    /// Sets the averaging count, keeping the state record and the buffer
    /// window in lockstep. Out-of-range values change nothing.
    pub fn set_averaging(&mut self, count: u8) -> Result<(), ProtocolError> {
        if count < 1 || count as usize > AVG_CAPACITY {
            return Err(ProtocolError::averaging_out_of_range());
        }
        self.state.averaging_count = count;
        self.averager.set_window(count as usize);
        Ok(())
    }

    /// Full reset to power-on defaults, as performed by `*RST`. The poller's
    /// rate limit is deliberately not part of this: the sample-interval floor
    /// is a hardware constraint, not instrument configuration.
    pub fn reset(&mut self) {
        self.state = InstrumentState::new();
        self.reading = SensorReading::default();
        self.averager = AveragingBuffer::new();
    }
}
