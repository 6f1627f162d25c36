// src/stream.rs

use log::trace;

use crate::interpreter::Reply;
use crate::state::{Instrument, Mode};

use core::fmt::Write;

/// Periodic emitter for unsolicited `DATA:` lines.
///
/// Dormant unless the instrument is in Stream mode with streaming armed.
/// Arming re-starts the interval timer, so the first line arrives one full
/// interval after `DATA:STREAM:START`.
#[derive(Debug, Default)]
pub struct StreamScheduler {
    last_emit_ms: u64,
    was_active: bool,
}

impl StreamScheduler {
    pub const fn new() -> Self {
        Self { last_emit_ms: 0, was_active: false }
    }

    /// Produces at most one data line per call, or `None` when not due.
    /// Streaming before the first valid sample is silently quiet.
    pub fn tick(&mut self, instrument: &Instrument, now_ms: u64) -> Option<Reply> {
        let active =
            instrument.state.mode() == Mode::Stream && instrument.state.streaming_active();
        if !active {
            self.was_active = false;
            return None;
        }
        if !self.was_active {
            // Freshly armed: re-base the timer instead of emitting a line
            // that may be due from a long-gone streaming session
            self.was_active = true;
            self.last_emit_ms = now_ms;
            return None;
        }

        if now_ms.wrapping_sub(self.last_emit_ms) < u64::from(instrument.state.stream_interval_ms()) {
            return None;
        }
        if !instrument.reading.valid {
            return None;
        }

        self.last_emit_ms = now_ms;
        let temperature = instrument
            .state
            .unit()
            .from_celsius(instrument.reading.temperature_c);

        let mut line = Reply::new();
        let _ = write!(
            line,
            "DATA:TEMP:{:.2},HUM:{:.2},TIME:{}",
            temperature, instrument.reading.humidity_pct, instrument.reading.sampled_at_ms
        );
        trace!("stream emit at {}", now_ms);
        Some(line)
    }
}
