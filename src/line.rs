// src/line.rs

use core::str;

/// Maximum length of one command line, excluding the terminator.
pub const LINE_CAPACITY: usize = 64;

/// Outcome of feeding a single byte into the assembler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FeedResult {
    /// Byte consumed, line not yet complete.
    Pending,
    /// A terminator arrived on a non-empty buffer; the line is readable via
    /// [`LineAssembler::line`] until the next feed.
    Line,
    /// Appending would have exceeded capacity; the partial line was discarded.
    /// The caller records a "Command too long" error.
    Overflow,
}

/// Accumulates raw transport bytes into complete, uppercased command lines.
///
/// Pure per-byte state transition with no blocking, safe to drive from a
/// non-blocking read loop. `\r` and `\n` both terminate, so CRLF input
/// produces one line followed by a harmless empty terminator.
#[derive(Debug)]
pub struct LineAssembler {
    buf: [u8; LINE_CAPACITY],
    len: usize,
    // After an overflow, the rest of the oversized line is junk: swallow
    // everything up to the next terminator so the tail is never dispatched
    // as a command of its own.
    discarding: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_CAPACITY],
            len: 0,
            discarding: false,
        }
    }

    /// Consumes one byte. Printable ASCII is uppercased and appended; control
    /// bytes other than the terminators are ignored.
    pub fn feed(&mut self, byte: u8) -> FeedResult {
        match byte {
            b'\n' | b'\r' => {
                if self.discarding {
                    self.discarding = false;
                    FeedResult::Pending
                } else if self.len == 0 {
                    FeedResult::Pending
                } else {
                    FeedResult::Line
                }
            }
            b' '..=b'~' => {
                if self.discarding {
                    return FeedResult::Pending;
                }
                if self.len == LINE_CAPACITY {
                    self.len = 0;
                    self.discarding = true;
                    return FeedResult::Overflow;
                }
                self.buf[self.len] = byte.to_ascii_uppercase();
                self.len += 1;
                FeedResult::Pending
            }
            _ => FeedResult::Pending,
        }
    }

    /// The completed line after [`FeedResult::Line`]. Only printable ASCII
    /// ever reaches the buffer, so the conversion cannot fail.
    pub fn line(&self) -> &str {
        str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Discards the current line; called after a completed line is dispatched.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}
