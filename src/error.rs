// src/error.rs

use core::fmt;

use arrayvec::ArrayString;

/// Capacity of a rendered protocol error message. Sized so that the longest
/// message, `Unknown command: <verb>` with a full-length verb, still fits.
pub const MESSAGE_CAPACITY: usize = 96;

/// The closed set of protocol error codes.
///
/// Codes are part of the wire format: they appear verbatim in `ERR:<code>:`
/// responses and in `SYST:ERR?` replies.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum ErrorCode {
    /// No error pending.
    NoError = 0,
    /// Verb did not match any table entry, or the input line overflowed.
    UnknownCommand = 100,
    /// Parameter present but not one of the accepted values.
    InvalidParameter = 101,
    /// Numeric parameter outside its permitted range.
    OutOfRange = 102,
    /// Sensor hardware reported a failure.
    SensorFailure = 200,
    /// Sensor did not respond within its bounded window.
    SensorTimeout = 201,
    /// No valid reading has been produced yet.
    NotReady = 202,
}

impl ErrorCode {
    /// Numeric wire representation of this code.
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// A recorded protocol error: code plus the human-readable message that was
/// echoed inline when the error was detected.
///
/// `Display` renders the `SYST:ERR?` form, `<code>:<message>`; the inline
/// command response prefixes it with `ERR:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    code: ErrorCode,
    message: ArrayString<MESSAGE_CAPACITY>,
}

impl ProtocolError {
    fn with_message(code: ErrorCode, message: &str) -> Self {
        let mut buf = ArrayString::new();
        // Truncation can only drop the tail of an over-long unknown verb
        let _ = buf.try_push_str(&message[..message.len().min(MESSAGE_CAPACITY)]);
        Self { code, message: buf }
    }

    pub fn unknown_command(verb: &str) -> Self {
        let mut buf = ArrayString::<MESSAGE_CAPACITY>::new();
        let _ = buf.try_push_str("Unknown command: ");
        // Verbs are printable ASCII, so byte truncation is char-safe
        let room = MESSAGE_CAPACITY - buf.len();
        let _ = buf.try_push_str(&verb[..verb.len().min(room)]);
        Self { code: ErrorCode::UnknownCommand, message: buf }
    }

    pub fn command_too_long() -> Self {
        Self::with_message(ErrorCode::UnknownCommand, "Command too long")
    }

    pub fn invalid_mode() -> Self {
        Self::with_message(ErrorCode::InvalidParameter, "Invalid mode (use STREAM or QUERY)")
    }

    pub fn invalid_unit() -> Self {
        Self::with_message(ErrorCode::InvalidParameter, "Invalid unit (use C, F, or K)")
    }

    pub fn stream_requires_stream_mode() -> Self {
        Self::with_message(ErrorCode::InvalidParameter, "Streaming requires STREAM mode")
    }

    pub fn interval_too_small() -> Self {
        Self::with_message(ErrorCode::OutOfRange, "Minimum interval is 2000 ms")
    }

    pub fn averaging_out_of_range() -> Self {
        Self::with_message(ErrorCode::OutOfRange, "Averaging must be 1-16")
    }

    pub fn not_ready() -> Self {
        Self::with_message(ErrorCode::NotReady, "No valid reading available")
    }

    pub fn sensor_failure() -> Self {
        Self::with_message(ErrorCode::SensorFailure, "Sensor failure")
    }

    pub fn sensor_timeout() -> Self {
        Self::with_message(ErrorCode::SensorTimeout, "Sensor timeout")
    }

    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code.code(), self.message)
    }
}

/// Transport-level failure while servicing the control loop.
///
/// Protocol errors never surface here; they are recorded in the instrument
/// state and echoed on the wire. This type only carries faults of the serial
/// link itself, as reported by the HAL implementation.
#[derive(Debug, thiserror::Error)]
pub enum LinkError<E>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the serial driver.
    #[error("serial I/O error: {0:?}")]
    Io(E),
}

// Allow mapping from the underlying HAL error with `?`
impl<E: core::fmt::Debug> From<E> for LinkError<E> {
    fn from(e: E) -> Self {
        LinkError::Io(e)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_codes_match_wire_values() {
        assert_eq!(ErrorCode::NoError.code(), 0);
        assert_eq!(ErrorCode::UnknownCommand.code(), 100);
        assert_eq!(ErrorCode::InvalidParameter.code(), 101);
        assert_eq!(ErrorCode::OutOfRange.code(), 102);
        assert_eq!(ErrorCode::SensorFailure.code(), 200);
        assert_eq!(ErrorCode::SensorTimeout.code(), 201);
        assert_eq!(ErrorCode::NotReady.code(), 202);
    }

    #[test]
    fn test_unknown_command_carries_verb() {
        let err = ProtocolError::unknown_command("BOGUS");
        assert_eq!(err.code(), ErrorCode::UnknownCommand);
        assert_eq!(err.message(), "Unknown command: BOGUS");
    }

    #[test]
    fn test_display_is_syst_err_form() {
        let mut rendered = ArrayString::<MESSAGE_CAPACITY>::new();
        write!(rendered, "{}", ProtocolError::interval_too_small()).unwrap();
        assert_eq!(&rendered[..], "102:Minimum interval is 2000 ms");
    }

    #[test]
    fn test_over_long_verb_is_truncated_not_panicking() {
        // 120 characters, beyond MESSAGE_CAPACITY once prefixed
        let long = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX\
                    XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
        let err = ProtocolError::unknown_command(long);
        assert!(err.message().len() <= MESSAGE_CAPACITY);
        assert!(err.message().starts_with("Unknown command: X"));
    }
}
