// src/hal.rs

use core::fmt::Debug;

/// Abstraction for the byte-level serial transport.
///
/// Reads and writes are non-blocking: `nb::Error::WouldBlock` means "nothing
/// available yet" / "transmit buffer full", which the control loop treats as
/// a signal to move on rather than wait.
pub trait SerialLink {
    /// Associated error type for transport faults.
    type Error: Debug;

    /// Attempts to read a single byte from the link.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte to the link.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Abstraction for a monotonic millisecond clock.
///
/// Wall-clock time never appears in the core; every timer (sampling floor,
/// stream interval) is expressed against this monotonic axis.
pub trait Monotonic {
    /// Milliseconds since an arbitrary fixed origin (typically boot).
    fn now_ms(&self) -> u64;
}
