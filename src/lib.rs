// src/lib.rs

//! SCPI-style serial command core for a temperature/humidity instrument.
//!
//! The crate is the hardware-independent half of a small lab instrument:
//! line assembly, command dispatch, configuration state, sensor-sampling
//! rate limiting with rolling averaging, and the streaming-mode timer.
//! Hardware is reached only through the [`hal::SerialLink`],
//! [`poller::SensorDriver`], and [`hal::Monotonic`] capability traits, so the
//! whole protocol surface is testable with scripted fakes.

#![no_std] // Specify no_std at the crate root

pub mod averaging;
pub mod command;
pub mod controller;
pub mod error;
pub mod hal;
pub mod interpreter;
pub mod line;
pub mod poller;
pub mod state;
pub mod stream;
pub mod units;

// Re-export key types for convenience
pub use averaging::AveragingBuffer;
pub use controller::Controller;
pub use error::{ErrorCode, LinkError, ProtocolError};
pub use hal::{Monotonic, SerialLink};
pub use interpreter::{interpret, Reply};
pub use line::LineAssembler;
pub use poller::{RawSample, SensorDriver, SensorPoller};
pub use state::{Identity, Instrument, InstrumentState, Mode, SensorReading};
pub use stream::StreamScheduler;
pub use units::TempUnit;
