// src/controller.rs

use core::fmt::Debug;

use log::warn;

use crate::error::{LinkError, ProtocolError};
use crate::hal::{Monotonic, SerialLink};
use crate::interpreter::{interpret, Reply};
use crate::line::{FeedResult, LineAssembler};
use crate::poller::{SensorDriver, SensorPoller};
use crate::state::{Identity, Instrument};
use crate::stream::StreamScheduler;

/// The cooperative control loop: owns the transport, the sensor driver, the
/// clock, and all instrument state.
///
/// Call [`service`](Self::service) from the firmware main loop. Each call
/// performs, in fixed order: drain all currently available input bytes
/// (dispatching completed commands synchronously), give the poller one chance
/// to sample, and let the stream scheduler emit at most one line. Nothing
/// blocks indefinitely; the only waits are the rate limits themselves.
#[derive(Debug)]
pub struct Controller<S, D, C>
where
    S: SerialLink,
    D: SensorDriver,
    C: Monotonic,
{
    link: S,
    driver: D,
    clock: C,
    instrument: Instrument,
    assembler: LineAssembler,
    poller: SensorPoller,
    scheduler: StreamScheduler,
}

impl<S, D, C> Controller<S, D, C>
where
    S: SerialLink,
    D: SensorDriver,
    C: Monotonic,
{
    pub fn new(link: S, driver: D, clock: C, identity: Identity) -> Self {
        Self {
            link,
            driver,
            clock,
            instrument: Instrument::new(identity),
            assembler: LineAssembler::new(),
            poller: SensorPoller::new(),
            scheduler: StreamScheduler::new(),
        }
    }

    /// One control-loop iteration. Protocol errors are handled on the wire;
    /// only transport faults surface here.
    pub fn service(&mut self) -> Result<(), LinkError<S::Error>> {
        self.drain_input()?;

        let now_ms = self.clock.now_ms();
        self.poller.tick(&mut self.driver, &mut self.instrument, now_ms);

        if let Some(line) = self.scheduler.tick(&self.instrument, now_ms) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Read-only access to the instrument, mainly for host-side inspection
    /// in tests and diagnostics.
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    fn drain_input(&mut self) -> Result<(), LinkError<S::Error>> {
        loop {
            let byte = match self.link.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(LinkError::Io(e)),
            };

            match self.assembler.feed(byte) {
                FeedResult::Pending => {}
                FeedResult::Line => {
                    let reply = interpret(self.assembler.line(), &mut self.instrument);
                    self.assembler.clear();
                    if let Some(reply) = reply {
                        self.write_line(&reply)?;
                    }
                }
                FeedResult::Overflow => {
                    // The partial line is dropped, not partially dispatched;
                    // the overflow only becomes visible through SYST:ERR?
                    warn!("input line overflow, discarding");
                    self.instrument
                        .state
                        .record_error(ProtocolError::command_too_long());
                }
            }
        }
    }

    fn write_line(&mut self, line: &Reply) -> Result<(), LinkError<S::Error>> {
        for &byte in line.as_bytes() {
            nb::block!(self.link.write_byte(byte))?;
        }
        nb::block!(self.link.write_byte(b'\r'))?;
        nb::block!(self.link.write_byte(b'\n'))?;
        nb::block!(self.link.flush())?;
        Ok(())
    }
}
