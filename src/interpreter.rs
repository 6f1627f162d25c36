// src/interpreter.rs

use core::fmt;
use core::fmt::Write;

use arrayvec::ArrayString;
use log::debug;

use crate::command::{lookup, tokenize, CommandKind};
use crate::error::ProtocolError;
use crate::state::{Instrument, Mode};
use crate::units::TempUnit;

/// Capacity of one response line, sized for the longest error echo
/// (`ERR:<code>:` plus a full-length message).
pub const RESPONSE_CAPACITY: usize = 112;

/// A single protocol response line, without the terminator.
pub type Reply = ArrayString<RESPONSE_CAPACITY>;

fn format_reply(args: fmt::Arguments<'_>) -> Reply {
    let mut reply = Reply::new();
    // Capacities are sized so this cannot overflow for any handler output
    let _ = reply.write_fmt(args);
    reply
}

fn ok() -> Option<Reply> {
    Some(format_reply(format_args!("OK")))
}

/// Records the error and echoes it inline, in that order: every error is
/// visible both through `SYST:ERR?` and as the command's own response.
fn fail(instrument: &mut Instrument, error: ProtocolError) -> Option<Reply> {
    let reply = format_reply(format_args!("ERR:{}", error));
    instrument.state.record_error(error);
    Some(reply)
}

/// Interprets one complete, uppercased command line against the instrument.
///
/// Returns the response line to transmit, or `None` for blank input. The
/// interpreter always leaves the instrument ready for the next command; no
/// error is fatal.
pub fn interpret(line: &str, instrument: &mut Instrument) -> Option<Reply> {
    let tokens = tokenize(line);
    if tokens.verb.is_empty() {
        return None;
    }

    let Some(kind) = lookup(tokens.verb) else {
        return fail(instrument, ProtocolError::unknown_command(tokens.verb));
    };
    debug!("dispatch {}", tokens.verb);

    match kind {
        CommandKind::Identify => {
            let id = &instrument.identity;
            Some(format_reply(format_args!(
                "{},{},{},{}",
                id.manufacturer, id.model, id.serial, id.firmware
            )))
        }
        CommandKind::Reset => {
            instrument.reset();
            ok()
        }
        CommandKind::OperationComplete => {
            // No queued operations exist; the instrument is always ready
            Some(format_reply(format_args!("1")))
        }
        CommandKind::ErrorQuery => match instrument.state.take_error() {
            Some(error) => Some(format_reply(format_args!("{}", error))),
            None => Some(format_reply(format_args!("0:No error"))),
        },
        CommandKind::ModeSet => match tokens.parameter {
            Some("STREAM") => {
                instrument.state.set_mode(Mode::Stream);
                ok()
            }
            Some("QUERY") => {
                instrument.state.set_mode(Mode::Query);
                ok()
            }
            _ => fail(instrument, ProtocolError::invalid_mode()),
        },
        CommandKind::ModeQuery => Some(format_reply(format_args!("{}", instrument.state.mode().name()))),
        CommandKind::IntervalSet => {
            // Missing or non-numeric parameters fall through the range check
            let value = tokens
                .parameter
                .and_then(|p| p.parse::<u32>().ok())
                .unwrap_or(0);
            match instrument.state.set_stream_interval_ms(value) {
                Ok(()) => ok(),
                Err(error) => fail(instrument, error),
            }
        }
        CommandKind::IntervalQuery => {
            Some(format_reply(format_args!("{}", instrument.state.stream_interval_ms())))
        }
        CommandKind::MeasureTemperature => {
            if !instrument.reading.valid {
                return fail(instrument, ProtocolError::not_ready());
            }
            let value = instrument.state.unit().from_celsius(instrument.reading.temperature_c);
            Some(format_reply(format_args!("{:.2}", value)))
        }
        CommandKind::MeasureHumidity => {
            if !instrument.reading.valid {
                return fail(instrument, ProtocolError::not_ready());
            }
            Some(format_reply(format_args!("{:.2}", instrument.reading.humidity_pct)))
        }
        CommandKind::MeasureAll => {
            if !instrument.reading.valid {
                return fail(instrument, ProtocolError::not_ready());
            }
            let temperature = instrument.state.unit().from_celsius(instrument.reading.temperature_c);
            Some(format_reply(format_args!(
                "TEMP:{:.2},HUM:{:.2}",
                temperature, instrument.reading.humidity_pct
            )))
        }
        CommandKind::UnitSet => match tokens.parameter.and_then(TempUnit::from_symbol) {
            Some(unit) => {
                instrument.state.set_unit(unit);
                ok()
            }
            None => fail(instrument, ProtocolError::invalid_unit()),
        },
        CommandKind::UnitQuery => {
            Some(format_reply(format_args!("{}", instrument.state.unit().symbol())))
        }
        CommandKind::AveragingSet => {
            let count = tokens
                .parameter
                .and_then(|p| p.parse::<u8>().ok())
                .unwrap_or(0);
            match instrument.set_averaging(count) {
                Ok(()) => ok(),
                Err(error) => fail(instrument, error),
            }
        }
        CommandKind::AveragingQuery => {
            Some(format_reply(format_args!("{}", instrument.state.averaging_count())))
        }
        CommandKind::StreamStart => match instrument.state.start_streaming() {
            Ok(()) => ok(),
            Err(error) => fail(instrument, error),
        },
        CommandKind::StreamStop => {
            instrument.state.stop_streaming();
            ok()
        }
        CommandKind::StreamQuery => {
            let status = if instrument.state.streaming_active() { "ON" } else { "OFF" };
            Some(format_reply(format_args!("{}", status)))
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use crate::error::ErrorCode;
    use crate::state::Identity;

    fn instrument() -> Instrument {
        Instrument::new(Identity {
            manufacturer: "OpenLab",
            model: "ENV-SENSE-1",
            serial: "000001",
            firmware: "0.1.0",
        })
    }

    fn run(instrument: &mut Instrument, line: &str) -> Option<Reply> {
        interpret(line, instrument)
    }

    fn reply_str(instrument: &mut Instrument, line: &str) -> Reply {
        run(instrument, line).expect("expected a response line")
    }

    #[test]
    fn test_blank_line_is_silent() {
        let mut inst = instrument();
        assert!(run(&mut inst, "").is_none());
        assert!(run(&mut inst, "   ").is_none());
    }

    #[test]
    fn test_identify() {
        let mut inst = instrument();
        assert_eq!(&reply_str(&mut inst, "*IDN?")[..], "OpenLab,ENV-SENSE-1,000001,0.1.0");
    }

    #[test]
    fn test_opc_always_ready() {
        let mut inst = instrument();
        assert_eq!(&reply_str(&mut inst, "*OPC?")[..], "1");
    }

    #[test]
    fn test_unknown_command() {
        let mut inst = instrument();
        assert_eq!(
            &reply_str(&mut inst, "BOGUS 12")[..],
            "ERR:100:Unknown command: BOGUS"
        );
        // Same error retrievable once through the error query
        assert_eq!(&reply_str(&mut inst, "SYST:ERR?")[..], "100:Unknown command: BOGUS");
        assert_eq!(&reply_str(&mut inst, "SYST:ERR?")[..], "0:No error");
    }

    #[test]
    fn test_error_query_clean_twice() {
        let mut inst = instrument();
        assert_eq!(&reply_str(&mut inst, "SYST:ERR?")[..], "0:No error");
        assert_eq!(&reply_str(&mut inst, "SYST:ERR?")[..], "0:No error");
    }

    #[test]
    fn test_mode_set_and_query() {
        let mut inst = instrument();
        assert_eq!(&reply_str(&mut inst, "SYST:MODE?")[..], "QUERY");
        assert_eq!(&reply_str(&mut inst, "SYST:MODE STREAM")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "SYST:MODE?")[..], "STREAM");

        let bad = reply_str(&mut inst, "SYST:MODE SIDEWAYS");
        assert!(bad.starts_with("ERR:101:"));
        // Missing parameter is the same failure
        assert!(reply_str(&mut inst, "SYST:MODE").starts_with("ERR:101:"));
    }

    #[test]
    fn test_query_mode_stops_streaming() {
        let mut inst = instrument();
        reply_str(&mut inst, "SYST:MODE STREAM");
        assert_eq!(&reply_str(&mut inst, "DATA:STREAM:START")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "DATA:STREAM?")[..], "ON");

        reply_str(&mut inst, "SYST:MODE QUERY");
        assert_eq!(&reply_str(&mut inst, "DATA:STREAM?")[..], "OFF");
    }

    #[test]
    fn test_stream_start_requires_stream_mode() {
        let mut inst = instrument();
        let bad = reply_str(&mut inst, "DATA:STREAM:START");
        assert_eq!(&bad[..], "ERR:101:Streaming requires STREAM mode");
        assert!(!inst.state.streaming_active());
        // Stop is unconditional
        assert_eq!(&reply_str(&mut inst, "DATA:STREAM:STOP")[..], "OK");
    }

    #[test]
    fn test_interval_floor_preserves_prior_value() {
        let mut inst = instrument();
        let bad = reply_str(&mut inst, "SYST:INTV 500");
        assert_eq!(&bad[..], "ERR:102:Minimum interval is 2000 ms");
        assert_eq!(&reply_str(&mut inst, "SYST:INTV?")[..], "3000");

        assert_eq!(&reply_str(&mut inst, "SYST:INTV 5000")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "SYST:INTV?")[..], "5000");
    }

    #[test]
    fn test_interval_non_numeric_is_out_of_range() {
        let mut inst = instrument();
        let bad = reply_str(&mut inst, "SYST:INTV FAST");
        assert_eq!(&bad[..], "ERR:102:Minimum interval is 2000 ms");
        assert_eq!(inst.state.take_error().unwrap().code(), ErrorCode::OutOfRange);
    }

    #[test]
    fn test_averaging_range() {
        let mut inst = instrument();
        assert_eq!(&reply_str(&mut inst, "CONF:AVG 4")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "CONF:AVG?")[..], "4");

        for bad_value in ["0", "17", "99", "SOME"] {
            let mut line = Reply::new();
            write!(line, "CONF:AVG {}", bad_value).unwrap();
            let bad = reply_str(&mut inst, &line);
            assert_eq!(&bad[..], "ERR:102:Averaging must be 1-16");
            assert_eq!(&reply_str(&mut inst, "CONF:AVG?")[..], "4");
        }
    }

    #[test]
    fn test_measurements_before_first_sample() {
        let mut inst = instrument();
        for verb in ["MEAS:TEMP?", "MEAS:HUM?", "MEAS:ALL?"] {
            let bad = reply_str(&mut inst, verb);
            assert_eq!(&bad[..], "ERR:202:No valid reading available");
        }
    }

    #[test]
    fn test_measurements_with_valid_reading() {
        let mut inst = instrument();
        inst.reading.temperature_c = 23.5;
        inst.reading.humidity_pct = 45.25;
        inst.reading.valid = true;

        assert_eq!(&reply_str(&mut inst, "MEAS:TEMP?")[..], "23.50");
        assert_eq!(&reply_str(&mut inst, "MEAS:HUM?")[..], "45.25");
        assert_eq!(&reply_str(&mut inst, "MEAS:ALL?")[..], "TEMP:23.50,HUM:45.25");
    }

    #[test]
    fn test_unit_conversion_in_responses() {
        let mut inst = instrument();
        inst.reading.temperature_c = 0.0;
        inst.reading.humidity_pct = 50.0;
        inst.reading.valid = true;

        assert_eq!(&reply_str(&mut inst, "CONF:UNIT F")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "MEAS:TEMP?")[..], "32.00");

        assert_eq!(&reply_str(&mut inst, "CONF:UNIT K")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "MEAS:TEMP?")[..], "273.15");

        assert_eq!(&reply_str(&mut inst, "CONF:UNIT?")[..], "K");
        // Humidity is unit-independent
        assert_eq!(&reply_str(&mut inst, "MEAS:HUM?")[..], "50.00");
    }

    #[test]
    fn test_invalid_unit() {
        let mut inst = instrument();
        let bad = reply_str(&mut inst, "CONF:UNIT X");
        assert_eq!(&bad[..], "ERR:101:Invalid unit (use C, F, or K)");
        assert_eq!(&reply_str(&mut inst, "CONF:UNIT?")[..], "C");
    }

    #[test]
    fn test_reset_scenario() {
        let mut inst = instrument();
        reply_str(&mut inst, "CONF:AVG 8");
        reply_str(&mut inst, "CONF:UNIT F");
        reply_str(&mut inst, "SYST:MODE STREAM");
        inst.reading.valid = true;

        assert_eq!(&reply_str(&mut inst, "*RST")[..], "OK");
        assert_eq!(&reply_str(&mut inst, "CONF:AVG?")[..], "1");
        assert_eq!(&reply_str(&mut inst, "CONF:UNIT?")[..], "C");
        assert_eq!(&reply_str(&mut inst, "SYST:MODE?")[..], "QUERY");
        assert!(!inst.reading.valid);
    }
}
