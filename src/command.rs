// src/command.rs

//! The instrument command table.
//!
//! Dispatch is a static verb-to-kind mapping rather than a cascade of string
//! comparisons: a line is split once into verb and parameter, the verb is
//! looked up by exact match, and the handler receives the tagged kind plus
//! the raw parameter text.

/// Every command the instrument understands. Query forms (ending in `?`) and
/// set forms are distinct table entries.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommandKind {
    Identify,
    Reset,
    OperationComplete,
    ErrorQuery,
    ModeSet,
    ModeQuery,
    IntervalSet,
    IntervalQuery,
    MeasureTemperature,
    MeasureHumidity,
    MeasureAll,
    UnitSet,
    UnitQuery,
    AveragingSet,
    AveragingQuery,
    StreamStart,
    StreamStop,
    StreamQuery,
}

/// Verb table. Lines are uppercased before lookup, so all verbs are stored
/// uppercase.
static COMMANDS: &[(&str, CommandKind)] = &[
    ("*IDN?", CommandKind::Identify),
    ("*RST", CommandKind::Reset),
    ("*OPC?", CommandKind::OperationComplete),
    ("SYST:ERR?", CommandKind::ErrorQuery),
    ("SYST:MODE", CommandKind::ModeSet),
    ("SYST:MODE?", CommandKind::ModeQuery),
    ("SYST:INTV", CommandKind::IntervalSet),
    ("SYST:INTV?", CommandKind::IntervalQuery),
    ("MEAS:TEMP?", CommandKind::MeasureTemperature),
    ("MEAS:HUM?", CommandKind::MeasureHumidity),
    ("MEAS:ALL?", CommandKind::MeasureAll),
    ("CONF:UNIT", CommandKind::UnitSet),
    ("CONF:UNIT?", CommandKind::UnitQuery),
    ("CONF:AVG", CommandKind::AveragingSet),
    ("CONF:AVG?", CommandKind::AveragingQuery),
    ("DATA:STREAM:START", CommandKind::StreamStart),
    ("DATA:STREAM:STOP", CommandKind::StreamStop),
    ("DATA:STREAM?", CommandKind::StreamQuery),
];

/// A tokenized command line: the verb and whatever followed the first space.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Tokens<'a> {
    pub verb: &'a str,
    pub parameter: Option<&'a str>,
}

/// Splits a complete line into verb and optional parameter.
///
/// Leading spaces are stripped; a fully blank line yields an empty verb,
/// which the interpreter treats as no-op. The parameter keeps everything
/// after the first space with its own leading spaces trimmed.
pub fn tokenize(line: &str) -> Tokens<'_> {
    let line = line.trim_start_matches(' ');
    match line.split_once(' ') {
        Some((verb, rest)) => {
            let parameter = rest.trim_start_matches(' ');
            Tokens {
                verb,
                parameter: if parameter.is_empty() { None } else { Some(parameter) },
            }
        }
        None => Tokens { verb: line, parameter: None },
    }
}

/// Exact-match lookup of a verb against the command table.
pub fn lookup(verb: &str) -> Option<CommandKind> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == verb)
        .map(|(_, kind)| *kind)
}
