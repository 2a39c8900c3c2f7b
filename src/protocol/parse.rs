//! Device-side parsing of command lines.
//!
//! Each field has its own parser returning a `Result`, so a malformed line
//! is observable in tests and logs while the command loop still discards it
//! without ever stopping.

use thiserror::Error;

use crate::protocol::commands::{Channel, EXIT_LINE};

// =============================================================================
// Parsed Commands
// =============================================================================

/// A validated command, ready to be applied by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Record humidity setpoint (percent).
    Humidity(i32),
    /// Record temperature setpoint (°C).
    Temperature(f64),
    /// Phototherapy intensity (percent).
    Phototherapy(i32),
    /// Light intensity (percent).
    Light(i32),
    /// Zero both outputs and stop the loop.
    Exit,
}

impl Command {
    /// Channel addressed by this command, if any.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Command::Humidity(_) => Some(Channel::Humidity),
            Command::Temperature(_) => Some(Channel::Temperature),
            Command::Phototherapy(_) => Some(Channel::Phototherapy),
            Command::Light(_) => Some(Channel::Light),
            Command::Exit => None,
        }
    }
}

/// Reasons a line is discarded by the device.
///
/// The device treats all of them the same way; the distinction only exists
/// for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Line was empty after trimming.
    #[error("empty line")]
    Empty,

    /// First character is not a known prefix.
    #[error("unknown prefix '{0}'")]
    UnknownPrefix(char),

    /// Payload could not be parsed as a number.
    #[error("invalid value '{raw}' for {channel}")]
    InvalidValue { channel: Channel, raw: String },

    /// Payload parsed but lies outside the accepted range.
    #[error("{value} out of range for {channel} ({min}-{max})")]
    OutOfRange {
        channel: Channel,
        value: f64,
        min: f64,
        max: f64,
    },
}

// =============================================================================
// Field Parsers
// =============================================================================

/// Parse an integer percent payload for `channel`.
pub fn parse_percent(channel: Channel, raw: &str) -> Result<i32, ParseError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ParseError::InvalidValue {
            channel,
            raw: raw.to_string(),
        })
}

/// Parse a temperature payload in °C.
pub fn parse_temperature(raw: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidValue {
        channel: Channel::Temperature,
        raw: raw.to_string(),
    };

    let value = raw.trim().parse::<f64>().map_err(|_| invalid())?;
    // "nan" and "inf" parse as floats but are not setpoints.
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Check a value against the device range of `channel`.
pub fn check_range(channel: Channel, value: f64) -> Result<(), ParseError> {
    let (min, max) = channel.device_range();
    if value < min || value > max {
        return Err(ParseError::OutOfRange {
            channel,
            value,
            min,
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Line Parser
// =============================================================================

/// Parse and validate one command line.
///
/// Trailing whitespace (including the newline) is ignored. The first
/// character selects the channel and the rest is the payload.
///
/// # Example
/// ```
/// use incubator_control::protocol::{Command, parse_line};
///
/// assert_eq!(parse_line("P50\n"), Ok(Command::Phototherapy(50)));
/// assert_eq!(parse_line("exit_program"), Ok(Command::Exit));
/// assert!(parse_line("P5").is_err());
/// assert!(parse_line("XYZ").is_err());
/// ```
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim_end();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    if line == EXIT_LINE {
        return Ok(Command::Exit);
    }

    let mut chars = line.chars();
    let prefix = chars.next().ok_or(ParseError::Empty)?;
    let payload = chars.as_str();

    let channel = Channel::from_prefix(prefix).ok_or(ParseError::UnknownPrefix(prefix))?;

    match channel {
        Channel::Temperature => {
            let value = parse_temperature(payload)?;
            check_range(channel, value)?;
            Ok(Command::Temperature(value))
        }
        Channel::Humidity | Channel::Phototherapy | Channel::Light => {
            let value = parse_percent(channel, payload)?;
            check_range(channel, value as f64)?;
            Ok(match channel {
                Channel::Humidity => Command::Humidity(value),
                Channel::Phototherapy => Command::Phototherapy(value),
                _ => Command::Light(value),
            })
        }
    }
}
