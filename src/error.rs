//! Custom error types for the incubator control system.
//!
//! This module provides error handling for the serial link, settings
//! persistence and operator input. Device-side command parsing has its own
//! error type in [`crate::protocol::ParseError`] because those failures are
//! never surfaced to the sender.

use thiserror::Error;

/// Main error type for incubator control operations.
#[derive(Error, Debug)]
pub enum IncubatorError {
    /// Serial port could not be opened or configured.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error on the serial link or the settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write attempted on a link that is not open.
    #[error("Serial link is not open")]
    LinkClosed,

    /// Settings file could not be located, read, parsed or written.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Value outside the range the control panel accepts.
    #[error("Invalid value {value} for {channel}. Valid range: {min}-{max}")]
    InvalidValue {
        channel: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Control is toggled off and does not accept changes.
    #[error("{0} is switched off. Toggle it on first.")]
    ChannelOff(String),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for incubator control operations.
pub type Result<T> = std::result::Result<T, IncubatorError>;
