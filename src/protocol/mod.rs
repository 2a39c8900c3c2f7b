//! Line protocol between the control panel and the device.
//!
//! This module contains the channel table, command builders used by the
//! panel and the command parser used by the device.

pub mod commands;
pub mod parse;

pub use commands::*;
pub use parse::*;
