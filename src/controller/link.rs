//! Serial link used by the control panel.
//!
//! Access goes through the narrow [`CommandLink`] trait so the panel can be
//! driven without hardware.

use std::io::Write;

use serialport::SerialPort;
use tracing::{info, warn};

use crate::config::LinkConfig;
use crate::error::{IncubatorError, Result};

/// Write side of the panel-to-device link.
pub trait CommandLink {
    /// Whether writes can currently reach the device.
    fn is_open(&self) -> bool;

    /// Write one already-terminated command line.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Release the link. Further writes fail with `LinkClosed`.
    fn close(&mut self);
}

// =============================================================================
// SerialLink
// =============================================================================

/// Link over a serial port.
///
/// Opening never fails: if the port cannot be opened the link starts
/// disconnected and every command is dropped.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
    name: String,
}

impl SerialLink {
    /// Open the configured port, or return a disconnected link on failure.
    pub fn open(config: &LinkConfig) -> Self {
        match Self::try_open(config) {
            Ok(link) => link,
            Err(e) => {
                warn!(port = %config.port, error = %e, "Serial open failed, commands will be dropped");
                eprintln!("Serial error: {}", e);
                Self {
                    port: None,
                    name: config.port.clone(),
                }
            }
        }
    }

    /// Open the configured port.
    pub fn try_open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud)
            .timeout(config.timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()?;

        info!(port = %config.port, baud = config.baud, "Serial link open");
        Ok(Self {
            port: Some(port),
            name: config.port.clone(),
        })
    }

    /// A link with no port behind it.
    pub fn disconnected() -> Self {
        Self {
            port: None,
            name: String::new(),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.name
    }
}

impl CommandLink for SerialLink {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let port = self.port.as_mut().ok_or(IncubatorError::LinkClosed)?;
        port.write_all(line.as_bytes())?;
        port.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!(port = %self.name, "Serial link closed");
        }
    }
}

// =============================================================================
// MemoryLink
// =============================================================================

/// Link that keeps every written line in memory.
///
/// Backs the CLI's dry-run mode and the tests.
#[derive(Debug, Clone)]
pub struct MemoryLink {
    lines: Vec<String>,
    open: bool,
    fail_writes: bool,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            open: true,
            fail_writes: false,
        }
    }

    /// A link that reports open but rejects every write.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Lines written so far, terminators included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drain the recorded lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl Default for MemoryLink {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLink for MemoryLink {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        if !self.open {
            return Err(IncubatorError::LinkClosed);
        }
        if self.fail_writes {
            return Err(IncubatorError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            )));
        }
        self.lines.push(line.to_string());
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}
