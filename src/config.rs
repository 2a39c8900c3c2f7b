//! Static configuration for both ends of the serial link.
//!
//! Serial port defaults, PWM setup and the boot values of the device.

use std::time::Duration;

// =============================================================================
// Serial Link
// =============================================================================

/// Default serial device of the microcontroller.
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Default baud rate.
pub const DEFAULT_BAUD: u32 = 9600;

/// Timeout applied to serial writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Serial port settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Port path or name (e.g. `/dev/ttyACM0`, `COM3`).
    pub port: String,
    /// Baud rate.
    pub baud: u32,
    /// Write timeout.
    pub timeout: Duration,
}

impl LinkConfig {
    /// Create a config for a port with the default timeout.
    pub fn new(port: impl Into<String>, baud: u32) -> Self {
        Self {
            port: port.into(),
            baud,
            timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_BAUD)
    }
}

// =============================================================================
// Device
// =============================================================================

/// Longest command line the device buffers. Longer input is dropped up to
/// the next newline.
pub const MAX_LINE_LEN: usize = 128;

/// PWM frequency for the light and phototherapy outputs.
pub const PWM_FREQUENCY_HZ: u32 = 1000;

/// Humidity recorded by the device at boot.
pub const BOOT_HUMIDITY: i32 = 60;

/// Temperature recorded by the device at boot.
pub const BOOT_TEMPERATURE: f64 = 37.0;

// =============================================================================
// Panel Defaults
// =============================================================================

/// Default humidity setpoint.
pub const DEFAULT_HUMIDITY: u8 = 50;

/// Default temperature setpoint.
pub const DEFAULT_TEMPERATURE: f64 = 37.0;

/// Default phototherapy intensity.
pub const DEFAULT_PHOTOTHERAPY: u8 = 25;

/// Default light intensity.
pub const DEFAULT_LIGHT: u8 = 35;
