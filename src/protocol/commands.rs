//! Command definitions and builders for the incubator serial protocol.
//!
//! Every command is one ASCII line `<prefix><value>\n` sent from the control
//! panel to the device. There is no acknowledgement and no framing beyond
//! the newline.

use std::fmt;

// =============================================================================
// Constants
// =============================================================================

/// Line that asks the device to zero its outputs and stop its loop.
pub const EXIT_LINE: &str = "exit_program";

/// Line terminator for every command.
pub const LINE_TERMINATOR: char = '\n';

/// Maximum PWM duty cycle (16-bit).
pub const MAX_DUTY: u16 = u16::MAX;

// =============================================================================
// Channels
// =============================================================================

/// Control channel identifiers.
///
/// The control panel and the device disagree on some bounds: the panel lets
/// humidity go down to 30% while the device only accepts 60-100%, and the
/// temperature slider starts at 35.0°C while the device only accepts
/// 37.0-38.0°C. Values in the gap are sent and then dropped by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Humidity setpoint in percent (placeholder on the device).
    Humidity,
    /// Temperature setpoint in °C (placeholder on the device).
    Temperature,
    /// Phototherapy lamp intensity in percent (PWM).
    Phototherapy,
    /// Light intensity in percent (PWM).
    Light,
}

impl Channel {
    /// All channels, in panel order.
    pub const ALL: [Channel; 4] = [
        Channel::Humidity,
        Channel::Temperature,
        Channel::Phototherapy,
        Channel::Light,
    ];

    /// Channels that carry an On/Off toggle on the panel.
    pub const TOGGLEABLE: [Channel; 3] =
        [Channel::Humidity, Channel::Phototherapy, Channel::Light];

    /// Get the command prefix character.
    pub const fn prefix(&self) -> char {
        match self {
            Channel::Humidity => 'H',
            Channel::Temperature => 'T',
            Channel::Phototherapy => 'P',
            Channel::Light => 'L',
        }
    }

    /// Look up a channel by its command prefix.
    pub const fn from_prefix(prefix: char) -> Option<Channel> {
        match prefix {
            'H' => Some(Channel::Humidity),
            'T' => Some(Channel::Temperature),
            'P' => Some(Channel::Phototherapy),
            'L' => Some(Channel::Light),
            _ => None,
        }
    }

    /// Minimum value the panel will send for this channel.
    ///
    /// Lower values are raised to this floor before transmission.
    pub const fn panel_floor(&self) -> u8 {
        match self {
            Channel::Humidity => 30,
            Channel::Phototherapy | Channel::Light => 25,
            Channel::Temperature => 0,
        }
    }

    /// Range of the panel control for this channel.
    pub const fn panel_range(&self) -> (f64, f64) {
        match self {
            Channel::Humidity => (30.0, 70.0),
            Channel::Temperature => (35.0, 38.0),
            Channel::Phototherapy | Channel::Light => (25.0, 100.0),
        }
    }

    /// Range the device accepts for this channel. Anything else is discarded.
    pub const fn device_range(&self) -> (f64, f64) {
        match self {
            Channel::Humidity => (60.0, 100.0),
            Channel::Temperature => (37.0, 38.0),
            Channel::Phototherapy | Channel::Light => (25.0, 100.0),
        }
    }

    /// Whether the panel shows an On/Off toggle for this channel.
    pub const fn is_toggleable(&self) -> bool {
        !matches!(self, Channel::Temperature)
    }

    /// Whether the device drives a PWM output for this channel.
    pub const fn drives_pwm(&self) -> bool {
        matches!(self, Channel::Phototherapy | Channel::Light)
    }

    /// Get channel name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Channel::Humidity => "Humidity",
            Channel::Temperature => "Temperature",
            Channel::Phototherapy => "Phototherapy",
            Channel::Light => "Light",
        }
    }

    /// Display unit.
    pub const fn unit(&self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            _ => "%",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// =============================================================================
// Command Values
// =============================================================================

/// Value carried by a command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandValue {
    /// Integer percent (H, P, L).
    Percent(i32),
    /// Temperature in °C (T).
    Celsius(f64),
}

impl From<u8> for CommandValue {
    fn from(value: u8) -> Self {
        CommandValue::Percent(value as i32)
    }
}

impl From<i32> for CommandValue {
    fn from(value: i32) -> Self {
        CommandValue::Percent(value)
    }
}

impl From<f64> for CommandValue {
    fn from(value: f64) -> Self {
        CommandValue::Celsius(value)
    }
}

impl fmt::Display for CommandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandValue::Percent(v) => write!(f, "{}", v),
            CommandValue::Celsius(v) => {
                let v = round_to_hundredths(*v);
                // Whole degrees keep one decimal so the line reads `T37.0`.
                if v.fract() == 0.0 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
        }
    }
}

/// Round a value to two decimal places.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Command Builders
// =============================================================================

/// Build a command line for a channel.
///
/// # Example
/// ```
/// use incubator_control::protocol::{Channel, encode_command};
///
/// assert_eq!(encode_command(Channel::Light, 35u8), "L35\n");
/// assert_eq!(encode_command(Channel::Temperature, 37.0), "T37.0\n");
/// assert_eq!(encode_command(Channel::Temperature, 37.456), "T37.46\n");
/// ```
pub fn encode_command(channel: Channel, value: impl Into<CommandValue>) -> String {
    format!("{}{}{}", channel.prefix(), value.into(), LINE_TERMINATOR)
}

/// Build the shutdown line.
pub fn encode_exit() -> String {
    format!("{}{}", EXIT_LINE, LINE_TERMINATOR)
}

/// Convert an intensity percent into a 16-bit PWM duty cycle.
///
/// `duty = round(percent / 100 * 65535)`, saturating at both ends.
///
/// # Example
/// ```
/// use incubator_control::protocol::duty_from_percent;
///
/// assert_eq!(duty_from_percent(25), 16384);
/// assert_eq!(duty_from_percent(50), 32768);
/// assert_eq!(duty_from_percent(100), 65535);
/// ```
pub fn duty_from_percent(percent: i32) -> u16 {
    let duty = (percent as f64 / 100.0 * MAX_DUTY as f64).round();
    duty.clamp(0.0, MAX_DUTY as f64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_prefix(channel.prefix()), Some(channel));
        }
        assert_eq!(Channel::from_prefix('X'), None);
        assert_eq!(Channel::from_prefix('h'), None);
    }

    #[test]
    fn test_panel_floors() {
        assert_eq!(Channel::Humidity.panel_floor(), 30);
        assert_eq!(Channel::Phototherapy.panel_floor(), 25);
        assert_eq!(Channel::Light.panel_floor(), 25);
        assert_eq!(Channel::Temperature.panel_floor(), 0);
    }

    #[test]
    fn test_bound_mismatch_is_kept() {
        // Panel lets humidity reach 30 but the device wants at least 60.
        assert!(Channel::Humidity.panel_range().0 < Channel::Humidity.device_range().0);
        assert!(Channel::Temperature.panel_range().0 < Channel::Temperature.device_range().0);
    }

    #[test]
    fn test_channel_kinds() {
        assert!(Channel::Light.drives_pwm());
        assert!(Channel::Phototherapy.drives_pwm());
        assert!(!Channel::Humidity.drives_pwm());
        assert!(!Channel::Temperature.is_toggleable());
        assert!(Channel::TOGGLEABLE.iter().all(Channel::is_toggleable));
        assert_eq!(format!("{:<6}|", Channel::Light), "Light |");
    }

    #[test]
    fn test_encode_integer_command() {
        assert_eq!(encode_command(Channel::Humidity, 45u8), "H45\n");
        assert_eq!(encode_command(Channel::Phototherapy, 0u8), "P0\n");
        assert_eq!(encode_command(Channel::Light, 100i32), "L100\n");
    }

    #[test]
    fn test_encode_temperature_command() {
        assert_eq!(encode_command(Channel::Temperature, 37.0), "T37.0\n");
        assert_eq!(encode_command(Channel::Temperature, 37.5), "T37.5\n");
        assert_eq!(encode_command(Channel::Temperature, 36.999), "T37.0\n");
        assert_eq!(encode_command(Channel::Temperature, 35.25), "T35.25\n");
    }

    #[test]
    fn test_encode_exit() {
        assert_eq!(encode_exit(), "exit_program\n");
    }

    #[test]
    fn test_duty_endpoints() {
        assert_eq!(duty_from_percent(0), 0);
        assert_eq!(duty_from_percent(25), 16384);
        assert_eq!(duty_from_percent(50), 32768);
        assert_eq!(duty_from_percent(100), 65535);
    }

    #[test]
    fn test_duty_saturates() {
        assert_eq!(duty_from_percent(-10), 0);
        assert_eq!(duty_from_percent(250), 65535);
    }

    #[test]
    fn test_duty_monotonic() {
        let duties: Vec<u16> = (25..=100).map(duty_from_percent).collect();
        assert!(duties.windows(2).all(|w| w[0] <= w[1]));
    }
}
