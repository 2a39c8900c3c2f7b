//! Parsing utilities for CLI arguments and panel console input.
//!
//! This module provides the parsers shared by the one-shot subcommands and
//! the interactive terminal panel.

use crate::error::{IncubatorError, Result};
use crate::protocol::Channel;
use crate::storage::ToggleState;

// =============================================================================
// Channel Parsing
// =============================================================================

/// Parse a channel name or prefix into a Channel enum.
///
/// # Arguments
/// * `name` - `H`, `T`, `P`, `L` or the full channel name, any case
///
/// # Example
/// ```
/// use incubator_control::utils::parsing::parse_channel;
/// use incubator_control::protocol::Channel;
///
/// assert_eq!(parse_channel("light").unwrap(), Channel::Light);
/// assert_eq!(parse_channel("p").unwrap(), Channel::Phototherapy);
/// ```
pub fn parse_channel(name: &str) -> Result<Channel> {
    match name.trim().to_lowercase().as_str() {
        "h" | "humidity" => Ok(Channel::Humidity),
        "t" | "temp" | "temperature" => Ok(Channel::Temperature),
        "p" | "photo" | "phototherapy" => Ok(Channel::Phototherapy),
        "l" | "light" => Ok(Channel::Light),
        _ => Err(IncubatorError::InvalidInput(format!(
            "Unknown channel '{}'. Use: humidity, temperature, phototherapy or light",
            name
        ))),
    }
}

// =============================================================================
// Toggle Parsing
// =============================================================================

/// Parse `on` / `off` into a ToggleState.
pub fn parse_toggle(name: &str) -> Result<ToggleState> {
    match name.trim().to_lowercase().as_str() {
        "on" => Ok(ToggleState::On),
        "off" => Ok(ToggleState::Off),
        _ => Err(IncubatorError::InvalidInput(format!(
            "Unknown toggle state '{}'. Use: on or off",
            name
        ))),
    }
}

// =============================================================================
// Panel Console Input
// =============================================================================

/// One action typed into the terminal panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelInput {
    /// Set a percent channel.
    SetPercent(Channel, u8),
    /// Set the temperature.
    SetTemperature(f64),
    /// Switch a channel on or off.
    Toggle(Channel, ToggleState),
    /// Persist the current record.
    Save,
    /// Restore built-in defaults.
    Defaults,
    /// Print the current record.
    Show,
    /// Print usage.
    Help,
    /// Leave the panel.
    Quit,
    /// Blank line.
    Nothing,
}

/// Parse one line typed into the terminal panel.
///
/// Accepted forms:
/// - `<channel> <value>` (e.g. `light 60`, `T 37.5`)
/// - `toggle <channel> on|off`
/// - `save`, `defaults`, `show`, `help`, `quit` / `exit`
///
/// # Example
/// ```
/// use incubator_control::utils::parsing::{PanelInput, parse_panel_input};
/// use incubator_control::protocol::Channel;
///
/// assert_eq!(parse_panel_input("L 60").unwrap(), PanelInput::SetPercent(Channel::Light, 60));
/// assert_eq!(parse_panel_input("t 37.25").unwrap(), PanelInput::SetTemperature(37.25));
/// ```
pub fn parse_panel_input(line: &str) -> Result<PanelInput> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        [] => Ok(PanelInput::Nothing),
        [word] => match word.to_lowercase().as_str() {
            "save" => Ok(PanelInput::Save),
            "defaults" | "restore" => Ok(PanelInput::Defaults),
            "show" | "status" => Ok(PanelInput::Show),
            "help" | "?" => Ok(PanelInput::Help),
            "quit" | "exit" | "q" => Ok(PanelInput::Quit),
            _ => Err(IncubatorError::InvalidInput(format!(
                "Unknown command '{}'. Type 'help' for usage",
                word
            ))),
        },
        [keyword, channel, state] if keyword.eq_ignore_ascii_case("toggle") => Ok(
            PanelInput::Toggle(parse_channel(channel)?, parse_toggle(state)?),
        ),
        [channel, value] => {
            let channel = parse_channel(channel)?;
            if channel == Channel::Temperature {
                let celsius: f64 = value.parse().map_err(|_| {
                    IncubatorError::InvalidInput(format!("Invalid temperature '{}'", value))
                })?;
                Ok(PanelInput::SetTemperature(celsius))
            } else {
                let percent: u8 = value.parse().map_err(|_| {
                    IncubatorError::InvalidInput(format!(
                        "Invalid value '{}'. Use a whole number 0-100",
                        value
                    ))
                })?;
                Ok(PanelInput::SetPercent(channel, percent))
            }
        }
        _ => Err(IncubatorError::InvalidInput(format!(
            "Cannot parse '{}'. Type 'help' for usage",
            line.trim()
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel("H").unwrap(), Channel::Humidity);
        assert_eq!(parse_channel("Temperature").unwrap(), Channel::Temperature);
        assert_eq!(parse_channel("PHOTO").unwrap(), Channel::Phototherapy);
        assert_eq!(parse_channel(" l ").unwrap(), Channel::Light);
        assert!(parse_channel("fan").is_err());
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("ON").unwrap(), ToggleState::On);
        assert_eq!(parse_toggle("off").unwrap(), ToggleState::Off);
        assert!(parse_toggle("maybe").is_err());
    }

    #[test]
    fn test_parse_panel_values() {
        assert_eq!(
            parse_panel_input("humidity 45").unwrap(),
            PanelInput::SetPercent(Channel::Humidity, 45)
        );
        assert_eq!(
            parse_panel_input("  P   10 ").unwrap(),
            PanelInput::SetPercent(Channel::Phototherapy, 10)
        );
        assert_eq!(
            parse_panel_input("temperature 37").unwrap(),
            PanelInput::SetTemperature(37.0)
        );
        assert!(parse_panel_input("L 40.5").is_err());
        assert!(parse_panel_input("L -1").is_err());
        assert!(parse_panel_input("T warm").is_err());
    }

    #[test]
    fn test_parse_panel_toggle() {
        assert_eq!(
            parse_panel_input("toggle light off").unwrap(),
            PanelInput::Toggle(Channel::Light, ToggleState::Off)
        );
        assert_eq!(
            parse_panel_input("Toggle H On").unwrap(),
            PanelInput::Toggle(Channel::Humidity, ToggleState::On)
        );
        assert!(parse_panel_input("toggle light dim").is_err());
    }

    #[test]
    fn test_parse_panel_keywords() {
        assert_eq!(parse_panel_input("save").unwrap(), PanelInput::Save);
        assert_eq!(parse_panel_input("DEFAULTS").unwrap(), PanelInput::Defaults);
        assert_eq!(parse_panel_input("show").unwrap(), PanelInput::Show);
        assert_eq!(parse_panel_input("?").unwrap(), PanelInput::Help);
        assert_eq!(parse_panel_input("exit").unwrap(), PanelInput::Quit);
        assert_eq!(parse_panel_input("   ").unwrap(), PanelInput::Nothing);
        assert!(parse_panel_input("reboot").is_err());
        assert!(parse_panel_input("a b c d").is_err());
    }
}
