//! Serde types of the persisted settings record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{DEFAULT_HUMIDITY, DEFAULT_LIGHT, DEFAULT_PHOTOTHERAPY, DEFAULT_TEMPERATURE};
use crate::protocol::Channel;

/// On/Off state of a panel toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToggleState {
    #[default]
    On,
    Off,
}

impl ToggleState {
    pub fn is_on(&self) -> bool {
        matches!(self, ToggleState::On)
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleState::On => write!(f, "On"),
            ToggleState::Off => write!(f, "Off"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Toggles {
    #[serde(rename = "H", default)]
    pub humidity: ToggleState,
    #[serde(rename = "P", default)]
    pub phototherapy: ToggleState,
    #[serde(rename = "L", default)]
    pub light: ToggleState,
}

/// Persisted snapshot of every setpoint and toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "H")]
    pub humidity: u8,
    #[serde(rename = "T")]
    pub temperature: f64,
    #[serde(rename = "P")]
    pub phototherapy: u8,
    #[serde(rename = "L")]
    pub light: u8,
    #[serde(default)]
    pub toggles: Toggles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            humidity: DEFAULT_HUMIDITY,
            temperature: DEFAULT_TEMPERATURE,
            phototherapy: DEFAULT_PHOTOTHERAPY,
            light: DEFAULT_LIGHT,
            toggles: Toggles::default(),
        }
    }
}

impl Settings {
    /// Stored percent value of a toggleable channel.
    ///
    /// Returns `None` for temperature, which is not a percent.
    pub fn percent(&self, channel: Channel) -> Option<u8> {
        match channel {
            Channel::Humidity => Some(self.humidity),
            Channel::Phototherapy => Some(self.phototherapy),
            Channel::Light => Some(self.light),
            Channel::Temperature => None,
        }
    }

    pub fn set_percent(&mut self, channel: Channel, value: u8) {
        match channel {
            Channel::Humidity => self.humidity = value,
            Channel::Phototherapy => self.phototherapy = value,
            Channel::Light => self.light = value,
            Channel::Temperature => self.temperature = value as f64,
        }
    }

    /// Toggle state of a channel. Temperature has no toggle and is always on.
    pub fn toggle(&self, channel: Channel) -> ToggleState {
        match channel {
            Channel::Humidity => self.toggles.humidity,
            Channel::Phototherapy => self.toggles.phototherapy,
            Channel::Light => self.toggles.light,
            Channel::Temperature => ToggleState::On,
        }
    }

    pub fn set_toggle(&mut self, channel: Channel, state: ToggleState) {
        match channel {
            Channel::Humidity => self.toggles.humidity = state,
            Channel::Phototherapy => self.toggles.phototherapy = state,
            Channel::Light => self.toggles.light = state,
            Channel::Temperature => {}
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for channel in Channel::ALL {
            match channel {
                Channel::Temperature => {
                    writeln!(f, "  {:<13} {:.2}{}", channel, self.temperature, channel.unit())?
                }
                _ => writeln!(
                    f,
                    "  {:<13} {:>3}{}  [{}]",
                    channel,
                    self.percent(channel).unwrap_or_default(),
                    channel.unit(),
                    self.toggle(channel)
                )?,
            }
        }
        Ok(())
    }
}
