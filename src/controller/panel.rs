//! Control panel context.
//!
//! Holds the current settings record, the emitter and the settings file
//! location. Every operator action goes through here and emits exactly the
//! commands the panel would emit for that action.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::controller::emitter::{CommandEmitter, enforce_min};
use crate::controller::link::CommandLink;
use crate::error::{IncubatorError, Result};
use crate::protocol::{Channel, round_to_hundredths};
use crate::storage::{Settings, ToggleState, save_settings};

/// Operator-facing control panel.
pub struct ControlPanel<L: CommandLink> {
    settings: Settings,
    emitter: CommandEmitter<L>,
    settings_path: PathBuf,
}

impl<L: CommandLink> ControlPanel<L> {
    pub fn new(settings: Settings, emitter: CommandEmitter<L>, settings_path: PathBuf) -> Self {
        Self {
            settings,
            emitter,
            settings_path,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn emitter(&self) -> &CommandEmitter<L> {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut CommandEmitter<L> {
        &mut self.emitter
    }

    /// Push every toggleable channel to the device.
    ///
    /// A channel that is off is sent as `0`, otherwise its stored value.
    /// Temperature is not sent.
    pub fn sync(&mut self) {
        for channel in Channel::TOGGLEABLE {
            self.apply_toggle(channel);
        }
    }

    /// Change the setpoint of a percent channel.
    ///
    /// Values below the channel floor are raised to it; the raised value is
    /// stored and sent. Returns the value that was sent.
    pub fn set_value(&mut self, channel: Channel, value: u8) -> Result<u8> {
        if channel == Channel::Temperature {
            return Err(IncubatorError::InvalidInput(
                "Temperature takes a decimal value, use set_temperature".into(),
            ));
        }

        let (_, max) = channel.panel_range();
        if value as f64 > max {
            return Err(IncubatorError::InvalidValue {
                channel: channel.to_string(),
                value: value as f64,
                min: channel.panel_floor() as f64,
                max,
            });
        }

        if !self.settings.toggle(channel).is_on() {
            return Err(IncubatorError::ChannelOff(channel.to_string()));
        }

        Ok(self.apply_value(channel, value))
    }

    /// Change the temperature setpoint.
    ///
    /// The stored value is rounded to two decimals; the sent value is never
    /// below the bottom of the slider. Returns the value that was sent.
    pub fn set_temperature(&mut self, celsius: f64) -> Result<f64> {
        let (min, max) = Channel::Temperature.panel_range();
        if !celsius.is_finite() || celsius > max {
            return Err(IncubatorError::InvalidValue {
                channel: Channel::Temperature.to_string(),
                value: celsius,
                min,
                max,
            });
        }

        let rounded = round_to_hundredths(celsius);
        self.settings.temperature = rounded;

        let sent = rounded.max(min);
        self.emitter.send(Channel::Temperature, sent);
        Ok(sent)
    }

    /// Switch a channel on or off.
    ///
    /// Off sends `0`; on sends the stored value.
    pub fn set_toggle(&mut self, channel: Channel, state: ToggleState) -> Result<()> {
        if !channel.is_toggleable() {
            return Err(IncubatorError::InvalidInput(format!(
                "{} has no on/off toggle",
                channel
            )));
        }

        self.settings.set_toggle(channel, state);
        info!(%channel, %state, "Toggle changed");
        self.apply_toggle(channel);
        Ok(())
    }

    /// Reset every control to the built-in defaults and persist them.
    pub fn restore_defaults(&mut self) -> Result<()> {
        let defaults = Settings::default();

        for channel in Channel::TOGGLEABLE {
            if let Some(value) = defaults.percent(channel) {
                self.apply_value(channel, value);
            }
        }
        // The slider only emits on user interaction, so the reset is silent.
        self.settings.temperature = defaults.temperature;

        for channel in Channel::TOGGLEABLE {
            self.settings.set_toggle(channel, defaults.toggle(channel));
            self.apply_toggle(channel);
        }

        info!("Defaults restored");
        save_settings(&self.settings_path, &defaults)
    }

    /// Write the current record to the settings file.
    pub fn save(&self) -> Result<()> {
        save_settings(&self.settings_path, &self.settings)?;
        info!(path = %self.settings_path.display(), "Settings saved");
        Ok(())
    }

    /// Exit path: save, then close the link.
    ///
    /// A failed save is reported and does not stop the link from closing.
    pub fn close(&mut self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Settings not saved on exit");
            eprintln!("Failed to save settings: {}", e);
        }
        self.emitter.close();
    }

    fn apply_value(&mut self, channel: Channel, value: u8) -> u8 {
        let value = enforce_min(channel, value);
        self.settings.set_percent(channel, value);
        self.emitter.send(channel, value);
        value
    }

    fn apply_toggle(&mut self, channel: Channel) {
        match self.settings.toggle(channel) {
            ToggleState::Off => self.emitter.send(channel, 0u8),
            ToggleState::On => {
                if let Some(value) = self.settings.percent(channel) {
                    self.emitter.send(channel, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::link::MemoryLink;
    use crate::storage::load_settings;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "incubator-panel-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("settings.json")
    }

    fn panel(settings: Settings, name: &str) -> ControlPanel<MemoryLink> {
        ControlPanel::new(
            settings,
            CommandEmitter::new(MemoryLink::new()),
            scratch_path(name),
        )
    }

    fn sent(panel: &mut ControlPanel<MemoryLink>) -> Vec<String> {
        panel.emitter_mut().link_mut().take_lines()
    }

    #[test]
    fn test_sync_sends_values_and_zero_for_off() {
        let mut settings = Settings::default();
        settings.toggles.phototherapy = ToggleState::Off;
        let mut panel = panel(settings, "sync");

        panel.sync();

        assert_eq!(sent(&mut panel), ["H50\n", "P0\n", "L35\n"]);
    }

    #[test]
    fn test_set_value_clamps_before_sending() {
        let mut panel = panel(Settings::default(), "clamp");

        assert_eq!(panel.set_value(Channel::Humidity, 10).unwrap(), 30);
        assert_eq!(panel.settings().humidity, 30);
        assert_eq!(sent(&mut panel), ["H30\n"]);

        assert_eq!(panel.set_value(Channel::Light, 3).unwrap(), 25);
        assert_eq!(panel.set_value(Channel::Phototherapy, 80).unwrap(), 80);
        assert_eq!(sent(&mut panel), ["L25\n", "P80\n"]);
    }

    #[test]
    fn test_set_value_rejects_above_panel_range() {
        let mut panel = panel(Settings::default(), "above");
        assert!(matches!(
            panel.set_value(Channel::Humidity, 71),
            Err(IncubatorError::InvalidValue { .. })
        ));
        assert!(panel.set_value(Channel::Light, 101).is_err());
        assert!(panel.set_value(Channel::Temperature, 37).is_err());
        assert!(sent(&mut panel).is_empty());
        assert_eq!(panel.settings(), &Settings::default());
    }

    #[test]
    fn test_humidity_below_device_floor_still_sent() {
        let mut panel = panel(Settings::default(), "gap");
        panel.set_value(Channel::Humidity, 45).unwrap();
        assert_eq!(sent(&mut panel), ["H45\n"]);
    }

    #[test]
    fn test_set_value_while_off_is_rejected() {
        let mut panel = panel(Settings::default(), "off");
        panel.set_toggle(Channel::Light, ToggleState::Off).unwrap();
        assert_eq!(sent(&mut panel), ["L0\n"]);

        assert!(matches!(
            panel.set_value(Channel::Light, 60),
            Err(IncubatorError::ChannelOff(_))
        ));
        assert!(sent(&mut panel).is_empty());

        panel.set_toggle(Channel::Light, ToggleState::On).unwrap();
        assert_eq!(sent(&mut panel), ["L35\n"]);
    }

    #[test]
    fn test_temperature_has_no_toggle() {
        let mut panel = panel(Settings::default(), "t-toggle");
        assert!(
            panel
                .set_toggle(Channel::Temperature, ToggleState::Off)
                .is_err()
        );
        assert!(sent(&mut panel).is_empty());
    }

    #[test]
    fn test_set_temperature() {
        let mut panel = panel(Settings::default(), "temp");

        assert_eq!(panel.set_temperature(37.456).unwrap(), 37.46);
        assert_eq!(panel.settings().temperature, 37.46);

        assert_eq!(panel.set_temperature(34.0).unwrap(), 35.0);
        assert_eq!(panel.settings().temperature, 34.0);

        assert!(panel.set_temperature(38.5).is_err());
        assert!(panel.set_temperature(f64::NAN).is_err());

        assert_eq!(sent(&mut panel), ["T37.46\n", "T35.0\n"]);
    }

    #[test]
    fn test_restore_defaults_emits_and_persists() {
        let mut settings = Settings::default();
        settings.humidity = 65;
        settings.temperature = 38.0;
        settings.light = 90;
        settings.toggles.humidity = ToggleState::Off;
        let mut panel = panel(settings, "defaults");

        panel.restore_defaults().unwrap();

        assert_eq!(panel.settings(), &Settings::default());
        assert_eq!(
            sent(&mut panel),
            ["H50\n", "P25\n", "L35\n", "H50\n", "P25\n", "L35\n"]
        );
        assert_eq!(
            load_settings(panel.settings_path()).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_close_saves_then_closes() {
        let mut panel = panel(Settings::default(), "close");
        panel.set_value(Channel::Phototherapy, 70).unwrap();

        panel.close();

        assert!(!panel.emitter().link().is_open());
        let saved = load_settings(panel.settings_path()).unwrap();
        assert_eq!(saved.phototherapy, 70);

        let _ = sent(&mut panel);
        panel.set_temperature(37.5).unwrap();
        assert!(sent(&mut panel).is_empty());
    }
}
