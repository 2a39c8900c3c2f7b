//! Settings persistence.
//!
//! The settings record is read once at start-up and written back wholesale
//! on save and on exit. Writes overwrite the file in place.

use std::path::{Path, PathBuf};

use crate::error::{IncubatorError, Result};
use crate::storage::types::Settings;

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "incubator-control";
const SETTINGS_FILE: &str = "settings.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/incubator-control/
/// - Windows: %APPDATA%\incubator-control\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| IncubatorError::Settings("Could not find config directory".into()))
}

/// Get the default path of the settings file.
pub fn default_settings_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(SETTINGS_FILE))
}

// =============================================================================
// Storage Functions
// =============================================================================

/// Load settings from disk.
///
/// A missing file yields the built-in defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| IncubatorError::Settings(format!("Failed to read settings: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| IncubatorError::Settings(format!("Failed to parse settings: {}", e)))
}

/// Save settings to disk, replacing the previous content.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            IncubatorError::Settings(format!("Failed to create settings dir: {}", e))
        })?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| IncubatorError::Settings(format!("Failed to serialize settings: {}", e)))?;

    std::fs::write(path, content)
        .map_err(|e| IncubatorError::Settings(format!("Failed to write settings: {}", e)))?;

    Ok(())
}
