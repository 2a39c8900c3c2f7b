//! Incubator Control Library
//!
//! Both ends of the serial link of an infant incubator: the operator's
//! control panel and the device firmware loop that drives the light and
//! phototherapy PWM outputs.
//!
//! # Features
//!
//! - Line protocol: `<prefix><value>\n` for humidity, temperature,
//!   phototherapy and light, plus `exit_program`
//! - Control panel with per-channel floors, toggles and persisted settings
//! - Non-blocking device command loop with range checks and duty mapping
//!
//! # Example
//!
//! ```no_run
//! use incubator_control::config::LinkConfig;
//! use incubator_control::controller::{CommandEmitter, ControlPanel, SerialLink};
//! use incubator_control::protocol::Channel;
//! use incubator_control::storage;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = storage::default_settings_path()?;
//!     let settings = storage::load_settings(&path)?;
//!
//!     let link = SerialLink::open(&LinkConfig::default());
//!     let mut panel = ControlPanel::new(settings, CommandEmitter::new(link), path);
//!     panel.sync();
//!
//!     panel.set_value(Channel::Light, 60)?;
//!     panel.set_temperature(37.5)?;
//!
//!     panel.close();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use controller::{CommandEmitter, ControlPanel};
pub use device::CommandLoop;
pub use error::{IncubatorError, Result};
pub use protocol::Channel;
pub use storage::Settings;
