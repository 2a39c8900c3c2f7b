//! Control panel side of the link.
//!
//! Command emission, the panel context object and the serial link behind it.

pub mod emitter;
pub mod link;
pub mod panel;

pub use emitter::{CommandEmitter, enforce_min};
pub use link::{CommandLink, MemoryLink, SerialLink};
pub use panel::ControlPanel;
