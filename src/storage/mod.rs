//! Settings storage and persistence module.
//!
//! Handles saving and loading the panel settings record to/from disk.

pub mod settings;
pub mod types;

// Re-export commonly used items
pub use settings::*;
pub use types::*;
