pub mod parsing;

// Re-export commonly used items
pub use parsing::{PanelInput, parse_channel, parse_panel_input, parse_toggle};
