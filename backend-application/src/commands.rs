pub mod intent_commands;
pub mod scan_commands;

pub use intent_commands::*;
pub use scan_commands::*;
