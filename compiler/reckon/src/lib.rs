//! Reckon CLI support.
//!
//! The binary in `main.rs` only parses arguments; everything it runs lives
//! here so integration tests can drive it without spawning a process.

pub mod commands;
pub mod options;
mod tracing_setup;

pub use options::{parse_sheet_options, SheetOptions};
pub use tracing_setup::init_tracing;
