//! Command handlers for the CLI application.
//!
//! - `local`: queries answered from the built-in class table
//! - `client`: commands sent to a running daemon over D-Bus

#[cfg(feature = "dbus")]
pub mod client;
pub mod local;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;
