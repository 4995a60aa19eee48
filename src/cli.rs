// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "periphd")]
#[command(author, version, about = "Host daemon for kernel-driven HID peripherals")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/periphd/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Daemon ===
    /// Attach configured devices and serve them until interrupted
    Run,

    // === Local queries ===
    /// List known device classes
    Classes,

    /// List the methods a device class exposes
    Methods {
        /// Class name (see `classes`)
        class: String,
    },

    // === Client commands (talk to a running daemon) ===
    /// List attached devices
    #[cfg(feature = "dbus")]
    #[command(visible_alias = "ls")]
    List,

    /// Call a device method
    #[cfg(feature = "dbus")]
    Call {
        /// Device serial
        serial: String,
        /// Interface, e.g. periph.device.lighting.chroma
        interface: String,
        /// Method, e.g. setStatic
        method: String,
        /// Arguments, one JSON value each (e.g. 255 0 16, true, "[1,2,3]")
        args: Vec<String>,
    },

    /// Suspend all devices (lights off, brightness saved)
    #[cfg(feature = "dbus")]
    Suspend,

    /// Resume all devices
    #[cfg(feature = "dbus")]
    Resume,

    /// Enable or disable effect sync across devices
    #[cfg(feature = "dbus")]
    Sync {
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        enabled: bool,
    },
}
