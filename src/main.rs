//! periphd - host daemon for kernel-driven HID peripherals
//!
//! `periphd run` attaches the configured devices and serves them; the other
//! subcommands either answer from the built-in class table or talk to a
//! running daemon.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use periphd::Config;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run => {
            info!("Loaded config from {:?}", config_path);
            periphd::daemon::run(config).await
        }
        Commands::Classes => commands::local::classes(),
        Commands::Methods { class } => commands::local::methods(&class),
        #[cfg(feature = "dbus")]
        Commands::List => commands::client::list(&config.dbus).await,
        #[cfg(feature = "dbus")]
        Commands::Call {
            serial,
            interface,
            method,
            args,
        } => commands::client::call(&config.dbus, &serial, &interface, &method, &args).await,
        #[cfg(feature = "dbus")]
        Commands::Suspend => commands::client::suspend(&config.dbus).await,
        #[cfg(feature = "dbus")]
        Commands::Resume => commands::client::resume(&config.dbus).await,
        #[cfg(feature = "dbus")]
        Commands::Sync { enabled } => commands::client::set_effect_sync(&config.dbus, enabled).await,
    }
}
