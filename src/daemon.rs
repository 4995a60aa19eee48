//! Daemon lifecycle: attach devices, serve, wait for shutdown, close.

use std::sync::Arc;

use periph_device::{Event, ObserverError};
use tokio::signal;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::manager::DeviceManager;

/// Run the daemon until Ctrl-C or SIGTERM.
///
/// Devices are attached from `config` (serial resolution may block briefly
/// per device), the D-Bus interface is served when the `dbus` feature is on,
/// and every device is closed on the way out.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let attach_config = config.clone();
    let manager =
        tokio::task::spawn_blocking(move || DeviceManager::from_config(&attach_config)).await??;

    if manager.is_empty() {
        warn!("no devices attached");
    }
    manager.register_observer_all(event_logger());

    #[cfg(feature = "dbus")]
    let _conn = {
        let conn = crate::dbus::serve(Arc::clone(&manager), &config.dbus).await?;
        info!(name = %config.dbus.name, bus = ?config.dbus.bus, "D-Bus interface ready");
        conn
    };

    info!(effect_sync = manager.effect_sync(), "ready");
    shutdown_signal().await;

    let closing = Arc::clone(&manager);
    tokio::task::spawn_blocking(move || closing.close_all()).await?;
    info!("shutdown complete");
    Ok(())
}

/// Logs every event a device raises
fn event_logger() -> Arc<dyn periph_device::Observer> {
    Arc::new(|event: &Event| -> Result<(), ObserverError> {
        debug!(%event, "effect");
        Ok(())
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
