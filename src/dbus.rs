//! D-Bus interface for the daemon.
//!
//! Bus name: `org.periph.Daemon1` (configurable)
//! Object path: `/org/periph/Daemon1`
//!
//! Call arguments and replies travel as JSON so one method covers every
//! device endpoint.

use std::sync::Arc;

use periph_device::{Event, ObserverError};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use zbus::interface;
use zbus::object_server::SignalEmitter;

use crate::config::{BusKind, DbusConfig, OBJECT_PATH};
use crate::error::CallError;
use crate::manager::DeviceManager;
use crate::value::{parse_args, Value};

/// Interface name served at [`OBJECT_PATH`]
pub const INTERFACE_NAME: &str = "org.periph.Daemon1";

impl From<CallError> for zbus::fdo::Error {
    fn from(e: CallError) -> Self {
        match e {
            CallError::UnknownDevice(_) => zbus::fdo::Error::UnknownObject(e.to_string()),
            CallError::UnknownMethod { .. } => zbus::fdo::Error::UnknownMethod(e.to_string()),
            CallError::InvalidArgs(_) => zbus::fdo::Error::InvalidArgs(e.to_string()),
            CallError::Device(_) => zbus::fdo::Error::Failed(e.to_string()),
        }
    }
}

/// D-Bus interface implementation.
pub struct DaemonInterface {
    manager: Arc<DeviceManager>,
}

impl DaemonInterface {
    pub fn new(manager: Arc<DeviceManager>) -> Self {
        Self { manager }
    }

    /// Run blocking device work off the executor
    async fn blocking<T, F>(&self, f: F) -> zbus::fdo::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DeviceManager) -> T + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        tokio::task::spawn_blocking(move || f(&manager))
            .await
            .map_err(|e| zbus::fdo::Error::Failed(format!("worker: {e}")))
    }
}

#[interface(name = "org.periph.Daemon1")]
impl DaemonInterface {
    /// JSON array of attached devices
    async fn list_devices(&self) -> zbus::fdo::Result<String> {
        let devices = self.blocking(|m| m.list()).await?;
        serde_json::to_string(&devices).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// `interface.method` pairs callable on a device
    async fn list_methods(&self, serial: &str) -> zbus::fdo::Result<Vec<String>> {
        let methods = self.manager.methods(serial)?;
        Ok(methods.iter().map(|(i, m)| format!("{i}.{m}")).collect())
    }

    /// Call a device endpoint. `args_json` is a JSON array; the reply is JSON.
    #[zbus(name = "Call")]
    async fn invoke(
        &self,
        serial: &str,
        interface: &str,
        method: &str,
        args_json: &str,
    ) -> zbus::fdo::Result<String> {
        let args = parse_args(args_json)?;
        let (serial, interface, method) =
            (serial.to_string(), interface.to_string(), method.to_string());
        let reply: Value = self
            .blocking(move |m| m.call(&serial, &interface, &method, &args))
            .await??;
        serde_json::to_string(&reply).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Suspend all devices. Returns the serials that failed.
    async fn suspend(&self) -> zbus::fdo::Result<Vec<String>> {
        let failures = self.blocking(|m| m.suspend_all()).await?;
        Ok(failures.into_iter().map(|(serial, _)| serial).collect())
    }

    /// Resume all devices. Returns the serials that failed.
    async fn resume(&self) -> zbus::fdo::Result<Vec<String>> {
        let failures = self.blocking(|m| m.resume_all()).await?;
        Ok(failures.into_iter().map(|(serial, _)| serial).collect())
    }

    async fn set_effect_sync(&self, enabled: bool) -> zbus::fdo::Result<()> {
        self.blocking(move |m| m.set_effect_sync(enabled)).await
    }

    #[zbus(property)]
    async fn effect_sync(&self) -> bool {
        self.manager.effect_sync()
    }

    /// Emitted for every effect event a device raises
    #[zbus(signal)]
    async fn effect_changed(
        emitter: &SignalEmitter<'_>,
        serial: &str,
        effect: &str,
        args_json: &str,
    ) -> zbus::Result<()>;
}

/// `(serial, effect, args_json)` queued for signal emission
type SignalMessage = (String, &'static str, String);

/// Serve the interface and forward device events as `EffectChanged` signals.
pub async fn serve(
    manager: Arc<DeviceManager>,
    config: &DbusConfig,
) -> zbus::Result<zbus::Connection> {
    let builder = match config.bus {
        BusKind::Session => zbus::connection::Builder::session()?,
        BusKind::System => zbus::connection::Builder::system()?,
    };
    let conn = builder
        .name(config.name.as_str())?
        .serve_at(OBJECT_PATH, DaemonInterface::new(Arc::clone(&manager)))?
        .build()
        .await?;

    let (tx, rx) = mpsc::unbounded_channel();
    register_signal_observers(&manager, tx);
    tokio::spawn(emit_signals(conn.clone(), rx));

    Ok(conn)
}

/// One observer per device, forwarding only events the device raised itself.
/// Relayed copies arriving from siblings are skipped so each event is
/// signalled once.
fn register_signal_observers(manager: &DeviceManager, tx: mpsc::UnboundedSender<SignalMessage>) {
    for device in manager.list() {
        let serial = device.serial.clone();
        let tx = tx.clone();
        let observer = Arc::new(move |event: &Event| -> Result<(), ObserverError> {
            if event.origin.serial != serial {
                return Ok(());
            }
            let args: Vec<Value> = event.args.iter().copied().map(Value::from).collect();
            let args = serde_json::to_string(&args).map_err(|e| ObserverError(e.to_string()))?;
            tx.send((serial.clone(), event.name, args))
                .map_err(|_| ObserverError("signal channel closed".into()))
        });
        if let Err(e) = manager.register_observer(&device.serial, observer) {
            warn!(serial = %device.serial, "cannot attach signal observer: {e}");
        }
    }
}

async fn emit_signals(conn: zbus::Connection, mut rx: mpsc::UnboundedReceiver<SignalMessage>) {
    let iface = match conn
        .object_server()
        .interface::<_, DaemonInterface>(OBJECT_PATH)
        .await
    {
        Ok(iface) => iface,
        Err(e) => {
            warn!("signal emitter unavailable: {e}");
            return;
        }
    };

    while let Some((serial, effect, args)) = rx.recv().await {
        debug!(serial = %serial, effect, "EffectChanged");
        if let Err(e) =
            DaemonInterface::effect_changed(iface.signal_emitter(), &serial, effect, &args).await
        {
            warn!(serial = %serial, effect, "signal emission failed: {e}");
        }
    }
}

/// Client-side proxy for the daemon object
pub async fn proxy(config: &DbusConfig) -> zbus::Result<zbus::Proxy<'static>> {
    let conn = match config.bus {
        BusKind::Session => zbus::Connection::session().await?,
        BusKind::System => zbus::Connection::system().await?,
    };
    zbus::Proxy::new_owned(conn, config.name.clone(), OBJECT_PATH, INTERFACE_NAME).await
}
