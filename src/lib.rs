// periphd - host daemon for kernel-driven HID peripherals
// Call dispatch, device coordination, configuration and the D-Bus surface

pub mod config;
pub mod daemon;
#[cfg(feature = "dbus")]
pub mod dbus;
pub mod error;
mod handlers;
pub mod manager;
pub mod registry;
pub mod value;

pub use config::{BusKind, Config, DbusConfig, DeviceConfig, SerialRetryConfig};
pub use error::{CallError, ConfigError};
pub use manager::{DeviceManager, DeviceSummary};
pub use registry::{handler_registry, Handler, HandlerRegistry, HandlerRegistryBuilder};
pub use value::{parse_args, Args, Value};
