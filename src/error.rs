//! Daemon error types

use std::io;
use std::path::PathBuf;

use periph_device::DeviceError;
use thiserror::Error;

/// Errors returned to remote callers
#[derive(Error, Debug)]
pub enum CallError {
    /// No device with this serial
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// Interface/method pair not exposed by the device
    #[error("Unknown method: {interface}.{method}")]
    UnknownMethod { interface: String, method: String },

    /// Wrong argument count or type
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Device operation failed
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Errors loading the configuration or attaching configured devices
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown device class: {0}")]
    UnknownClass(String),

    #[error("Duplicate device serial: {0}")]
    DuplicateSerial(String),
}
