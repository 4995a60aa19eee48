//! Device error types

use periph_attr::AttrError;
use thiserror::Error;

/// Errors from device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Attribute read/write failed
    #[error("Attribute error: {0}")]
    Attr(#[from] AttrError),

    /// Device was closed
    #[error("Device {0} is closed")]
    Closed(String),

    /// Feature not supported by this device class
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Attribute content outside what the driver documents
    #[error("Unexpected attribute content: {0}")]
    UnexpectedContent(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
