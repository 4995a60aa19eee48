//! Attribute access layer for kernel-driven HID peripherals
//!
//! A peripheral driver exposes each device property as a file under the
//! device root (for example `/sys/bus/hid/devices/0003:1532:0203.0001`).
//! This crate provides:
//!
//! - the codec between those text/binary files and typed values
//! - an I/O seam so the store can run against sysfs or an in-memory tree
//! - the per-device attribute store with its optional value cache
//! - lazy, retried serial number resolution

pub mod codec;
pub mod error;
pub mod io;
pub mod store;
pub mod types;

pub use error::{AttrError, ParseError};
pub use io::{AttributeIo, MemoryIo, SysfsIo};
pub use store::{AttributeStore, RetryPolicy, SERIAL_ATTRIBUTE, SERIAL_SENTINEL};
pub use types::{AttrKind, AttrValue, CachePolicy};
