//! Device objects for kernel-driven HID peripherals
//!
//! A [`Device`] owns one attribute store and one identity, exposes the
//! lighting/power/DPI endpoints of its [`DeviceClass`], tracks its power
//! state and fans state-change [`Event`]s out to observers and, when effect
//! sync is on, to a parent [`Relay`].

pub mod class;
pub mod device;
pub mod endpoints;
pub mod error;
pub mod event;
pub mod led;
pub mod observer;

pub use class::{find_class, DeviceClass, MethodId, SuspendStrategy, CLASSES};
pub use device::{Device, PowerState, DEFAULT_RESUME_BRIGHTNESS};
pub use endpoints::{PollRate, DEFAULT_MAX_DPI, FALLBACK_DRIVER_VERSION};
pub use error::DeviceError;
pub use event::{Event, EventArg, EventCategory, Origin};
pub use led::{RgbColor, Zone, ZoneEffect};
pub use observer::{Observer, ObserverError, ObserverList, Relay};
