//! Call endpoints, grouped by call-surface interface
//!
//! Each file adds an `impl Device` block. Setters that change something a
//! user can see raise exactly one effect event after the write succeeds.

mod dpi;
mod matrix;
mod misc;
mod modes;
mod power;
mod zone;

pub use dpi::DEFAULT_MAX_DPI;
pub use misc::{PollRate, FALLBACK_DRIVER_VERSION};

#[cfg(test)]
pub(crate) mod fixture;
