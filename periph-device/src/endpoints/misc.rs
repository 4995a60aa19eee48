//! Identity, device mode and polling rate

use std::thread;
use std::time::Duration;

use periph_attr::CachePolicy;
use tracing::{debug, warn};

use crate::device::Device;
use crate::error::Result;

/// Reported when the driver exposes no `version` attribute
pub const FALLBACK_DRIVER_VERSION: &str = "0.0.0";

/// Re-reads of an empty `device_mode` before giving up
const DEVICE_MODE_RETRIES: u32 = 3;
const DEVICE_MODE_BACKOFF: Duration = Duration::from_millis(100);

/// Device modes the driver accepts
const DEVICE_MODES: [u8; 2] = [0x00, 0x03];

/// Polling rates the driver accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum PollRate {
    Hz125 = 125,
    Hz500 = 500,
    Hz1000 = 1000,
}

impl PollRate {
    /// Get polling rate from Hz value
    pub fn from_hz(hz: u16) -> Option<Self> {
        match hz {
            125 => Some(Self::Hz125),
            500 => Some(Self::Hz500),
            1000 => Some(Self::Hz1000),
            _ => None,
        }
    }

    pub fn hz(self) -> u16 {
        self as u16
    }
}

impl Device {
    /// Driver version, or [`FALLBACK_DRIVER_VERSION`] if the driver does not
    /// publish one
    pub fn driver_version(&mut self) -> Result<String> {
        let version = self.attrs()?.read_text("version", CachePolicy::Use);
        match version {
            Ok(version) => Ok(version),
            Err(e) if e.is_not_found() => {
                debug!(device = self.index(), "no version attribute");
                Ok(FALLBACK_DRIVER_VERSION.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn firmware(&mut self) -> Result<String> {
        Ok(self.attrs()?.read_text("firmware_version", CachePolicy::Use)?)
    }

    /// Descriptive name, e.g. "BlackWidow Chroma"
    pub fn device_name(&mut self) -> Result<String> {
        Ok(self.attrs()?.read_text("device_type", CachePolicy::Use)?)
    }

    /// Device family ("keyboard", "mouse", ...)
    pub fn device_type(&self) -> &'static str {
        self.class().device_type
    }

    pub fn has_matrix(&self) -> bool {
        self.class().has_matrix()
    }

    /// `[rows, columns]`, or `[-1, -1]` without a matrix
    pub fn matrix_dimensions(&self) -> [i64; 2] {
        match self.class().matrix_dims {
            Some((rows, cols)) => [i64::from(rows), i64::from(cols)],
            None => [-1, -1],
        }
    }

    pub fn has_dedicated_macro_keys(&self) -> bool {
        self.class().dedicated_macro_keys
    }

    // === Device mode ===

    /// Device mode as `mode:param`, e.g. `0:0`.
    ///
    /// The driver may return nothing right after a mode switch, so empty
    /// content is re-read a few times.
    pub fn device_mode(&mut self) -> Result<String> {
        let mut mode = self.attrs()?.read_text("device_mode", CachePolicy::Bypass)?;
        let mut retries = 0;
        while mode.is_empty() && retries < DEVICE_MODE_RETRIES {
            thread::sleep(DEVICE_MODE_BACKOFF);
            mode = self.attrs()?.read_text("device_mode", CachePolicy::Bypass)?;
            retries += 1;
        }
        Ok(mode)
    }

    /// Set device mode. Modes other than 0x00/0x03 become 0x00 and the
    /// parameter is always 0.
    pub fn set_device_mode(&mut self, mode: u8, param: u8) -> Result<()> {
        let mode = if DEVICE_MODES.contains(&mode) {
            mode
        } else {
            warn!(device = self.index(), mode, "invalid device mode, using 0");
            0
        };
        if param != 0 {
            warn!(device = self.index(), param, "device mode parameter must be 0");
        }
        self.attrs()?.write_bytes("device_mode", &[mode, 0], CachePolicy::Bypass)?;
        Ok(())
    }

    // === Polling rate ===

    /// Set polling rate. Rates the driver does not support are logged and
    /// ignored.
    pub fn set_poll_rate(&mut self, hz: u16) -> Result<()> {
        let Some(rate) = PollRate::from_hz(hz) else {
            warn!(device = self.index(), hz, "invalid poll rate, ignoring");
            return Ok(());
        };
        self.attrs()?.write_int("poll_rate", i64::from(rate.hz()), CachePolicy::Bypass)?;
        Ok(())
    }

    pub fn poll_rate(&mut self) -> Result<i64> {
        Ok(self.attrs()?.read_int("poll_rate", 10, CachePolicy::Bypass)?)
    }

    /// Fire a reactive ripple (mouse mats)
    pub fn trigger_reactive(&mut self) -> Result<()> {
        self.attrs()?.write_flag("matrix_reactive_trigger", true, CachePolicy::Bypass)?;
        self.send_effect_event("triggerReactive", Vec::new());
        Ok(())
    }

    // === Mug ===

    pub fn is_mug_present(&mut self) -> Result<bool> {
        Ok(self.attrs()?.read_flag("is_mug_present", CachePolicy::Bypass)?)
    }
}
