//! Battery and charging (wireless devices)

use periph_attr::CachePolicy;
use tracing::warn;

use crate::device::{colour_args, Device};
use crate::error::Result;
use crate::led::RgbColor;

/// Driver scale for `charge_level` and `charge_low_threshold`
const CHARGE_MAX: u32 = 255;

impl Device {
    /// Battery level in percent, or -1 when the driver reports no reading
    pub fn battery(&mut self) -> Result<f64> {
        let level = self
            .attrs()?
            .read_percent("charge_level", Some(CHARGE_MAX), CachePolicy::Bypass)?;
        Ok(if level < 0.0 { -1.0 } else { level })
    }

    pub fn is_charging(&mut self) -> Result<bool> {
        Ok(self.attrs()?.read_int("charge_status", 10, CachePolicy::Bypass)? != 0)
    }

    /// Seconds of inactivity before the device sleeps
    pub fn set_idle_time(&mut self, seconds: u16) -> Result<()> {
        self.attrs()?
            .write_int("device_idle_time", i64::from(seconds), CachePolicy::Bypass)?;
        Ok(())
    }

    /// Low battery warning level in percent, stored as `floor(pct / 100 * 255)`
    pub fn set_low_battery_threshold(&mut self, percent: u8) -> Result<()> {
        let percent = if percent > 100 {
            warn!(device = self.index(), percent, "battery threshold above 100%, clamping");
            100
        } else {
            percent
        };
        let raw = (f64::from(percent) / 100.0 * f64::from(CHARGE_MAX)).floor() as i64;
        self.attrs()?.write_int("charge_low_threshold", raw, CachePolicy::Bypass)?;
        Ok(())
    }

    /// 0 keeps the current effect while charging, 1 shows the charge colour
    pub fn set_charge_effect(&mut self, effect: u8) -> Result<()> {
        self.attrs()?.write_bytes("charge_effect", &[effect], CachePolicy::Bypass)?;
        self.send_effect_event("setChargeEffect", vec![effect.into()]);
        Ok(())
    }

    pub fn set_charge_colour(&mut self, colour: RgbColor) -> Result<()> {
        self.attrs()?
            .write_bytes("charge_colour", &colour.to_bytes(), CachePolicy::Bypass)?;
        self.send_effect_event("setChargeColour", colour_args(&[colour]));
        Ok(())
    }
}
