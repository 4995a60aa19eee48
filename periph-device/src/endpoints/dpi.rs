//! Mouse sensor DPI

use periph_attr::CachePolicy;
use tracing::warn;

use crate::class::{DpiEncoding, DpiSpec};
use crate::device::Device;
use crate::error::{DeviceError, Result};

/// Reported by `maxDPI` for classes without a DPI table
pub const DEFAULT_MAX_DPI: u16 = 500;

/// Lowest DPI any sensor accepts
const MIN_DPI: u16 = 100;

impl Device {
    pub fn max_dpi(&self) -> u16 {
        self.class().dpi.map_or(DEFAULT_MAX_DPI, |spec| spec.max)
    }

    /// Set X and Y DPI, each clamped to `100..=max_dpi()`
    pub fn set_dpi(&mut self, x: u16, y: u16) -> Result<()> {
        let spec = self.dpi_spec();
        let x = self.clamp_dpi(x, spec.max);
        let y = self.clamp_dpi(y, spec.max);

        let payload = match spec.encoding {
            DpiEncoding::Word => {
                let mut payload = Vec::with_capacity(4);
                payload.extend_from_slice(&x.to_be_bytes());
                payload.extend_from_slice(&y.to_be_bytes());
                payload
            }
            DpiEncoding::Scaled => vec![scale_down(x, spec.max), scale_down(y, spec.max)],
        };
        self.attrs()?.write_bytes("dpi", &payload, CachePolicy::Bypass)?;
        Ok(())
    }

    /// Current `[x, y]` DPI. The driver reports `x:y`.
    pub fn dpi(&mut self) -> Result<[i64; 2]> {
        let spec = self.dpi_spec();
        let text = self.attrs()?.read_text("dpi", CachePolicy::Bypass)?;

        let parse = |part: Option<&str>| -> Result<i64> {
            part.and_then(|p| p.trim().parse::<i64>().ok())
                .ok_or_else(|| DeviceError::UnexpectedContent(format!("dpi: {text:?}")))
        };
        let mut parts = text.split(':');
        let (x, y) = (parse(parts.next())?, parse(parts.next())?);

        Ok(match spec.encoding {
            DpiEncoding::Word => [x, y],
            DpiEncoding::Scaled => [scale_up(x, spec.max), scale_up(y, spec.max)],
        })
    }

    fn dpi_spec(&self) -> DpiSpec {
        self.class().dpi.unwrap_or(DpiSpec {
            max: DEFAULT_MAX_DPI,
            encoding: DpiEncoding::Word,
        })
    }

    fn clamp_dpi(&self, dpi: u16, max: u16) -> u16 {
        let clamped = dpi.clamp(MIN_DPI, max.max(MIN_DPI));
        if clamped != dpi {
            warn!(device = self.index(), dpi, clamped, "DPI out of range");
        }
        clamped
    }
}

/// DPI onto the byte scale used by [`DpiEncoding::Scaled`] sensors
fn scale_down(dpi: u16, max: u16) -> u8 {
    (f64::from(dpi) / f64::from(max) * 255.0).round() as u8
}

fn scale_up(raw: i64, max: u16) -> i64 {
    (raw as f64 / 255.0 * f64::from(max)).round() as i64
}
