//! Single-LED zones (logo, scroll wheel, backlight) and zone brightness

use periph_attr::CachePolicy;

use crate::device::{colour_args, Device};
use crate::error::Result;
use crate::led::{RgbColor, Zone, ZoneEffect, BRIGHTNESS_MAX};

impl Device {
    /// Whether the zone LED is lit
    pub fn zone_active(&mut self, zone: Zone) -> Result<bool> {
        let raw = self.attrs()?.read_flag(zone.state_attr(), CachePolicy::Bypass)?;
        Ok(raw != self.inverted(zone))
    }

    /// Switch the zone LED on or off; raises `setActive` with the requested state
    pub fn set_zone_active(&mut self, zone: Zone, active: bool) -> Result<()> {
        let raw = active != self.inverted(zone);
        self.attrs()?.write_flag(zone.state_attr(), raw, CachePolicy::Bypass)?;
        self.send_effect_event("setActive", vec![active.into()]);
        Ok(())
    }

    /// Active effect id of a single-LED zone
    pub fn zone_effect(&mut self, zone: Zone) -> Result<i64> {
        Ok(self.attrs()?.read_int(zone.effect_attr(), 10, CachePolicy::Bypass)?)
    }

    /// Zone brightness in percent. Always read from the driver.
    pub fn zone_brightness(&mut self, zone: Zone) -> Result<f64> {
        Ok(self
            .attrs()?
            .read_percent(zone.brightness_attr(), Some(BRIGHTNESS_MAX), CachePolicy::Bypass)?)
    }

    /// Set zone brightness in percent (clamped to 0-100); raises
    /// `setBrightness` with the applied value
    pub fn set_zone_brightness(&mut self, zone: Zone, percent: f64) -> Result<f64> {
        let applied = self.attrs()?.write_percent(
            zone.brightness_attr(),
            percent,
            Some(BRIGHTNESS_MAX),
            CachePolicy::Bypass,
        )?;
        self.send_effect_event("setBrightness", vec![applied.into()]);
        Ok(applied)
    }

    pub fn set_zone_static(&mut self, zone: Zone, colour: RgbColor) -> Result<()> {
        if self.class().zone_matrix_effects {
            return self.effect_static(zone, colour);
        }
        self.zone_colour_effect(zone, ZoneEffect::Static, "setStatic", colour)
    }

    pub fn set_zone_blinking(&mut self, zone: Zone, colour: RgbColor) -> Result<()> {
        self.zone_colour_effect(zone, ZoneEffect::Blinking, "setBlinking", colour)
    }

    pub fn set_zone_pulsate(&mut self, zone: Zone, colour: RgbColor) -> Result<()> {
        self.zone_colour_effect(zone, ZoneEffect::Pulsate, "setPulsate", colour)
    }

    /// Colour cycling; keeps the stored colour
    pub fn set_zone_spectrum(&mut self, zone: Zone) -> Result<()> {
        if self.class().zone_matrix_effects {
            return self.effect_spectrum(zone);
        }
        self.write_zone_effect(zone, ZoneEffect::Spectrum)?;
        self.send_effect_event("setSpectrum", Vec::new());
        Ok(())
    }

    // Zones driven through `<zone>_matrix_effect_*` attributes

    pub fn set_zone_none(&mut self, zone: Zone) -> Result<()> {
        self.effect_none(zone)
    }

    /// Speeds outside 1..=4 become 4
    pub fn set_zone_reactive(&mut self, zone: Zone, colour: RgbColor, speed: u8) -> Result<()> {
        self.effect_reactive(zone, colour, speed)
    }

    pub fn set_zone_breath_random(&mut self, zone: Zone) -> Result<()> {
        self.effect_breath_random(zone)
    }

    pub fn set_zone_breath_single(&mut self, zone: Zone, colour: RgbColor) -> Result<()> {
        self.effect_breath(zone, "setBreathSingle", &[colour])
    }

    pub fn set_zone_breath_dual(&mut self, zone: Zone, first: RgbColor, second: RgbColor) -> Result<()> {
        self.effect_breath(zone, "setBreathDual", &[first, second])
    }

    /// Colour first, then the effect id that picks it up
    fn zone_colour_effect(
        &mut self,
        zone: Zone,
        effect: ZoneEffect,
        name: &'static str,
        colour: RgbColor,
    ) -> Result<()> {
        self.attrs()?
            .write_bytes(zone.rgb_attr(), &colour.to_bytes(), CachePolicy::Bypass)?;
        self.write_zone_effect(zone, effect)?;
        self.send_effect_event(name, colour_args(&[colour]));
        Ok(())
    }

    fn write_zone_effect(&mut self, zone: Zone, effect: ZoneEffect) -> Result<()> {
        self.attrs()?
            .write_int(zone.effect_attr(), effect as i64, CachePolicy::Bypass)?;
        Ok(())
    }

    fn inverted(&self, zone: Zone) -> bool {
        zone == Zone::Logo && self.class().logo_active_inverted
    }
}
