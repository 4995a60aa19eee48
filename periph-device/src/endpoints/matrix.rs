//! LED matrix effects

use periph_attr::CachePolicy;
use tracing::warn;

use crate::device::{colour_args, Device};
use crate::error::Result;
use crate::event::EventArg;
use crate::led::{RgbColor, Zone, REACTIVE_SPEEDS, REACTIVE_SPEED_DEFAULT};

impl Device {
    // === Brightness ===

    /// Matrix brightness in percent
    pub fn brightness(&mut self) -> Result<f64> {
        self.zone_brightness(Zone::Matrix)
    }

    /// Set matrix brightness in percent; returns the value actually applied
    pub fn set_brightness(&mut self, percent: f64) -> Result<f64> {
        self.set_zone_brightness(Zone::Matrix, percent)
    }

    // === Effects ===

    pub fn set_none(&mut self) -> Result<()> {
        self.effect_none(Zone::Matrix)
    }

    pub fn set_spectrum(&mut self) -> Result<()> {
        self.effect_spectrum(Zone::Matrix)
    }

    pub fn set_static(&mut self, colour: RgbColor) -> Result<()> {
        self.effect_static(Zone::Matrix, colour)
    }

    pub fn set_blinking(&mut self, colour: RgbColor) -> Result<()> {
        self.attrs()?.write_bytes("matrix_effect_blinking", &colour.to_bytes(), CachePolicy::Bypass)?;
        self.send_effect_event("setBlinking", colour_args(&[colour]));
        Ok(())
    }

    /// Wave effect. Directions the class does not know fall back to its
    /// first direction; the event carries the requested direction.
    pub fn set_wave(&mut self, direction: i64) -> Result<()> {
        let directions = self.class().wave_directions;
        let effective = if directions.contains(&direction) {
            direction
        } else {
            let fallback = directions.first().copied().unwrap_or(1);
            warn!(device = self.index(), direction, fallback, "invalid wave direction");
            fallback
        };
        self.attrs()?
            .write_text("matrix_effect_wave", &effective.to_string(), CachePolicy::Bypass)?;
        self.send_effect_event("setWave", vec![direction.into()]);
        Ok(())
    }

    /// Reactive effect. Speeds outside 1..=4 become 4.
    pub fn set_reactive(&mut self, colour: RgbColor, speed: u8) -> Result<()> {
        self.effect_reactive(Zone::Matrix, colour, speed)
    }

    // === Breathing ===

    pub fn set_breath_random(&mut self) -> Result<()> {
        self.effect_breath_random(Zone::Matrix)
    }

    pub fn set_breath_single(&mut self, colour: RgbColor) -> Result<()> {
        self.effect_breath(Zone::Matrix, "setBreathSingle", &[colour])
    }

    pub fn set_breath_dual(&mut self, first: RgbColor, second: RgbColor) -> Result<()> {
        self.effect_breath(Zone::Matrix, "setBreathDual", &[first, second])
    }

    pub fn set_breath_triple(&mut self, first: RgbColor, second: RgbColor, third: RgbColor) -> Result<()> {
        self.effect_breath(Zone::Matrix, "setBreathTriple", &[first, second, third])
    }

    // === Matrix-style effect attributes, shared with zones that use them ===

    pub(crate) fn effect_none(&mut self, zone: Zone) -> Result<()> {
        self.attrs()?
            .write_flag(&zone.matrix_effect_attr("none"), true, CachePolicy::Bypass)?;
        self.send_effect_event("setNone", Vec::new());
        Ok(())
    }

    pub(crate) fn effect_spectrum(&mut self, zone: Zone) -> Result<()> {
        self.attrs()?
            .write_flag(&zone.matrix_effect_attr("spectrum"), true, CachePolicy::Bypass)?;
        self.send_effect_event("setSpectrum", Vec::new());
        Ok(())
    }

    pub(crate) fn effect_static(&mut self, zone: Zone, colour: RgbColor) -> Result<()> {
        self.attrs()?.write_bytes(
            &zone.matrix_effect_attr("static"),
            &colour.to_bytes(),
            CachePolicy::Bypass,
        )?;
        self.send_effect_event("setStatic", colour_args(&[colour]));
        Ok(())
    }

    /// Payload is `[speed, r, g, b]`; the event carries `r, g, b, speed` as requested
    pub(crate) fn effect_reactive(&mut self, zone: Zone, colour: RgbColor, speed: u8) -> Result<()> {
        let effective = if REACTIVE_SPEEDS.contains(&speed) {
            speed
        } else {
            warn!(device = self.index(), speed, "invalid reactive speed, using {REACTIVE_SPEED_DEFAULT}");
            REACTIVE_SPEED_DEFAULT
        };
        let [r, g, b] = colour.to_bytes();
        self.attrs()?.write_bytes(
            &zone.matrix_effect_attr("reactive"),
            &[effective, r, g, b],
            CachePolicy::Bypass,
        )?;

        let mut args = colour_args(&[colour]);
        args.push(speed.into());
        self.send_effect_event("setReactive", args);
        Ok(())
    }

    pub(crate) fn effect_breath_random(&mut self, zone: Zone) -> Result<()> {
        self.attrs()?
            .write_bytes(&zone.matrix_effect_attr("breath"), &[1], CachePolicy::Bypass)?;
        self.send_effect_event("setBreathRandom", Vec::new());
        Ok(())
    }

    pub(crate) fn effect_breath(
        &mut self,
        zone: Zone,
        effect: &'static str,
        colours: &[RgbColor],
    ) -> Result<()> {
        let payload: Vec<u8> = colours.iter().flat_map(|c| c.to_bytes()).collect();
        self.attrs()?
            .write_bytes(&zone.matrix_effect_attr("breath"), &payload, CachePolicy::Bypass)?;
        self.send_effect_event(effect, colour_args(colours));
        Ok(())
    }

    // === Starlight ===

    pub fn set_starlight_random(&mut self, speed: u8) -> Result<()> {
        self.starlight("setStarlightRandom", speed, &[])
    }

    pub fn set_starlight_single(&mut self, speed: u8, colour: RgbColor) -> Result<()> {
        self.starlight("setStarlightSingle", speed, &[colour])
    }

    pub fn set_starlight_dual(&mut self, speed: u8, first: RgbColor, second: RgbColor) -> Result<()> {
        self.starlight("setStarlightDual", speed, &[first, second])
    }

    /// Payload and event both lead with the speed
    fn starlight(&mut self, effect: &'static str, speed: u8, colours: &[RgbColor]) -> Result<()> {
        let mut payload = vec![speed];
        payload.extend(colours.iter().flat_map(|c| c.to_bytes()));
        self.attrs()?.write_bytes("matrix_effect_starlight", &payload, CachePolicy::Bypass)?;

        let mut args = vec![EventArg::from(speed)];
        args.extend(colour_args(colours));
        self.send_effect_event(effect, args);
        Ok(())
    }

    // === Custom frames ===

    /// Show the frame staged with [`Device::set_key_row`]
    pub fn set_custom(&mut self) -> Result<()> {
        self.attrs()?.write_bytes("matrix_effect_custom", &[1], CachePolicy::Bypass)?;
        self.send_effect_event("setCustom", Vec::new());
        Ok(())
    }

    /// Stage one matrix row: `[row, r, g, b, r, g, b, ...]`.
    ///
    /// Staging alone changes nothing visible, so no event is raised.
    pub fn set_key_row(&mut self, payload: &[u8]) -> Result<()> {
        self.attrs()?.write_bytes("matrix_custom_frame", payload, CachePolicy::Bypass)?;
        Ok(())
    }

    // === Client-rendered effects ===

    /// Ripple is drawn by a client from key presses; only the event is raised
    pub fn set_ripple(&mut self, colour: RgbColor, refresh_rate: f64) -> Result<()> {
        self.ensure_open()?;
        let mut args = colour_args(&[colour]);
        args.push(refresh_rate.into());
        self.send_effect_event("setRipple", args);
        Ok(())
    }

    /// Ripple in random colours. Raises `setRipple` with the colour slots absent.
    pub fn set_ripple_random_colour(&mut self, refresh_rate: f64) -> Result<()> {
        self.ensure_open()?;
        let args = vec![
            EventArg::Absent,
            EventArg::Absent,
            EventArg::Absent,
            refresh_rate.into(),
        ];
        self.send_effect_event("setRipple", args);
        Ok(())
    }

    // === Legacy keyboards ===

    /// Active effect id on keyboards without a colour matrix
    pub fn legacy_effect(&mut self) -> Result<i64> {
        Ok(self.attrs()?.read_int("matrix_effect_pulsate", 10, CachePolicy::Bypass)?)
    }

    pub fn set_legacy_pulsate(&mut self) -> Result<()> {
        self.attrs()?.write_flag("matrix_effect_pulsate", true, CachePolicy::Bypass)?;
        self.send_effect_event("setPulsate", Vec::new());
        Ok(())
    }

    pub fn set_legacy_static(&mut self) -> Result<()> {
        self.attrs()?.write_flag("matrix_effect_static", true, CachePolicy::Bypass)?;
        self.send_effect_event("setStatic", Vec::new());
        Ok(())
    }
}
