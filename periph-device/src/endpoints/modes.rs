//! Game mode and macro mode LEDs

use periph_attr::CachePolicy;
use tracing::debug;

use crate::device::Device;
use crate::error::Result;

/// Key toggles on the extra keyboard interfaces that game mode disables
const GAME_MODE_KEYS: [&str; 3] = ["key_super", "key_alt_tab", "key_alt_f4"];

impl Device {
    pub fn game_mode(&mut self) -> Result<bool> {
        Ok(self.attrs()?.read_flag("game_led_state", CachePolicy::Use)?)
    }

    /// Toggle game mode: blocks the Super, Alt+Tab and Alt+F4 keys on every
    /// extra interface, then switches the LED.
    pub fn set_game_mode(&mut self, enabled: bool) -> Result<()> {
        let value = [u8::from(enabled)];
        for interface in self.extra_interfaces_mut()? {
            for key in GAME_MODE_KEYS {
                interface.write_bytes(key, &value, CachePolicy::Bypass)?;
            }
            debug!(root = %interface.root().display(), enabled, "game mode keys");
        }
        self.attrs()?.write_flag("game_led_state", enabled, CachePolicy::Use)?;
        self.send_effect_event("setGameMode", vec![enabled.into()]);
        Ok(())
    }

    pub fn macro_mode(&mut self) -> Result<bool> {
        Ok(self.attrs()?.read_flag("macro_led_state", CachePolicy::Bypass)?)
    }

    pub fn set_macro_mode(&mut self, enabled: bool) -> Result<()> {
        self.attrs()?.write_flag("macro_led_state", enabled, CachePolicy::Bypass)?;
        self.send_effect_event("setMacroMode", vec![enabled.into()]);
        Ok(())
    }

    /// Macro LED effect id (0 static, 1 blinking)
    pub fn macro_effect(&mut self) -> Result<i64> {
        Ok(self.attrs()?.read_int("macro_led_effect", 10, CachePolicy::Bypass)?)
    }

    pub fn set_macro_effect(&mut self, effect: u8) -> Result<()> {
        self.attrs()?
            .write_int("macro_led_effect", i64::from(effect), CachePolicy::Bypass)?;
        self.send_effect_event("setMacroEffect", vec![effect.into()]);
        Ok(())
    }
}
