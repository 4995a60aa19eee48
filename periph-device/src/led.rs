//! LED zones, colours and effect parameters

/// Driver scale for brightness attributes (0-255)
pub const BRIGHTNESS_MAX: u32 = 255;

/// Valid reactive effect speeds; anything else falls back to the slowest
pub const REACTIVE_SPEEDS: std::ops::RangeInclusive<u8> = 1..=4;
pub const REACTIVE_SPEED_DEFAULT: u8 = 4;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Create a new RGB color
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Bytes in driver order
    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Black (all LEDs off)
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    /// White (all LEDs full)
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Red
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    /// Green
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };
    /// Blue
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };
}

/// Lighting zone of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Per-key matrix (keyboards, mats, mug)
    Matrix,
    /// Logo LED (mice)
    Logo,
    /// Scroll wheel LED (mice)
    Scroll,
    /// Backlight (mice without logo control)
    Backlight,
}

impl Zone {
    /// Brightness attribute for this zone
    pub fn brightness_attr(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix_brightness",
            Self::Logo => "logo_led_brightness",
            Self::Scroll => "scroll_led_brightness",
            Self::Backlight => "backlight_led_brightness",
        }
    }

    /// On/off attribute for this zone
    pub fn state_attr(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix_led_state",
            Self::Logo => "logo_led_state",
            Self::Scroll => "scroll_led_state",
            Self::Backlight => "backlight_led_state",
        }
    }

    /// Effect id attribute for single-LED zones
    pub fn effect_attr(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix_effect",
            Self::Logo => "logo_led_effect",
            Self::Scroll => "scroll_led_effect",
            Self::Backlight => "backlight_led_effect",
        }
    }

    /// Colour attribute for single-LED zones
    pub fn rgb_attr(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix_effect_static",
            Self::Logo => "logo_led_rgb",
            Self::Scroll => "scroll_led_rgb",
            Self::Backlight => "backlight_led_rgb",
        }
    }

    /// Matrix-style effect attribute, e.g. `matrix_effect_breath` or
    /// `logo_matrix_effect_breath`
    pub fn matrix_effect_attr(&self, effect: &str) -> String {
        match self {
            Self::Matrix => format!("matrix_effect_{effect}"),
            zone => format!("{}_matrix_effect_{effect}", zone.name()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Logo => "logo",
            Self::Scroll => "scroll",
            Self::Backlight => "backlight",
        }
    }
}

/// Effect ids understood by single-LED zone `*_led_effect` attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZoneEffect {
    Static = 0,
    Blinking = 1,
    Pulsate = 2,
    Spectrum = 4,
}

impl ZoneEffect {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Static),
            1 => Some(Self::Blinking),
            2 => Some(Self::Pulsate),
            4 => Some(Self::Spectrum),
            _ => None,
        }
    }
}
