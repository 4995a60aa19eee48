//! Static device class table
//!
//! A class describes a family of devices sharing a driver layout: which
//! lighting zones exist, how the device is suspended and which
//! `(interface, method)` pairs it exposes on the call surface.

use crate::led::Zone;

/// `(interface, method)` as seen by remote callers
pub type MethodId = (&'static str, &'static str);

// Call-surface interfaces
pub const MISC: &str = "periph.device.misc";
pub const BRIGHTNESS: &str = "periph.device.lighting.brightness";
pub const CHROMA: &str = "periph.device.lighting.chroma";
pub const LOGO: &str = "periph.device.lighting.logo";
pub const SCROLL: &str = "periph.device.lighting.scroll";
pub const BACKLIGHT: &str = "periph.device.lighting.backlight";
pub const LEGACY: &str = "periph.device.lighting.legacy";
pub const LIGHTING_POWER: &str = "periph.device.lighting.power";
pub const GAME_MODE: &str = "periph.device.led.gamemode";
pub const MACRO_MODE: &str = "periph.device.led.macromode";
pub const POWER: &str = "periph.device.power";
pub const DPI: &str = "periph.device.dpi";
pub const MUG: &str = "periph.device.misc.mug";
pub const CUSTOM: &str = "periph.device.lighting.custom";

/// How a device is put to sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendStrategy {
    /// Save the brightness of each zone, then drive it to zero
    Brightness(&'static [Zone]),
    /// Device has no suspend support
    Unsupported,
}

/// On-wire format of the `dpi` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpiEncoding {
    /// Two big-endian u16 (X, Y)
    Word,
    /// Two bytes, each DPI scaled onto 0..=255 of the class maximum
    Scaled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpiSpec {
    pub max: u16,
    pub encoding: DpiEncoding,
}

/// Static description of a device family
#[derive(Debug)]
pub struct DeviceClass {
    pub name: &'static str,
    /// Reported by `getDeviceType`
    pub device_type: &'static str,
    /// LED matrix rows and columns, if the device has one
    pub matrix_dims: Option<(u8, u8)>,
    pub dedicated_macro_keys: bool,
    /// Valid wave directions; the first one is the fallback
    pub wave_directions: &'static [i64],
    pub dpi: Option<DpiSpec>,
    /// Driver reports the logo LED state inverted
    pub logo_active_inverted: bool,
    /// Logo and scroll zones take `<zone>_matrix_effect_*` attributes instead
    /// of an effect id plus colour
    pub zone_matrix_effects: bool,
    pub suspend: SuspendStrategy,
    /// Method groups exposed on the call surface
    pub methods: &'static [&'static [MethodId]],
}

impl DeviceClass {
    pub fn has_matrix(&self) -> bool {
        self.matrix_dims.is_some()
    }

    /// Every exposed method, in declaration order
    pub fn methods(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods.iter().flat_map(|group| group.iter().copied())
    }

    pub fn exposes(&self, interface: &str, method: &str) -> bool {
        self.methods().any(|(i, m)| i == interface && m == method)
    }
}

// === Method groups ===

const MISC_BASE: &[MethodId] = &[
    (MISC, "getDriverVersion"),
    (MISC, "getFirmware"),
    (MISC, "getDeviceName"),
    (MISC, "getDeviceType"),
    (MISC, "getSerial"),
    (MISC, "getDeviceMode"),
    (MISC, "setDeviceMode"),
    (MISC, "hasMatrix"),
    (MISC, "getMatrixDimensions"),
    (MISC, "hasDedicatedMacroKeys"),
    (MISC, "suspendDevice"),
    (MISC, "resumeDevice"),
];

const POLL_RATE: &[MethodId] = &[(MISC, "setPollRate"), (MISC, "getPollRate")];

const TRIGGER_REACTIVE: &[MethodId] = &[(MISC, "triggerReactive")];

const MATRIX_BRIGHTNESS: &[MethodId] = &[(BRIGHTNESS, "getBrightness"), (BRIGHTNESS, "setBrightness")];

const GAME_MODE_LED: &[MethodId] = &[(GAME_MODE, "getGameMode"), (GAME_MODE, "setGameMode")];

const MACRO_MODE_LED: &[MethodId] = &[
    (MACRO_MODE, "getMacroMode"),
    (MACRO_MODE, "setMacroMode"),
    (MACRO_MODE, "getMacroEffect"),
    (MACRO_MODE, "setMacroEffect"),
];

const CHROMA_BASIC: &[MethodId] = &[
    (CHROMA, "setNone"),
    (CHROMA, "setSpectrum"),
    (CHROMA, "setStatic"),
    (CHROMA, "setReactive"),
    (CHROMA, "setBreathRandom"),
    (CHROMA, "setBreathSingle"),
    (CHROMA, "setBreathDual"),
    (CHROMA, "setCustom"),
    (CHROMA, "setKeyRow"),
];

const CHROMA_EXTENDED: &[MethodId] = &[
    (CHROMA, "setBlinking"),
    (CHROMA, "setWave"),
    (CHROMA, "setBreathTriple"),
    (CHROMA, "setStarlightRandom"),
    (CHROMA, "setStarlightSingle"),
    (CHROMA, "setStarlightDual"),
];

const LEGACY_EFFECTS: &[MethodId] = &[
    (LEGACY, "getEffect"),
    (LEGACY, "setPulsate"),
    (LEGACY, "setStatic"),
];

const LOGO_ACTIVE: &[MethodId] = &[(LOGO, "getActive"), (LOGO, "setActive")];

const LOGO_EFFECTS: &[MethodId] = &[
    (LOGO, "getEffect"),
    (LOGO, "getBrightness"),
    (LOGO, "setBrightness"),
    (LOGO, "setStatic"),
    (LOGO, "setBlinking"),
    (LOGO, "setPulsate"),
    (LOGO, "setSpectrum"),
];

const SCROLL_FULL: &[MethodId] = &[
    (SCROLL, "getActive"),
    (SCROLL, "setActive"),
    (SCROLL, "getEffect"),
    (SCROLL, "getBrightness"),
    (SCROLL, "setBrightness"),
    (SCROLL, "setStatic"),
    (SCROLL, "setBlinking"),
    (SCROLL, "setPulsate"),
    (SCROLL, "setSpectrum"),
];

const LOGO_MATRIX: &[MethodId] = &[
    (LOGO, "getBrightness"),
    (LOGO, "setBrightness"),
    (LOGO, "setNone"),
    (LOGO, "setStatic"),
    (LOGO, "setSpectrum"),
    (LOGO, "setReactive"),
    (LOGO, "setBreathRandom"),
    (LOGO, "setBreathSingle"),
    (LOGO, "setBreathDual"),
];

const SCROLL_MATRIX: &[MethodId] = &[
    (SCROLL, "getBrightness"),
    (SCROLL, "setBrightness"),
    (SCROLL, "setNone"),
    (SCROLL, "setStatic"),
    (SCROLL, "setSpectrum"),
    (SCROLL, "setReactive"),
    (SCROLL, "setBreathRandom"),
    (SCROLL, "setBreathSingle"),
    (SCROLL, "setBreathDual"),
];

const BACKLIGHT_ACTIVE: &[MethodId] = &[(BACKLIGHT, "getActive"), (BACKLIGHT, "setActive")];

const BATTERY: &[MethodId] = &[
    (POWER, "getBattery"),
    (POWER, "isCharging"),
    (POWER, "setIdleTime"),
    (POWER, "setLowBatteryThreshold"),
    (LIGHTING_POWER, "setChargeEffect"),
    (LIGHTING_POWER, "setChargeColour"),
];

const DPI_METHODS: &[MethodId] = &[(DPI, "setDPI"), (DPI, "getDPI"), (DPI, "maxDPI")];

const MUG_METHODS: &[MethodId] = &[(MUG, "isMugPresent")];

const CUSTOM_EFFECTS: &[MethodId] = &[(CUSTOM, "setRipple"), (CUSTOM, "setRippleRandomColour")];

// === Classes ===

pub static CHROMA_KEYBOARD: DeviceClass = DeviceClass {
    name: "chroma_keyboard",
    device_type: "keyboard",
    matrix_dims: Some((6, 22)),
    dedicated_macro_keys: true,
    wave_directions: &[1, 2],
    dpi: None,
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Matrix]),
    methods: &[
        MISC_BASE,
        MATRIX_BRIGHTNESS,
        GAME_MODE_LED,
        MACRO_MODE_LED,
        CHROMA_BASIC,
        CHROMA_EXTENDED,
        CUSTOM_EFFECTS,
    ],
};

pub static LEGACY_KEYBOARD: DeviceClass = DeviceClass {
    name: "legacy_keyboard",
    device_type: "keyboard",
    matrix_dims: None,
    dedicated_macro_keys: true,
    wave_directions: &[1, 2],
    dpi: None,
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Matrix]),
    methods: &[
        MISC_BASE,
        MATRIX_BRIGHTNESS,
        GAME_MODE_LED,
        MACRO_MODE_LED,
        LEGACY_EFFECTS,
    ],
};

pub static MOUSE_MAT: DeviceClass = DeviceClass {
    name: "mouse_mat",
    device_type: "firefly",
    matrix_dims: Some((1, 15)),
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: None,
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Matrix]),
    methods: &[
        MISC_BASE,
        TRIGGER_REACTIVE,
        MATRIX_BRIGHTNESS,
        CHROMA_BASIC,
        &[(CHROMA, "setWave")],
    ],
};

pub static CHROMA_MOUSE: DeviceClass = DeviceClass {
    name: "chroma_mouse",
    device_type: "mouse",
    matrix_dims: None,
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: Some(DpiSpec {
        max: 10000,
        encoding: DpiEncoding::Word,
    }),
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Logo, Zone::Scroll]),
    methods: &[
        MISC_BASE,
        POLL_RATE,
        DPI_METHODS,
        LOGO_ACTIVE,
        LOGO_EFFECTS,
        SCROLL_FULL,
        BACKLIGHT_ACTIVE,
    ],
};

pub static WIRELESS_MOUSE: DeviceClass = DeviceClass {
    name: "wireless_mouse",
    device_type: "mouse",
    matrix_dims: Some((1, 15)),
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: Some(DpiSpec {
        max: 16000,
        encoding: DpiEncoding::Word,
    }),
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Matrix]),
    methods: &[
        MISC_BASE,
        POLL_RATE,
        DPI_METHODS,
        BATTERY,
        MATRIX_BRIGHTNESS,
        CHROMA_BASIC,
        &[(CHROMA, "setWave")],
    ],
};

pub static MMO_MOUSE: DeviceClass = DeviceClass {
    name: "mmo_mouse",
    device_type: "mouse",
    matrix_dims: None,
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: Some(DpiSpec {
        max: 6750,
        encoding: DpiEncoding::Scaled,
    }),
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Unsupported,
    methods: &[MISC_BASE, POLL_RATE, DPI_METHODS, LOGO_ACTIVE, SCROLL_FULL],
};

/// Mouse whose logo and scroll LEDs take matrix-style effects
pub static MATRIX_ZONE_MOUSE: DeviceClass = DeviceClass {
    name: "matrix_zone_mouse",
    device_type: "mouse",
    matrix_dims: None,
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: Some(DpiSpec {
        max: 16000,
        encoding: DpiEncoding::Word,
    }),
    logo_active_inverted: false,
    zone_matrix_effects: true,
    suspend: SuspendStrategy::Brightness(&[Zone::Logo, Zone::Scroll]),
    methods: &[MISC_BASE, POLL_RATE, DPI_METHODS, LOGO_MATRIX, SCROLL_MATRIX],
};

pub static MUG_HOLDER: DeviceClass = DeviceClass {
    name: "mug",
    device_type: "mug",
    matrix_dims: Some((1, 15)),
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: None,
    logo_active_inverted: false,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Matrix]),
    methods: &[
        MISC_BASE,
        MUG_METHODS,
        MATRIX_BRIGHTNESS,
        CHROMA_BASIC,
        CHROMA_EXTENDED,
    ],
};

pub static LAPTOP: DeviceClass = DeviceClass {
    name: "laptop",
    device_type: "keyboard",
    matrix_dims: Some((6, 25)),
    dedicated_macro_keys: false,
    wave_directions: &[1, 2],
    dpi: None,
    logo_active_inverted: true,
    zone_matrix_effects: false,
    suspend: SuspendStrategy::Brightness(&[Zone::Matrix]),
    methods: &[
        MISC_BASE,
        MATRIX_BRIGHTNESS,
        CHROMA_BASIC,
        CHROMA_EXTENDED,
        CUSTOM_EFFECTS,
        LOGO_ACTIVE,
    ],
};

/// All known classes
pub static CLASSES: &[&DeviceClass] = &[
    &CHROMA_KEYBOARD,
    &LEGACY_KEYBOARD,
    &MOUSE_MAT,
    &CHROMA_MOUSE,
    &WIRELESS_MOUSE,
    &MMO_MOUSE,
    &MATRIX_ZONE_MOUSE,
    &MUG_HOLDER,
    &LAPTOP,
];

/// Look up a class by name
pub fn find_class(name: &str) -> Option<&'static DeviceClass> {
    CLASSES.iter().copied().find(|c| c.name == name)
}
