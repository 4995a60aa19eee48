//! Built-in call handlers
//!
//! Each handler checks its argument list, calls the matching device
//! endpoint and converts the result into a reply [`Value`].

use periph_device::class::{
    BACKLIGHT, BRIGHTNESS, CHROMA, CUSTOM, DPI, GAME_MODE, LEGACY, LIGHTING_POWER, LOGO, MACRO_MODE,
    MISC, MUG, POWER, SCROLL,
};
use periph_device::Zone;

use crate::registry::HandlerRegistryBuilder;
use crate::value::Value;

/// Register every built-in endpoint
pub(crate) fn install(builder: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    let builder = misc(builder);
    let builder = brightness(builder);
    let builder = led_modes(builder);
    let builder = chroma(builder);
    let builder = custom(builder);
    let builder = legacy(builder);
    let builder = zone(builder, LOGO, Zone::Logo);
    let builder = zone(builder, SCROLL, Zone::Scroll);
    let builder = zone_active(builder, BACKLIGHT, Zone::Backlight);
    let builder = power(builder);
    dpi(builder)
}

fn unit(_: ()) -> Value {
    Value::Unit
}

// === Misc ===

fn misc(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(MISC, "getDriverVersion", |dev, args| {
        args.expect(0)?;
        Ok(dev.driver_version()?.into())
    })
    .method(MISC, "getFirmware", |dev, args| {
        args.expect(0)?;
        Ok(dev.firmware()?.into())
    })
    .method(MISC, "getDeviceName", |dev, args| {
        args.expect(0)?;
        Ok(dev.device_name()?.into())
    })
    .method(MISC, "getDeviceType", |dev, args| {
        args.expect(0)?;
        Ok(dev.device_type().into())
    })
    .method(MISC, "getSerial", |dev, args| {
        args.expect(0)?;
        Ok(dev.serial().into())
    })
    .method(MISC, "getDeviceMode", |dev, args| {
        args.expect(0)?;
        Ok(dev.device_mode()?.into())
    })
    .method(MISC, "setDeviceMode", |dev, args| {
        let args = args.expect(2)?;
        Ok(unit(dev.set_device_mode(args.byte(0)?, args.byte(1)?)?))
    })
    .method(MISC, "hasMatrix", |dev, args| {
        args.expect(0)?;
        Ok(dev.has_matrix().into())
    })
    .method(MISC, "getMatrixDimensions", |dev, args| {
        args.expect(0)?;
        Ok(dev.matrix_dimensions().into())
    })
    .method(MISC, "hasDedicatedMacroKeys", |dev, args| {
        args.expect(0)?;
        Ok(dev.has_dedicated_macro_keys().into())
    })
    .method(MISC, "suspendDevice", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.suspend()?))
    })
    .method(MISC, "resumeDevice", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.resume()?))
    })
    .method(MISC, "setPollRate", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_poll_rate(args.u16(0)?)?))
    })
    .method(MISC, "getPollRate", |dev, args| {
        args.expect(0)?;
        Ok(dev.poll_rate()?.into())
    })
    .method(MISC, "triggerReactive", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.trigger_reactive()?))
    })
    .method(MUG, "isMugPresent", |dev, args| {
        args.expect(0)?;
        Ok(dev.is_mug_present()?.into())
    })
}

// === Matrix brightness ===

fn brightness(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(BRIGHTNESS, "getBrightness", |dev, args| {
        args.expect(0)?;
        Ok(dev.brightness()?.into())
    })
    .method(BRIGHTNESS, "setBrightness", |dev, args| {
        let args = args.expect(1)?;
        dev.set_brightness(args.float(0)?)?;
        Ok(Value::Unit)
    })
}

// === Game / macro mode LEDs ===

fn led_modes(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(GAME_MODE, "getGameMode", |dev, args| {
        args.expect(0)?;
        Ok(dev.game_mode()?.into())
    })
    .method(GAME_MODE, "setGameMode", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_game_mode(args.bool(0)?)?))
    })
    .method(MACRO_MODE, "getMacroMode", |dev, args| {
        args.expect(0)?;
        Ok(dev.macro_mode()?.into())
    })
    .method(MACRO_MODE, "setMacroMode", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_macro_mode(args.bool(0)?)?))
    })
    .method(MACRO_MODE, "getMacroEffect", |dev, args| {
        args.expect(0)?;
        Ok(dev.macro_effect()?.into())
    })
    .method(MACRO_MODE, "setMacroEffect", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_macro_effect(args.byte(0)?)?))
    })
}

// === Matrix effects ===

fn chroma(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(CHROMA, "setNone", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.set_none()?))
    })
    .method(CHROMA, "setSpectrum", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.set_spectrum()?))
    })
    .method(CHROMA, "setStatic", |dev, args| {
        let args = args.expect(3)?;
        Ok(unit(dev.set_static(args.colour(0)?)?))
    })
    .method(CHROMA, "setBlinking", |dev, args| {
        let args = args.expect(3)?;
        Ok(unit(dev.set_blinking(args.colour(0)?)?))
    })
    .method(CHROMA, "setWave", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_wave(args.int(0)?)?))
    })
    .method(CHROMA, "setReactive", |dev, args| {
        let args = args.expect(4)?;
        Ok(unit(dev.set_reactive(args.colour(0)?, args.byte(3)?)?))
    })
    .method(CHROMA, "setBreathRandom", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.set_breath_random()?))
    })
    .method(CHROMA, "setBreathSingle", |dev, args| {
        let args = args.expect(3)?;
        Ok(unit(dev.set_breath_single(args.colour(0)?)?))
    })
    .method(CHROMA, "setBreathDual", |dev, args| {
        let args = args.expect(6)?;
        Ok(unit(dev.set_breath_dual(args.colour(0)?, args.colour(3)?)?))
    })
    .method(CHROMA, "setBreathTriple", |dev, args| {
        let args = args.expect(9)?;
        Ok(unit(dev.set_breath_triple(
            args.colour(0)?,
            args.colour(3)?,
            args.colour(6)?,
        )?))
    })
    .method(CHROMA, "setStarlightRandom", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_starlight_random(args.byte(0)?)?))
    })
    .method(CHROMA, "setStarlightSingle", |dev, args| {
        let args = args.expect(4)?;
        Ok(unit(dev.set_starlight_single(args.byte(0)?, args.colour(1)?)?))
    })
    .method(CHROMA, "setStarlightDual", |dev, args| {
        let args = args.expect(7)?;
        Ok(unit(dev.set_starlight_dual(
            args.byte(0)?,
            args.colour(1)?,
            args.colour(4)?,
        )?))
    })
    .method(CHROMA, "setCustom", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.set_custom()?))
    })
    .method(CHROMA, "setKeyRow", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_key_row(&args.bytes(0)?)?))
    })
}

fn custom(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(CUSTOM, "setRipple", |dev, args| {
        let args = args.expect(4)?;
        Ok(unit(dev.set_ripple(args.colour(0)?, args.float(3)?)?))
    })
    .method(CUSTOM, "setRippleRandomColour", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_ripple_random_colour(args.float(0)?)?))
    })
}

fn legacy(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(LEGACY, "getEffect", |dev, args| {
        args.expect(0)?;
        Ok(dev.legacy_effect()?.into())
    })
    .method(LEGACY, "setPulsate", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.set_legacy_pulsate()?))
    })
    .method(LEGACY, "setStatic", |dev, args| {
        args.expect(0)?;
        Ok(unit(dev.set_legacy_static()?))
    })
}

// === Single-LED zones ===

fn zone_active(
    b: HandlerRegistryBuilder,
    interface: &'static str,
    zone: Zone,
) -> HandlerRegistryBuilder {
    b.method(interface, "getActive", move |dev, args| {
        args.expect(0)?;
        Ok(dev.zone_active(zone)?.into())
    })
    .method(interface, "setActive", move |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_zone_active(zone, args.bool(0)?)?))
    })
}

fn zone(b: HandlerRegistryBuilder, interface: &'static str, zone: Zone) -> HandlerRegistryBuilder {
    zone_active(b, interface, zone)
        .method(interface, "getEffect", move |dev, args| {
            args.expect(0)?;
            Ok(dev.zone_effect(zone)?.into())
        })
        .method(interface, "getBrightness", move |dev, args| {
            args.expect(0)?;
            Ok(dev.zone_brightness(zone)?.into())
        })
        .method(interface, "setBrightness", move |dev, args| {
            let args = args.expect(1)?;
            dev.set_zone_brightness(zone, args.float(0)?)?;
            Ok(Value::Unit)
        })
        .method(interface, "setStatic", move |dev, args| {
            let args = args.expect(3)?;
            Ok(unit(dev.set_zone_static(zone, args.colour(0)?)?))
        })
        .method(interface, "setBlinking", move |dev, args| {
            let args = args.expect(3)?;
            Ok(unit(dev.set_zone_blinking(zone, args.colour(0)?)?))
        })
        .method(interface, "setPulsate", move |dev, args| {
            let args = args.expect(3)?;
            Ok(unit(dev.set_zone_pulsate(zone, args.colour(0)?)?))
        })
        .method(interface, "setSpectrum", move |dev, args| {
            args.expect(0)?;
            Ok(unit(dev.set_zone_spectrum(zone)?))
        })
        .method(interface, "setNone", move |dev, args| {
            args.expect(0)?;
            Ok(unit(dev.set_zone_none(zone)?))
        })
        .method(interface, "setReactive", move |dev, args| {
            let args = args.expect(4)?;
            Ok(unit(dev.set_zone_reactive(zone, args.colour(0)?, args.byte(3)?)?))
        })
        .method(interface, "setBreathRandom", move |dev, args| {
            args.expect(0)?;
            Ok(unit(dev.set_zone_breath_random(zone)?))
        })
        .method(interface, "setBreathSingle", move |dev, args| {
            let args = args.expect(3)?;
            Ok(unit(dev.set_zone_breath_single(zone, args.colour(0)?)?))
        })
        .method(interface, "setBreathDual", move |dev, args| {
            let args = args.expect(6)?;
            Ok(unit(dev.set_zone_breath_dual(zone, args.colour(0)?, args.colour(3)?)?))
        })
}

// === Power ===

fn power(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(POWER, "getBattery", |dev, args| {
        args.expect(0)?;
        Ok(dev.battery()?.into())
    })
    .method(POWER, "isCharging", |dev, args| {
        args.expect(0)?;
        Ok(dev.is_charging()?.into())
    })
    .method(POWER, "setIdleTime", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_idle_time(args.u16(0)?)?))
    })
    .method(POWER, "setLowBatteryThreshold", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_low_battery_threshold(args.byte(0)?)?))
    })
    .method(LIGHTING_POWER, "setChargeEffect", |dev, args| {
        let args = args.expect(1)?;
        Ok(unit(dev.set_charge_effect(args.byte(0)?)?))
    })
    .method(LIGHTING_POWER, "setChargeColour", |dev, args| {
        let args = args.expect(3)?;
        Ok(unit(dev.set_charge_colour(args.colour(0)?)?))
    })
}

// === DPI ===

fn dpi(b: HandlerRegistryBuilder) -> HandlerRegistryBuilder {
    b.method(DPI, "setDPI", |dev, args| {
        let args = args.expect(2)?;
        Ok(unit(dev.set_dpi(args.u16(0)?, args.u16(1)?)?))
    })
    .method(DPI, "getDPI", |dev, args| {
        args.expect(0)?;
        Ok(dev.dpi()?.into())
    })
    .method(DPI, "maxDPI", |dev, args| {
        args.expect(0)?;
        Ok(i64::from(dev.max_dpi()).into())
    })
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use periph_attr::{AttributeStore, MemoryIo, RetryPolicy};
    use periph_device::class::{CHROMA_KEYBOARD, CHROMA_MOUSE, MATRIX_ZONE_MOUSE};
    use periph_device::{Device, DeviceClass};

    use super::*;
    use crate::error::CallError;
    use crate::registry::handler_registry;
    use crate::value::Args;

    const ROOT: &str = "/sys/bus/hid/devices/0003:1532:0203.0001";

    fn attr(name: &str) -> PathBuf {
        Path::new(ROOT).join(name)
    }

    fn device(class: &'static DeviceClass) -> (Arc<MemoryIo>, Device) {
        let io = Arc::new(MemoryIo::new());
        io.insert(attr("device_serial"), "XX0123456789\n");
        let store = AttributeStore::with_io(ROOT, io.clone());
        let retry = RetryPolicy {
            attempts: 1,
            backoff: Duration::ZERO,
        };
        (io, Device::open(0, class, store, &retry))
    }

    fn call(
        dev: &mut Device,
        interface: &'static str,
        method: &'static str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let handler = handler_registry()
            .get(interface, method)
            .ok_or_else(|| CallError::UnknownMethod {
                interface: interface.to_string(),
                method: method.to_string(),
            })?;
        handler(dev, Args::new(args))
    }

    #[test]
    fn test_identity_calls() {
        let (_io, mut dev) = device(&CHROMA_KEYBOARD);
        assert_eq!(
            call(&mut dev, MISC, "getSerial", &[]).unwrap(),
            Value::from("XX0123456789")
        );
        assert_eq!(
            call(&mut dev, MISC, "getMatrixDimensions", &[]).unwrap(),
            Value::List(vec![6, 22])
        );
        // No version file: fallback
        assert_eq!(
            call(&mut dev, MISC, "getDriverVersion", &[]).unwrap(),
            Value::from("0.0.0")
        );
    }

    #[test]
    fn test_colour_arguments() {
        let (io, mut dev) = device(&CHROMA_KEYBOARD);
        let rgb = [Value::Int(255), Value::Int(0), Value::Int(16)];
        assert_eq!(call(&mut dev, CHROMA, "setStatic", &rgb).unwrap(), Value::Unit);
        assert_eq!(io.contents(&attr("matrix_effect_static")), Some(vec![255, 0, 16]));
    }

    #[test]
    fn test_argument_errors() {
        let (_io, mut dev) = device(&CHROMA_KEYBOARD);
        assert!(matches!(
            call(&mut dev, CHROMA, "setStatic", &[Value::Int(1)]),
            Err(CallError::InvalidArgs(_))
        ));
        assert!(matches!(
            call(&mut dev, GAME_MODE, "setGameMode", &[Value::Text("yes".into())]),
            Err(CallError::InvalidArgs(_))
        ));
        assert!(matches!(
            call(&mut dev, MISC, "getSerial", &[Value::Unit]),
            Err(CallError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_zone_handlers_target_their_zone() {
        let (io, mut dev) = device(&CHROMA_MOUSE);
        call(&mut dev, SCROLL, "setBrightness", &[Value::Int(20)]).unwrap();
        call(&mut dev, LOGO, "setActive", &[Value::Bool(true)]).unwrap();
        assert_eq!(io.text(&attr("scroll_led_brightness")).as_deref(), Some("51"));
        assert_eq!(io.text(&attr("logo_led_state")).as_deref(), Some("1"));
    }

    #[test]
    fn test_matrix_zone_handlers() {
        let (io, mut dev) = device(&MATRIX_ZONE_MOUSE);
        let args = [Value::Int(0), Value::Int(128), Value::Int(128), Value::Int(2)];
        call(&mut dev, SCROLL, "setReactive", &args).unwrap();
        call(&mut dev, LOGO, "setStatic", &args[..3]).unwrap();
        assert_eq!(io.contents(&attr("scroll_matrix_effect_reactive")), Some(vec![2, 0, 128, 128]));
        assert_eq!(io.contents(&attr("logo_matrix_effect_static")), Some(vec![0, 128, 128]));
    }

    #[test]
    fn test_ripple_takes_a_float_refresh_rate() {
        let (_io, mut dev) = device(&CHROMA_KEYBOARD);
        let reply = call(&mut dev, CUSTOM, "setRippleRandomColour", &[Value::Float(0.05)]);
        assert_eq!(reply.unwrap(), Value::Unit);
        assert!(matches!(
            call(&mut dev, CUSTOM, "setRipple", &[Value::Float(0.05)]),
            Err(CallError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_device_errors_pass_through() {
        let (_io, mut dev) = device(&CHROMA_KEYBOARD);
        dev.close();
        assert!(matches!(
            call(&mut dev, CHROMA, "setNone", &[]),
            Err(CallError::Device(_))
        ));
    }
}
