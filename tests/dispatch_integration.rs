//! Call dispatch and cross-device coordination through the manager

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use periph_attr::{AttributeStore, MemoryIo, RetryPolicy};
use periph_device::class::{CHROMA, CHROMA_KEYBOARD, CHROMA_MOUSE, GAME_MODE, MISC, MMO_MOUSE};
use periph_device::{DeviceError, Event, Observer, ObserverError};
use periphd::{CallError, Config, ConfigError, DeviceManager, Value};

const KEYBOARD: &str = "/sys/bus/hid/devices/0003:1532:0203.0001";
const MOUSE: &str = "/sys/bus/hid/devices/0003:1532:0043.0002";
const MMO: &str = "/sys/bus/hid/devices/0003:1532:0053.0003";

fn attr(root: &str, name: &str) -> PathBuf {
    Path::new(root).join(name)
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 2,
        backoff: Duration::ZERO,
    }
}

/// Keyboard and Chroma mouse sharing one in-memory attribute tree
fn setup() -> (Arc<MemoryIo>, Arc<DeviceManager>, String, String) {
    let io = Arc::new(MemoryIo::new());
    io.insert(attr(KEYBOARD, "device_serial"), "KB0000000001\n");
    io.insert(attr(KEYBOARD, "matrix_brightness"), "255\n");
    io.insert(attr(MOUSE, "device_serial"), "MS0000000002\n");
    io.insert(attr(MOUSE, "logo_led_brightness"), "128\n");
    io.insert(attr(MOUSE, "scroll_led_brightness"), "64\n");

    let manager = DeviceManager::new(fast_retry(), false);
    let kb = manager
        .add_device(&CHROMA_KEYBOARD, AttributeStore::with_io(KEYBOARD, io.clone()), Vec::new())
        .unwrap();
    let mouse = manager
        .add_device(&CHROMA_MOUSE, AttributeStore::with_io(MOUSE, io.clone()), Vec::new())
        .unwrap();
    (io, manager, kb, mouse)
}

fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<dyn Observer>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let observer = Arc::new(move |e: &Event| -> Result<(), ObserverError> {
        sink.lock().push(e.to_string());
        Ok(())
    });
    (log, observer)
}

fn rgb(r: i64, g: i64, b: i64) -> Vec<Value> {
    vec![Value::Int(r), Value::Int(g), Value::Int(b)]
}

#[test]
fn call_dispatches_to_device() {
    let (io, manager, kb, _mouse) = setup();

    let reply = manager.call(&kb, MISC, "getSerial", &[]).unwrap();
    assert_eq!(reply, Value::from("KB0000000001"));

    let reply = manager.call(&kb, CHROMA, "setStatic", &rgb(255, 0, 16)).unwrap();
    assert_eq!(reply, Value::Unit);
    assert_eq!(io.contents(&attr(KEYBOARD, "matrix_effect_static")), Some(vec![255, 0, 16]));

    let reply = manager.call(&kb, "periph.device.lighting.brightness", "getBrightness", &[]);
    assert_eq!(reply.unwrap(), Value::Float(100.0));
}

#[test]
fn unknown_device_and_method() {
    let (_io, manager, _kb, mouse) = setup();

    assert!(matches!(
        manager.call("nope", MISC, "getSerial", &[]),
        Err(CallError::UnknownDevice(s)) if s == "nope"
    ));
    // Keyboard-only method on a mouse
    assert!(matches!(
        manager.call(&mouse, GAME_MODE, "setGameMode", &[Value::Bool(true)]),
        Err(CallError::UnknownMethod { .. })
    ));
    assert!(manager.methods(&mouse).unwrap().contains(&(MISC, "getSerial")));
}

#[test]
fn effect_sync_relays_to_siblings() {
    let (_io, manager, kb, mouse) = setup();
    let (kb_log, kb_obs) = recorder();
    let (mouse_log, mouse_obs) = recorder();
    manager.register_observer(&kb, kb_obs).unwrap();
    manager.register_observer(&mouse, mouse_obs).unwrap();

    manager.call(&kb, CHROMA, "setSpectrum", &[]).unwrap();
    assert_eq!(kb_log.lock().len(), 1);
    assert!(mouse_log.lock().is_empty());

    manager.set_effect_sync(true);
    manager.call(&kb, CHROMA, "setStatic", &rgb(1, 2, 3)).unwrap();

    let expected = "(\"effect\", chroma_keyboard:KB0000000001, \"setStatic\", 1, 2, 3)";
    assert_eq!(kb_log.lock().last().map(String::as_str), Some(expected));
    // Sibling sees the event with the keyboard as origin
    assert_eq!(mouse_log.lock().as_slice(), [expected.to_string()]);
    assert!(manager.list().iter().all(|d| d.effect_sync));
}

#[test]
fn suspend_and_resume_all() {
    let (io, manager, kb, _mouse) = setup();
    io.insert(attr(MMO, "device_serial"), "MM0000000003\n");
    manager
        .add_device(&MMO_MOUSE, AttributeStore::with_io(MMO, io.clone()), Vec::new())
        .unwrap();
    let (log, obs) = recorder();
    manager.register_observer_all(obs);
    manager.set_effect_sync(true);

    // MMO mouse has no suspend support and is skipped
    assert!(manager.suspend_all().is_empty());
    assert_eq!(io.text(&attr(KEYBOARD, "matrix_brightness")).as_deref(), Some("0"));
    assert_eq!(io.text(&attr(MOUSE, "logo_led_brightness")).as_deref(), Some("0"));
    assert_eq!(io.text(&attr(MOUSE, "scroll_led_brightness")).as_deref(), Some("0"));
    assert!(manager
        .list()
        .iter()
        .any(|d| d.serial == kb && d.state == "suspended"));

    assert!(manager.resume_all().is_empty());
    assert_eq!(io.text(&attr(KEYBOARD, "matrix_brightness")).as_deref(), Some("255"));
    assert_eq!(io.text(&attr(MOUSE, "logo_led_brightness")).as_deref(), Some("128"));
    assert_eq!(io.text(&attr(MOUSE, "scroll_led_brightness")).as_deref(), Some("64"));

    // Neither transition notifies anyone
    assert!(log.lock().is_empty());
}

#[test]
fn suspend_failure_is_reported() {
    let (io, manager, kb, _mouse) = setup();
    io.deny(attr(KEYBOARD, "matrix_brightness"));

    let failures = manager.suspend_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, kb);
    assert!(matches!(failures[0].1, DeviceError::Attr(_)));
}

#[test]
fn close_all_is_idempotent() {
    let (_io, manager, kb, _mouse) = setup();
    manager.close_all();
    manager.close_all();

    assert!(manager.list().iter().all(|d| d.state == "closed"));
    assert!(matches!(
        manager.call(&kb, CHROMA, "setNone", &[]),
        Err(CallError::Device(DeviceError::Closed(_)))
    ));
    // Identity survives close
    assert_eq!(
        manager.call(&kb, MISC, "getSerial", &[]).unwrap(),
        Value::from("KB0000000001")
    );
}

#[test]
fn duplicate_serial_rejected() {
    let (io, manager, _kb, _mouse) = setup();
    let err = manager
        .add_device(&CHROMA_KEYBOARD, AttributeStore::with_io(KEYBOARD, io), Vec::new())
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateSerial(s) if s == "KB0000000001"));
    assert_eq!(manager.len(), 2);
}

#[test]
fn attach_from_config_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("0003:1532:0203.0001");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("device_serial"), "XX0123456789\n").unwrap();
    std::fs::write(root.join("version"), "3.0.1\n").unwrap();

    let config = Config::parse(&format!(
        r#"
[serial_retry]
attempts = 1
backoff_ms = 0

[[devices]]
path = "{}"
class = "chroma_keyboard"

[[devices]]
path = "{}"
class = "chroma_mouse"
"#,
        root.display(),
        dir.path().join("missing").display()
    ))
    .unwrap();

    let manager = DeviceManager::from_config(&config).unwrap();
    assert_eq!(manager.len(), 1);
    assert_eq!(
        manager.call("XX0123456789", MISC, "getDriverVersion", &[]).unwrap(),
        Value::from("3.0.1")
    );

    manager
        .call("XX0123456789", GAME_MODE, "setGameMode", &[Value::Bool(true)])
        .unwrap();
    assert_eq!(std::fs::read_to_string(root.join("game_led_state")).unwrap(), "1");
}

#[test]
fn duplicate_serial_in_config_skips_only_that_device() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = String::from("[serial_retry]\nattempts = 1\nbackoff_ms = 0\n");
    for (name, serial) in [("first", "SAME"), ("second", "SAME"), ("third", "OTHER")] {
        let root = dir.path().join(name);
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("device_serial"), format!("{serial}\n")).unwrap();
        entries.push_str(&format!(
            "\n[[devices]]\npath = \"{}\"\nclass = \"chroma_keyboard\"\n",
            root.display()
        ));
    }

    let manager = DeviceManager::from_config(&Config::parse(&entries).unwrap()).unwrap();
    let serials: Vec<String> = manager.list().into_iter().map(|d| d.serial).collect();
    assert_eq!(serials, ["SAME", "OTHER"]);

    // The first device claimed the serial
    manager.call("SAME", CHROMA, "setNone", &[]).unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("first/matrix_effect_none")).unwrap(),
        "1"
    );
    assert!(!dir.path().join("second/matrix_effect_none").exists());
}
