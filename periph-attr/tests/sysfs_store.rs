//! Attribute store against a real directory tree.
//!
//! Mirrors the layout a HID driver exposes under
//! `/sys/bus/hid/devices/<id>/` with plain files in a temp dir.

use std::fs;
use std::time::Duration;

use periph_attr::{AttrError, AttributeStore, CachePolicy, RetryPolicy};

fn device_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("device_serial"), "XX0000000001\n").unwrap();
    fs::write(dir.path().join("device_type"), "Chroma Keyboard\n").unwrap();
    fs::write(dir.path().join("matrix_brightness"), "255\n").unwrap();
    fs::write(dir.path().join("game_led_state"), "0\n").unwrap();
    dir
}

#[test]
fn reads_typed_attributes() {
    let dir = device_dir();
    let mut store = AttributeStore::sysfs(dir.path());

    assert_eq!(store.read_text("device_type", CachePolicy::Bypass).unwrap(), "Chroma Keyboard");
    assert_eq!(
        store.read_percent("matrix_brightness", Some(255), CachePolicy::Bypass).unwrap(),
        100.0
    );
    assert!(!store.read_flag("game_led_state", CachePolicy::Bypass).unwrap());
}

#[test]
fn writes_land_on_disk() {
    let dir = device_dir();
    let mut store = AttributeStore::sysfs(dir.path());

    store.write_flag("game_led_state", true, CachePolicy::Use).unwrap();
    store
        .write_percent("matrix_brightness", 50.0, Some(255), CachePolicy::Bypass)
        .unwrap();
    store.write_bytes("matrix_effect_static", &[255, 0, 16], CachePolicy::Bypass).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("game_led_state")).unwrap(), "1");
    assert_eq!(fs::read_to_string(dir.path().join("matrix_brightness")).unwrap(), "128");
    assert_eq!(fs::read(dir.path().join("matrix_effect_static")).unwrap(), vec![255, 0, 16]);
}

#[test]
fn cached_value_survives_external_change() {
    let dir = device_dir();
    let mut store = AttributeStore::sysfs(dir.path());

    store.write_flag("game_led_state", true, CachePolicy::Use).unwrap();
    fs::write(dir.path().join("game_led_state"), "0").unwrap();

    assert!(store.read_flag("game_led_state", CachePolicy::Use).unwrap());
    assert!(!store.read_flag("game_led_state", CachePolicy::Bypass).unwrap());
}

#[test]
fn missing_attribute_reports_path() {
    let dir = device_dir();
    let mut store = AttributeStore::sysfs(dir.path());

    let err = store.read_text("version", CachePolicy::Use).unwrap_err();
    assert!(err.is_not_found());
    match err {
        AttrError::Io { path, .. } => assert_eq!(path, dir.path().join("version")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn resolves_serial_from_disk() {
    let dir = device_dir();
    let store = AttributeStore::sysfs(dir.path());
    let policy = RetryPolicy {
        attempts: 5,
        backoff: Duration::ZERO,
    };
    assert_eq!(store.resolve_serial(&policy), "XX0000000001");
}
