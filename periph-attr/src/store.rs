//! Per-device attribute store
//!
//! Maps attribute names to files under the device root, runs every access
//! through the codec and keeps an optional per-name cache of decoded values.
//!
//! Cache rules:
//! - a cache-enabled read returns the cached value without I/O when present,
//!   otherwise reads the file and records the decoded value
//! - writes always hit the file; a cache-enabled write records the written
//!   value (after clamping), not a re-read
//! - entries are independent per name and never invalidated by other writes
//! - an entry remembers the kind it was stored with; asking for the same name
//!   with a different kind (or percent scale) is a caller error

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::codec;
use crate::error::{AttrError, Result};
use crate::io::{AttributeIo, SysfsIo};
use crate::types::{AttrKind, AttrValue, CachePolicy};

/// Attribute holding the device serial number
pub const SERIAL_ATTRIBUTE: &str = "device_serial";

/// Placeholder some firmwares report instead of a serial
pub const SERIAL_SENTINEL: &str = "Default string";

/// Prefix of synthesized serials
const UNKNOWN_SERIAL_PREFIX: &str = "UNKWN";

/// Bounded retry for reads racing the driver at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    kind: AttrKind,
    value: AttrValue,
}

/// Attribute files of one device
pub struct AttributeStore {
    root: PathBuf,
    io: Arc<dyn AttributeIo>,
    cache: HashMap<String, CacheEntry>,
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("root", &self.root)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl AttributeStore {
    /// Store backed by the real filesystem
    pub fn sysfs(root: impl Into<PathBuf>) -> Self {
        Self::with_io(root, Arc::new(SysfsIo))
    }

    pub fn with_io(root: impl Into<PathBuf>, io: Arc<dyn AttributeIo>) -> Self {
        Self {
            root: root.into(),
            io,
            cache: HashMap::new(),
        }
    }

    /// Device root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file behind attribute `name`
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Cached value for `name`, if any
    pub fn cached(&self, name: &str) -> Option<&AttrValue> {
        self.cache.get(name).map(|e| &e.value)
    }

    // === Generic access ===

    /// Read and decode attribute `name` as `kind`
    pub fn read(&mut self, name: &str, kind: AttrKind, cache: CachePolicy) -> Result<AttrValue> {
        if cache.enabled() {
            if let Some(entry) = self.cache.get(name) {
                if !entry.kind.same_meaning(&kind) {
                    return Err(AttrError::Mismatch {
                        name: name.to_string(),
                        expected: kind.to_string(),
                        found: format!("cache entry of {}", entry.kind),
                    });
                }
                debug!(attribute = name, "cache hit");
                return Ok(entry.value.clone());
            }
        }

        let raw = self.read_raw(name)?;
        let value = decode(name, kind, &raw)?;

        if cache.enabled() {
            self.cache.insert(
                name.to_string(),
                CacheEntry {
                    kind,
                    value: value.clone(),
                },
            );
        }
        Ok(value)
    }

    /// Encode and write `value` to attribute `name`.
    ///
    /// Returns the value as written (percent values clamped to 0-100).
    pub fn write(
        &mut self,
        name: &str,
        kind: AttrKind,
        value: AttrValue,
        cache: CachePolicy,
    ) -> Result<AttrValue> {
        if !value.fits(&kind) {
            return Err(AttrError::Mismatch {
                name: name.to_string(),
                expected: kind.to_string(),
                found: value.kind_name().to_string(),
            });
        }

        let (value, data) = encode(name, kind, value);
        self.write_raw(name, &data)?;

        if cache.enabled() {
            self.cache.insert(
                name.to_string(),
                CacheEntry {
                    kind,
                    value: value.clone(),
                },
            );
        }
        Ok(value)
    }

    // === Typed helpers ===

    pub fn read_flag(&mut self, name: &str, cache: CachePolicy) -> Result<bool> {
        let value = self.read(name, AttrKind::Flag, cache)?;
        Ok(value.as_flag().unwrap_or_default())
    }

    pub fn read_int(&mut self, name: &str, base: u32, cache: CachePolicy) -> Result<i64> {
        let value = self.read(name, AttrKind::Integer { base }, cache)?;
        Ok(value.as_int().unwrap_or_default())
    }

    pub fn read_percent(&mut self, name: &str, max: Option<u32>, cache: CachePolicy) -> Result<f64> {
        let value = self.read(name, AttrKind::Percent { max }, cache)?;
        Ok(value.as_percent().unwrap_or_default())
    }

    pub fn read_bytes(&mut self, name: &str, cache: CachePolicy) -> Result<Vec<u8>> {
        let value = self.read(name, AttrKind::Bytes, cache)?;
        Ok(value.into_bytes().unwrap_or_default())
    }

    pub fn read_text(&mut self, name: &str, cache: CachePolicy) -> Result<String> {
        let value = self.read(name, AttrKind::Text, cache)?;
        Ok(value.into_text().unwrap_or_default())
    }

    pub fn write_flag(&mut self, name: &str, value: bool, cache: CachePolicy) -> Result<bool> {
        self.write(name, AttrKind::Flag, AttrValue::Flag(value), cache)?;
        Ok(value)
    }

    pub fn write_int(&mut self, name: &str, value: i64, cache: CachePolicy) -> Result<i64> {
        self.write(name, AttrKind::INT, AttrValue::Integer(value), cache)?;
        Ok(value)
    }

    pub fn write_percent(
        &mut self,
        name: &str,
        value: f64,
        max: Option<u32>,
        cache: CachePolicy,
    ) -> Result<f64> {
        let written = self.write(name, AttrKind::Percent { max }, AttrValue::Percent(value), cache)?;
        Ok(written.as_percent().unwrap_or(value))
    }

    pub fn write_bytes(&mut self, name: &str, value: &[u8], cache: CachePolicy) -> Result<()> {
        self.write(name, AttrKind::Bytes, AttrValue::Bytes(value.to_vec()), cache)?;
        Ok(())
    }

    pub fn write_text(&mut self, name: &str, value: &str, cache: CachePolicy) -> Result<()> {
        self.write(name, AttrKind::Text, AttrValue::Text(value.to_string()), cache)?;
        Ok(())
    }

    // === Serial ===

    /// Resolve the device serial.
    ///
    /// Retries empty or failed reads of [`SERIAL_ATTRIBUTE`] per `policy`,
    /// sleeping between attempts. If nothing usable turns up, a placeholder
    /// `UNKWN` + 12 digits is synthesized so a serial always exists.
    pub fn resolve_serial(&self, policy: &RetryPolicy) -> String {
        let mut serial = String::new();

        for attempt in 1..=policy.attempts {
            match self.read_raw(SERIAL_ATTRIBUTE) {
                Ok(raw) => serial = codec::decode_text(&raw),
                Err(e) => {
                    warn!(error = %e, attempt, "reading serial failed");
                    serial.clear();
                }
            }

            if !serial.is_empty() {
                break;
            }
            debug!(attempt, "serial not available yet");
            if attempt < policy.attempts {
                thread::sleep(policy.backoff);
            }
        }

        if serial.is_empty() || serial == SERIAL_SENTINEL {
            let placeholder = unknown_serial();
            warn!(root = %self.root.display(), serial = %placeholder, "no usable serial, using placeholder");
            return placeholder;
        }
        serial
    }

    fn read_raw(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name);
        self.io
            .read(&path)
            .map_err(|source| AttrError::Io { path, source })
    }

    fn write_raw(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.path(name);
        self.io
            .write(&path, data)
            .map_err(|source| AttrError::Io { path, source })
    }
}

/// Placeholder serial: `UNKWN` followed by 12 random digits
pub fn unknown_serial() -> String {
    let suffix: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000);
    format!("{UNKNOWN_SERIAL_PREFIX}{suffix:012}")
}

fn decode(name: &str, kind: AttrKind, raw: &[u8]) -> Result<AttrValue> {
    let parse_err = |source| AttrError::Parse {
        name: name.to_string(),
        source,
    };

    let value = match kind {
        AttrKind::Flag => {
            AttrValue::Flag(codec::decode_flag(name, &codec::decode_text(raw)).map_err(parse_err)?)
        }
        AttrKind::Integer { base } => {
            AttrValue::Integer(codec::decode_int(&codec::decode_text(raw), base).map_err(parse_err)?)
        }
        AttrKind::Percent { max } => AttrValue::Percent(
            codec::decode_percent(name, &codec::decode_text(raw), max).map_err(parse_err)?,
        ),
        AttrKind::Bytes => AttrValue::Bytes(raw.to_vec()),
        AttrKind::Text => AttrValue::Text(codec::decode_text(raw)),
    };
    Ok(value)
}

/// Caller guarantees `value.fits(&kind)`
fn encode(name: &str, kind: AttrKind, value: AttrValue) -> (AttrValue, Vec<u8>) {
    let data = match &value {
        AttrValue::Flag(v) => codec::encode_flag(*v).as_bytes().to_vec(),
        AttrValue::Integer(v) => codec::encode_int(*v).into_bytes(),
        AttrValue::Percent(v) => {
            let max = match kind {
                AttrKind::Percent { max } => max,
                _ => None,
            };
            let (clamped, text) = codec::encode_percent(name, *v, max);
            return (AttrValue::Percent(clamped), text.into_bytes());
        }
        AttrValue::Bytes(v) => codec::encode_bytes(v),
        AttrValue::Text(v) => codec::encode_text(v),
    };
    (value, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryIo;

    fn store() -> (Arc<MemoryIo>, AttributeStore) {
        let io = Arc::new(MemoryIo::new());
        let store = AttributeStore::with_io("/sys/dev0", io.clone());
        (io, store)
    }

    fn fast() -> RetryPolicy {
        RetryPolicy {
            attempts: 5,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_cached_read_after_cached_write_skips_io() {
        let (io, mut store) = store();
        let path = store.path("game_led_state");

        store.write_flag("game_led_state", true, CachePolicy::Use).unwrap();
        assert_eq!(io.text(&path).as_deref(), Some("1"));

        assert!(store.read_flag("game_led_state", CachePolicy::Use).unwrap());
        assert_eq!(io.read_count(&path), 0);
    }

    #[test]
    fn test_cached_read_populates_once() {
        let (io, mut store) = store();
        let path = store.path("firmware_version");
        io.insert(&path, "v1.0\n");

        assert_eq!(store.read_text("firmware_version", CachePolicy::Use).unwrap(), "v1.0");
        io.insert(&path, "v2.0\n");
        assert_eq!(store.read_text("firmware_version", CachePolicy::Use).unwrap(), "v1.0");
        assert_eq!(io.read_count(&path), 1);
    }

    #[test]
    fn test_uncached_read_always_hits_file() {
        let (io, mut store) = store();
        let path = store.path("macro_led_effect");
        io.insert(&path, "1");

        store.write_int("macro_led_effect", 0, CachePolicy::Use).unwrap();
        assert_eq!(store.read_int("macro_led_effect", 10, CachePolicy::Bypass).unwrap(), 0);
        assert_eq!(io.read_count(&path), 1);
    }

    #[test]
    fn test_bypass_write_leaves_cache_alone() {
        let (_io, mut store) = store();
        store.write_flag("macro_led_state", true, CachePolicy::Use).unwrap();
        store.write_flag("macro_led_state", false, CachePolicy::Bypass).unwrap();
        assert_eq!(store.cached("macro_led_state"), Some(&AttrValue::Flag(true)));
    }

    #[test]
    fn test_entries_are_independent() {
        let (_io, mut store) = store();
        store.write_flag("a", true, CachePolicy::Use).unwrap();
        store.write_flag("b", false, CachePolicy::Use).unwrap();
        assert_eq!(store.cached("a"), Some(&AttrValue::Flag(true)));
        assert_eq!(store.cached("b"), Some(&AttrValue::Flag(false)));
    }

    #[test]
    fn test_percent_write_caches_clamped_value() {
        let (io, mut store) = store();
        let written = store
            .write_percent("matrix_brightness", 140.0, Some(255), CachePolicy::Use)
            .unwrap();
        assert_eq!(written, 100.0);
        assert_eq!(io.text(&store.path("matrix_brightness")).as_deref(), Some("255"));
        assert_eq!(store.cached("matrix_brightness"), Some(&AttrValue::Percent(100.0)));
    }

    #[test]
    fn test_percent_scale_mismatch_is_an_error() {
        let (_io, mut store) = store();
        store
            .write_percent("matrix_brightness", 50.0, Some(255), CachePolicy::Use)
            .unwrap();
        let err = store
            .read_percent("matrix_brightness", Some(100), CachePolicy::Use)
            .unwrap_err();
        assert!(matches!(err, AttrError::Mismatch { .. }));
    }

    #[test]
    fn test_write_rejects_wrong_value_kind() {
        let (io, mut store) = store();
        let err = store
            .write("dpi", AttrKind::Bytes, AttrValue::Integer(800), CachePolicy::Bypass)
            .unwrap_err();
        assert!(matches!(err, AttrError::Mismatch { .. }));
        assert_eq!(io.write_count(&store.path("dpi")), 0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let (_io, mut store) = store();
        let err = store.read_text("version", CachePolicy::Use).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.cached("version").is_none());
    }

    #[test]
    fn test_parse_error_names_attribute() {
        let (io, mut store) = store();
        io.insert(store.path("poll_rate"), "fast");
        match store.read_int("poll_rate", 10, CachePolicy::Bypass).unwrap_err() {
            AttrError::Parse { name, source } => {
                assert_eq!(name, "poll_rate");
                assert_eq!(source.content, "fast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serial_read() {
        let (io, store) = store();
        io.insert(store.path(SERIAL_ATTRIBUTE), "PM1234567890\n");
        assert_eq!(store.resolve_serial(&fast()), "PM1234567890");
        assert_eq!(io.read_count(&store.path(SERIAL_ATTRIBUTE)), 1);
    }

    #[test]
    fn test_serial_falls_back_after_retries() {
        let (io, store) = store();
        io.insert(store.path(SERIAL_ATTRIBUTE), "\n");
        let serial = store.resolve_serial(&fast());

        assert_eq!(io.read_count(&store.path(SERIAL_ATTRIBUTE)), 5);
        assert!(serial.starts_with("UNKWN"));
        assert_eq!(serial.len(), 17);
        assert!(serial[5..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_serial_sentinel_is_replaced() {
        let (io, store) = store();
        io.insert(store.path(SERIAL_ATTRIBUTE), "Default string");
        assert!(store.resolve_serial(&fast()).starts_with("UNKWN"));
        assert_eq!(io.read_count(&store.path(SERIAL_ATTRIBUTE)), 1);
    }

    #[test]
    fn test_serial_missing_file() {
        let (io, store) = store();
        assert!(store.resolve_serial(&fast()).starts_with("UNKWN"));
        assert_eq!(io.read_count(&store.path(SERIAL_ATTRIBUTE)), 5);
    }
}
