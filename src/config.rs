//! Daemon configuration
//!
//! Loaded from `~/.config/periphd/config.toml` unless a path is given.
//! Every field has a default, so a missing file or an empty one is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use periph_attr::RetryPolicy;
use periph_device::{find_class, DeviceClass};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Well-known bus name and object path of the daemon
pub const DEFAULT_BUS_NAME: &str = "org.periph.Daemon1";
pub const OBJECT_PATH: &str = "/org/periph/Daemon1";

/// Which message bus to serve on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    Session,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbusConfig {
    pub bus: BusKind,
    pub name: String,
}

impl Default for DbusConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::Session,
            name: DEFAULT_BUS_NAME.to_string(),
        }
    }
}

/// Serial number read retries at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialRetryConfig {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for SerialRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            attempts: policy.attempts,
            backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

impl SerialRetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts.max(1),
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

/// One attached device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Driver attribute directory
    pub path: PathBuf,
    /// Device class name (see `periphd methods`)
    pub class: String,
    /// Sibling HID interface directories of the same device
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_interfaces: Vec<PathBuf>,
}

impl DeviceConfig {
    pub fn device_class(&self) -> Result<&'static DeviceClass, ConfigError> {
        find_class(&self.class).ok_or_else(|| ConfigError::UnknownClass(self.class.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub devices: Vec<DeviceConfig>,
    /// Relay effects between devices
    pub effect_sync: bool,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub serial_retry: SerialRetryConfig,
    pub dbus: DbusConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            effect_sync: false,
            log_level: "info".to_string(),
            serial_retry: SerialRetryConfig::default(),
            dbus: DbusConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("periphd")
            .join("config.toml")
    }

    /// Load config from a file, or return defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        for device in &config.devices {
            device.device_class()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.serial_retry.policy().attempts, 5);
        assert_eq!(config.serial_retry.policy().backoff, Duration::from_millis(100));
        assert_eq!(config.dbus.name, DEFAULT_BUS_NAME);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
effect_sync = true
log_level = "debug"

[serial_retry]
attempts = 2

[dbus]
bus = "system"

[[devices]]
path = "/sys/bus/hid/devices/0003:1532:0203.0001"
class = "chroma_keyboard"
extra_interfaces = ["/sys/bus/hid/devices/0003:1532:0203.0002"]

[[devices]]
path = "/sys/bus/hid/devices/0003:1532:0043.0004"
class = "chroma_mouse"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.effect_sync);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.serial_retry.attempts, 2);
        assert_eq!(config.serial_retry.backoff_ms, 100);
        assert_eq!(config.dbus.bus, BusKind::System);
        assert_eq!(config.dbus.name, DEFAULT_BUS_NAME);
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.devices[0].extra_interfaces.len(), 1);
        assert!(config.devices[1].extra_interfaces.is_empty());
    }

    #[test]
    fn test_unknown_class_rejected() {
        let err = Config::parse(
            r#"
[[devices]]
path = "/tmp/x"
class = "toaster"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownClass(name) if name == "toaster"));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(Config::parse("effect_sync = ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.devices.push(DeviceConfig {
            path: PathBuf::from("/sys/bus/hid/devices/0003:1532:0C02.0003"),
            class: "mug".into(),
            extra_interfaces: Vec::new(),
        });
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_zero_attempts_still_reads_once() {
        let retry = SerialRetryConfig {
            attempts: 0,
            backoff_ms: 0,
        };
        assert_eq!(retry.policy().attempts, 1);
    }
}
