//! Device coordinator
//!
//! Owns every attached device and is registered as their parent. Events
//! from a device with effect sync enabled are relayed to the observer sets
//! of all other devices, so a synchronisation observer on one device can
//! mirror what happened on its siblings.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use periph_attr::{AttributeStore, RetryPolicy};
use periph_device::{
    Device, DeviceClass, DeviceError, Event, MethodId, Observer, ObserverList, PowerState, Relay,
    SuspendStrategy,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CallError, ConfigError};
use crate::registry::{handler_registry, Handler, HandlerRegistry};
use crate::value::{Args, Value};

/// One device and its resolved call table
struct ManagedDevice {
    index: usize,
    serial: String,
    class: &'static DeviceClass,
    /// Same set the device delivers to; lets the relay skip the device lock
    observers: ObserverList,
    methods: HashMap<MethodId, Handler>,
    device: Mutex<Device>,
}

impl ManagedDevice {
    fn handler(&self, interface: &str, method: &str) -> Option<Handler> {
        let methods: &HashMap<(&str, &str), Handler> = &self.methods;
        methods.get(&(interface, method)).cloned()
    }
}

/// Device listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub index: usize,
    pub serial: String,
    pub class: String,
    pub device_type: String,
    pub state: String,
    pub effect_sync: bool,
}

/// Owner of all attached devices
pub struct DeviceManager {
    registry: &'static HandlerRegistry,
    retry: RetryPolicy,
    effect_sync: AtomicBool,
    next_index: AtomicUsize,
    devices: RwLock<Vec<Arc<ManagedDevice>>>,
}

impl DeviceManager {
    pub fn new(retry: RetryPolicy, effect_sync: bool) -> Arc<Self> {
        Self::with_registry(handler_registry(), retry, effect_sync)
    }

    pub fn with_registry(
        registry: &'static HandlerRegistry,
        retry: RetryPolicy,
        effect_sync: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            retry,
            effect_sync: AtomicBool::new(effect_sync),
            next_index: AtomicUsize::new(0),
            devices: RwLock::new(Vec::new()),
        })
    }

    /// Attach every configured device. Entries whose root does not exist, or
    /// whose serial is already attached, are skipped with a warning.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, ConfigError> {
        let manager = Self::new(config.serial_retry.policy(), config.effect_sync);

        for entry in &config.devices {
            let class = entry.device_class()?;
            if !entry.path.is_dir() {
                warn!(path = %entry.path.display(), class = class.name, "device root missing, skipping");
                continue;
            }
            let extra = entry
                .extra_interfaces
                .iter()
                .map(AttributeStore::sysfs)
                .collect();
            match manager.add_device(class, AttributeStore::sysfs(&entry.path), extra) {
                Ok(_) => {}
                Err(ConfigError::DuplicateSerial(serial)) => {
                    warn!(path = %entry.path.display(), %serial, "serial already attached, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        info!(devices = manager.len(), "devices attached");
        Ok(manager)
    }

    /// Open a device, register this manager as its parent and index it by
    /// serial. Returns the serial.
    pub fn add_device(
        self: &Arc<Self>,
        class: &'static DeviceClass,
        store: AttributeStore,
        extra_interfaces: Vec<AttributeStore>,
    ) -> Result<String, ConfigError> {
        let index = self.next_index.fetch_add(1, Ordering::SeqCst);
        let mut device =
            Device::open(index, class, store, &self.retry).with_extra_interfaces(extra_interfaces);

        let parent: Weak<dyn Relay> = Arc::downgrade(self) as Weak<dyn Relay>;
        device.register_parent(parent);
        device.set_effect_sync(self.effect_sync.load(Ordering::SeqCst));

        let serial = device.serial().to_string();
        let managed = Arc::new(ManagedDevice {
            index,
            serial: serial.clone(),
            class,
            observers: device.observers(),
            methods: self.registry.resolve(class),
            device: Mutex::new(device),
        });

        let mut devices = self.devices.write();
        if devices.iter().any(|d| d.serial == serial) {
            warn!(device = index, serial = %serial, "serial already attached");
            return Err(ConfigError::DuplicateSerial(serial));
        }
        info!(
            device = index,
            serial = %serial,
            class = class.name,
            methods = managed.methods.len(),
            "device added"
        );
        devices.push(managed);
        Ok(serial)
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Device handles, taken without holding the list lock afterwards
    fn snapshot(&self) -> Vec<Arc<ManagedDevice>> {
        self.devices.read().clone()
    }

    fn find(&self, serial: &str) -> Result<Arc<ManagedDevice>, CallError> {
        self.devices
            .read()
            .iter()
            .find(|d| d.serial == serial)
            .cloned()
            .ok_or_else(|| CallError::UnknownDevice(serial.to_string()))
    }

    pub fn list(&self) -> Vec<DeviceSummary> {
        self.snapshot()
            .iter()
            .map(|d| {
                let device = d.device.lock();
                DeviceSummary {
                    index: d.index,
                    serial: d.serial.clone(),
                    class: d.class.name.to_string(),
                    device_type: d.class.device_type.to_string(),
                    state: state_name(device.state()).to_string(),
                    effect_sync: device.effect_sync(),
                }
            })
            .collect()
    }

    /// `(interface, method)` pairs callable on a device, sorted
    pub fn methods(&self, serial: &str) -> Result<Vec<MethodId>, CallError> {
        let managed = self.find(serial)?;
        let mut methods: Vec<MethodId> = managed.methods.keys().copied().collect();
        methods.sort_unstable();
        Ok(methods)
    }

    /// Dispatch a remote call to a device
    pub fn call(
        &self,
        serial: &str,
        interface: &str,
        method: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let managed = self.find(serial)?;
        let handler = managed
            .handler(interface, method)
            .ok_or_else(|| CallError::UnknownMethod {
                interface: interface.to_string(),
                method: method.to_string(),
            })?;

        debug!(device = managed.index, serial = %serial, interface, method, ?args, "call");
        let mut device = managed.device.lock();
        let result = handler(&mut *device, Args::new(args));
        if let Err(e) = &result {
            warn!(device = managed.index, serial = %serial, interface, method, "call failed: {e}");
        }
        result
    }

    pub fn register_observer(
        &self,
        serial: &str,
        observer: Arc<dyn Observer>,
    ) -> Result<(), CallError> {
        self.find(serial)?.device.lock().register_observer(observer);
        Ok(())
    }

    /// Register `observer` on every attached device
    pub fn register_observer_all(&self, observer: Arc<dyn Observer>) {
        for managed in self.snapshot() {
            managed.device.lock().register_observer(observer.clone());
        }
    }

    /// Toggle effect sync on every device and for devices added later
    pub fn set_effect_sync(&self, enabled: bool) {
        self.effect_sync.store(enabled, Ordering::SeqCst);
        for managed in self.snapshot() {
            managed.device.lock().set_effect_sync(enabled);
        }
        info!(enabled, "effect sync");
    }

    pub fn effect_sync(&self) -> bool {
        self.effect_sync.load(Ordering::SeqCst)
    }

    /// Suspend every device that supports it. Returns the failures.
    pub fn suspend_all(&self) -> Vec<(String, DeviceError)> {
        self.for_each_suspendable(Device::suspend)
    }

    /// Resume every device that supports it. Returns the failures.
    pub fn resume_all(&self) -> Vec<(String, DeviceError)> {
        self.for_each_suspendable(Device::resume)
    }

    fn for_each_suspendable(
        &self,
        op: fn(&mut Device) -> periph_device::error::Result<()>,
    ) -> Vec<(String, DeviceError)> {
        let mut failures = Vec::new();
        for managed in self.snapshot() {
            if managed.class.suspend == SuspendStrategy::Unsupported {
                debug!(device = managed.index, class = managed.class.name, "no suspend support");
                continue;
            }
            let mut device = managed.device.lock();
            if device.is_closed() {
                continue;
            }
            if let Err(e) = op(&mut device) {
                warn!(device = managed.index, serial = %managed.serial, "power transition failed: {e}");
                failures.push((managed.serial.clone(), e));
            }
        }
        failures
    }

    /// Close every device. Safe to call more than once.
    pub fn close_all(&self) {
        for managed in self.snapshot() {
            managed.device.lock().close();
        }
    }
}

impl Relay for DeviceManager {
    fn relay(&self, event: &Event) {
        let mut delivered = 0;
        for managed in self.snapshot() {
            if managed.index == event.origin.index {
                continue;
            }
            managed.observers.deliver(event);
            delivered += 1;
        }
        debug!(origin = %event.origin, event = event.name, siblings = delivered, "relayed");
    }
}

fn state_name(state: PowerState) -> &'static str {
    match state {
        PowerState::Active => "active",
        PowerState::Suspended => "suspended",
        PowerState::Closed => "closed",
    }
}
