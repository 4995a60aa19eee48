//! Device object: identity, attribute store, power state and notifications

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use periph_attr::{AttributeStore, RetryPolicy};
use tracing::{debug, info, warn};

use crate::class::{DeviceClass, SuspendStrategy};
use crate::error::{DeviceError, Result};
use crate::event::{Event, EventArg, Origin};
use crate::led::{RgbColor, Zone};
use crate::observer::{Observer, ObserverList, Relay};

/// Brightness restored by a resume that had no matching suspend
pub const DEFAULT_RESUME_BRIGHTNESS: f64 = 100.0;

/// Device power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Active,
    Suspended,
    /// Terminal
    Closed,
}

/// One attached peripheral
pub struct Device {
    index: usize,
    class: &'static DeviceClass,
    store: AttributeStore,
    /// Sibling HID interfaces of the same device (extra key toggles)
    extra_interfaces: Vec<AttributeStore>,
    serial: String,
    observers: ObserverList,
    parent: Option<Weak<dyn Relay>>,
    effect_sync: bool,
    disable_notify: bool,
    state: PowerState,
    suspend_args: HashMap<Zone, f64>,
}

impl Device {
    /// Attach to a device, resolving its serial.
    ///
    /// Blocks for up to `retry.attempts * retry.backoff` if the driver has
    /// not published the serial yet.
    pub fn open(
        index: usize,
        class: &'static DeviceClass,
        store: AttributeStore,
        retry: &RetryPolicy,
    ) -> Self {
        info!(device = index, class = class.name, root = %store.root().display(), "initialising device");
        let serial = store.resolve_serial(retry);

        Self {
            index,
            class,
            store,
            extra_interfaces: Vec::new(),
            serial,
            observers: ObserverList::new(),
            parent: None,
            effect_sync: false,
            disable_notify: false,
            state: PowerState::Active,
            suspend_args: HashMap::new(),
        }
    }

    /// Add sibling interface roots
    pub fn with_extra_interfaces(mut self, interfaces: Vec<AttributeStore>) -> Self {
        self.extra_interfaces = interfaces;
        self
    }

    // === Identity ===

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn class(&self) -> &'static DeviceClass {
        self.class
    }

    /// Serial number, fixed for the lifetime of the object
    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn origin(&self) -> Origin {
        Origin {
            index: self.index,
            class: self.class.name,
            serial: self.serial.clone(),
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == PowerState::Closed
    }

    // === Flags ===

    pub fn effect_sync(&self) -> bool {
        self.effect_sync
    }

    /// When set, events are relayed to the parent before local delivery
    pub fn set_effect_sync(&mut self, enabled: bool) {
        self.effect_sync = enabled;
    }

    pub fn disable_notify(&self) -> bool {
        self.disable_notify
    }

    pub fn set_disable_notify(&mut self, disabled: bool) {
        self.disable_notify = disabled;
    }

    /// Run `f` with outgoing notifications suppressed, restoring the
    /// previous setting afterwards even if `f` fails.
    pub fn with_notifications_suppressed<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let previous = std::mem::replace(&mut self.disable_notify, true);
        let result = f(self);
        self.disable_notify = previous;
        result
    }

    // === Observers ===

    /// Idempotent: registering an observer twice keeps one entry
    pub fn register_observer(&self, observer: Arc<dyn Observer>) {
        if !self.observers.register(observer) {
            debug!(device = self.index, "observer already registered");
        }
    }

    /// Idempotent: removing an unknown observer is a no-op
    pub fn remove_observer(&self, observer: &Arc<dyn Observer>) {
        self.observers.remove(observer);
    }

    /// Shared handle to this device's observer set
    pub fn observers(&self) -> ObserverList {
        self.observers.clone()
    }

    /// Set the relay target. The device does not keep it alive.
    pub fn register_parent(&mut self, parent: Weak<dyn Relay>) {
        self.parent = Some(parent);
    }

    /// Raise `("effect", self, name, args...)`
    pub fn send_effect_event(&self, name: &'static str, args: Vec<EventArg>) {
        let event = Event::effect(self.origin(), name, args);
        self.notify_observers(&event);
    }

    /// Fan an event raised by this device out to the parent (if effect sync
    /// is on) and then to local observers in registration order.
    pub fn notify_observers(&self, event: &Event) {
        if self.disable_notify {
            debug!(device = self.index, %event, "notification suppressed");
            return;
        }
        debug!(device = self.index, %event, "sending observer message");

        if self.effect_sync {
            if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
                parent.relay(event);
            }
        }
        self.observers.deliver(event);
    }

    /// Receive an event from elsewhere (typically a sibling via the parent)
    /// and pass it to local observers.
    pub fn notify(&self, event: &Event) {
        debug!(device = self.index, %event, "got observer message");
        self.observers.deliver(event);
    }

    // === Power ===

    /// Save per-zone brightness and drive it to zero.
    ///
    /// Suspending an already suspended device re-captures the current values.
    pub fn suspend(&mut self) -> Result<()> {
        let zones = self.suspend_zones()?;
        info!(device = self.index, serial = %self.serial, "suspending");

        // Saved values are committed only once every zone is dark; a failure
        // part way restores the zones already darkened
        let captured = self.with_notifications_suppressed(|dev| {
            let mut captured = HashMap::with_capacity(zones.len());
            for &zone in zones {
                let result = dev.zone_brightness(zone).and_then(|brightness| {
                    captured.insert(zone, brightness);
                    dev.set_zone_brightness(zone, 0.0)
                });
                if let Err(err) = result {
                    dev.roll_back_suspend(&captured);
                    return Err(err);
                }
            }
            Ok(captured)
        })?;

        self.suspend_args = captured;
        self.state = PowerState::Suspended;
        Ok(())
    }

    fn roll_back_suspend(&mut self, captured: &HashMap<Zone, f64>) {
        for (&zone, &brightness) in captured {
            if let Err(e) = self.set_zone_brightness(zone, brightness) {
                warn!(device = self.index, zone = zone.name(), error = %e, "suspend roll back failed");
            }
        }
    }

    /// Restore brightness saved by [`Device::suspend`], or
    /// [`DEFAULT_RESUME_BRIGHTNESS`] for zones without a saved value.
    pub fn resume(&mut self) -> Result<()> {
        let zones = self.suspend_zones()?;
        info!(device = self.index, serial = %self.serial, "resuming");

        let saved = std::mem::take(&mut self.suspend_args);
        let result = self.with_notifications_suppressed(|dev| {
            for &zone in zones {
                let brightness = saved.get(&zone).copied().unwrap_or(DEFAULT_RESUME_BRIGHTNESS);
                dev.set_zone_brightness(zone, brightness)?;
            }
            Ok(())
        });

        if result.is_err() {
            self.suspend_args = saved;
            return result;
        }
        self.state = PowerState::Active;
        Ok(())
    }

    /// Saved brightness for `zone`, present only between suspend and resume
    pub fn suspended_brightness(&self, zone: Zone) -> Option<f64> {
        self.suspend_args.get(&zone).copied()
    }

    fn suspend_zones(&self) -> Result<&'static [Zone]> {
        self.ensure_open()?;
        match self.class.suspend {
            SuspendStrategy::Brightness(zones) => Ok(zones),
            SuspendStrategy::Unsupported => Err(DeviceError::NotSupported(format!(
                "{} has no suspend support",
                self.class.name
            ))),
        }
    }

    /// Drop observers and enter the terminal state. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.state == PowerState::Closed {
            return;
        }
        self.observers.clear();
        self.state = PowerState::Closed;
        info!(device = self.index, serial = %self.serial, "closed");
    }

    // === Internals shared by endpoints ===

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.state == PowerState::Closed {
            return Err(DeviceError::Closed(self.serial.clone()));
        }
        Ok(())
    }

    /// Attribute store, refused once the device is closed
    pub(crate) fn attrs(&mut self) -> Result<&mut AttributeStore> {
        self.ensure_open()?;
        Ok(&mut self.store)
    }

    pub(crate) fn extra_interfaces_mut(&mut self) -> Result<&mut [AttributeStore]> {
        self.ensure_open()?;
        Ok(&mut self.extra_interfaces)
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("index", &self.index)
            .field("class", &self.class.name)
            .field("serial", &self.serial)
            .field("state", &self.state)
            .field("effect_sync", &self.effect_sync)
            .finish()
    }
}

/// Flatten colours into positional `r, g, b` event arguments
pub(crate) fn colour_args(colours: &[RgbColor]) -> Vec<EventArg> {
    colours
        .iter()
        .flat_map(|c| c.to_bytes())
        .map(EventArg::from)
        .collect()
}
