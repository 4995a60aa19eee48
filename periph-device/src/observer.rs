//! Observer registration and event fan-out
//!
//! Two relations are kept apart:
//! - observers, registered per device, receive every event the device raises
//! - the relay (parent), a non-owning reference to a coordinator that gets a
//!   copy first when effect sync is on, so it can mirror the effect onto
//!   sibling devices

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::warn;

use crate::event::Event;

/// Failure reported by an observer. Logged, never propagated to the device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ObserverError(pub String);

/// Receives events from devices
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event) -> Result<(), ObserverError>;
}

impl<F> Observer for F
where
    F: Fn(&Event) -> Result<(), ObserverError> + Send + Sync,
{
    fn notify(&self, event: &Event) -> Result<(), ObserverError> {
        self(event)
    }
}

/// Coordinator receiving events from child devices with effect sync enabled.
///
/// The originating device is carried in [`Event::origin`] as metadata; it is
/// not treated as another observer.
pub trait Relay: Send + Sync {
    fn relay(&self, event: &Event);
}

/// Insertion-ordered, deduplicated observer set.
///
/// Cloning yields another handle to the same set, which is how a coordinator
/// delivers to a device's observers without locking the device itself.
#[derive(Clone, Default)]
pub struct ObserverList {
    inner: Arc<RwLock<Vec<Arc<dyn Observer>>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `observer`. Returns false if it was already registered.
    pub fn register(&self, observer: Arc<dyn Observer>) -> bool {
        let mut list = self.inner.write();
        if list.iter().any(|o| same_observer(o, &observer)) {
            return false;
        }
        list.push(observer);
        true
    }

    /// Remove `observer`. Returns false if it was not registered.
    pub fn remove(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut list = self.inner.write();
        let before = list.len();
        list.retain(|o| !same_observer(o, observer));
        list.len() != before
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Deliver `event` to every observer in registration order.
    ///
    /// A failing or panicking observer does not stop delivery to the rest.
    /// Returns the number of observers that failed.
    pub fn deliver(&self, event: &Event) -> usize {
        // Snapshot so observers may (un)register while being notified
        let observers: Vec<Arc<dyn Observer>> = self.inner.read().clone();

        let mut failed = 0;
        for observer in observers {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.notify(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failed += 1;
                    warn!(error = %e, %event, "observer failed");
                }
                Err(_) => {
                    failed += 1;
                    warn!(%event, "observer panicked");
                }
            }
        }
        failed
    }
}

fn same_observer(a: &Arc<dyn Observer>, b: &Arc<dyn Observer>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
