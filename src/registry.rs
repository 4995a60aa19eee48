//! Call handler registry
//!
//! Maps `(interface, method)` to the handler that runs it against a device.
//! The table is built once; each device class' method list is resolved
//! against it when the device is added.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use periph_device::{Device, DeviceClass, MethodId};
use tracing::debug;

use crate::error::CallError;
use crate::handlers;
use crate::value::{Args, Value};

/// Runs one call against a device
pub type Handler =
    Arc<dyn Fn(&mut Device, Args<'_>) -> Result<Value, CallError> + Send + Sync>;

/// Immutable `(interface, method)` → handler table
pub struct HandlerRegistry {
    handlers: HashMap<MethodId, Handler>,
}

/// Builder for [`HandlerRegistry`]
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<MethodId, Handler>,
}

impl HandlerRegistryBuilder {
    /// Register a handler. A later registration for the same pair replaces
    /// the earlier one.
    pub fn method<F>(mut self, interface: &'static str, method: &'static str, handler: F) -> Self
    where
        F: Fn(&mut Device, Args<'_>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.handlers.insert((interface, method), Arc::new(handler));
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// Registry with every built-in endpoint
    fn with_builtin_handlers() -> Self {
        handlers::install(Self::builder()).build()
    }

    pub fn get(&self, interface: &str, method: &str) -> Option<Handler> {
        // Keys are covariant in their lifetime, so a borrowed pair can look up
        let handlers: &HashMap<(&str, &str), Handler> = &self.handlers;
        handlers.get(&(interface, method)).cloned()
    }

    pub fn contains(&self, interface: &str, method: &str) -> bool {
        self.get(interface, method).is_some()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers for every method `class` exposes. Names without a handler are
    /// skipped.
    pub fn resolve(&self, class: &DeviceClass) -> HashMap<MethodId, Handler> {
        let mut resolved = HashMap::new();
        for (interface, method) in class.methods() {
            match self.handlers.get(&(interface, method)) {
                Some(handler) => {
                    resolved.insert((interface, method), handler.clone());
                }
                None => {
                    debug!(class = class.name, interface, method, "no handler, skipping method");
                }
            }
        }
        resolved
    }
}

// Global singleton registry
static REGISTRY: OnceLock<HandlerRegistry> = OnceLock::new();

/// Get the global handler registry
pub fn handler_registry() -> &'static HandlerRegistry {
    REGISTRY.get_or_init(HandlerRegistry::with_builtin_handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use periph_device::CLASSES;

    #[test]
    fn test_every_class_method_has_a_handler() {
        let reg = handler_registry();
        for class in CLASSES {
            for (interface, method) in class.methods() {
                assert!(
                    reg.contains(interface, method),
                    "{}: no handler for {interface}.{method}",
                    class.name
                );
            }
        }
    }

    #[test]
    fn test_resolve_skips_unknown_names() {
        let reg = HandlerRegistry::builder()
            .method("periph.device.misc", "getSerial", |dev, _| {
                Ok(Value::from(dev.serial()))
            })
            .build();
        let resolved = reg.resolve(&periph_device::class::CHROMA_KEYBOARD);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key(&("periph.device.misc", "getSerial")));
    }

    #[test]
    fn test_later_registration_wins() {
        let reg = HandlerRegistry::builder()
            .method("a", "b", |_, _| Ok(Value::Int(1)))
            .method("a", "b", |_, _| Ok(Value::Int(2)))
            .build();
        assert_eq!(reg.len(), 1);
        assert!(reg.contains("a", "b"));
        assert!(!reg.contains("a", "c"));
    }
}
