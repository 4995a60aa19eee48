//! In-memory device used by endpoint tests

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use periph_attr::{AttributeStore, MemoryIo, RetryPolicy};

use crate::class::DeviceClass;
use crate::device::Device;
use crate::event::Event;
use crate::observer::{Observer, ObserverError};

pub const ROOT: &str = "/sys/bus/hid/devices/0003:1532:0203.0001";
pub const SERIAL: &str = "XX0123456789";

pub struct Fixture {
    pub io: Arc<MemoryIo>,
    pub dev: Device,
    events: Arc<Mutex<Vec<Event>>>,
}

impl Fixture {
    pub fn new(class: &'static DeviceClass) -> Self {
        let io = Arc::new(MemoryIo::new());
        io.insert(Path::new(ROOT).join("device_serial"), SERIAL);
        let store = AttributeStore::with_io(ROOT, io.clone());
        let retry = RetryPolicy {
            attempts: 1,
            backoff: Duration::ZERO,
        };
        let dev = Device::open(0, class, store, &retry);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let observer: Arc<dyn Observer> = Arc::new(move |e: &Event| -> Result<(), ObserverError> {
            sink.lock().push(e.clone());
            Ok(())
        });
        dev.register_observer(observer);

        Self { io, dev, events }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        Path::new(ROOT).join(name)
    }

    pub fn set(&self, name: &str, content: impl AsRef<[u8]>) {
        self.io.insert(self.path(name), content);
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.io.text(&self.path(name))
    }

    pub fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.io.contents(&self.path(name))
    }

    /// Events seen so far, in display form
    pub fn events(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.to_string()).collect()
    }

    /// Expected display form of an event from this fixture's device
    pub fn event(&self, body: &str) -> String {
        format!("(\"effect\", {}:{SERIAL}, {body})", self.dev.class().name)
    }
}
