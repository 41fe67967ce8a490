//! Output transports for surface messages.

use crate::error::{Error, Result};
use crate::message::SurfaceMessage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Fire-and-forget destination for surface messages.
///
/// Shared between the tick thread and display write workers.
pub trait MidiSink: Send + Sync {
    fn send(&self, message: SurfaceMessage) -> Result<()>;

    /// Whether the transport can still deliver messages.
    fn is_available(&self) -> bool {
        true
    }

    /// Bumped every time the transport (re)connects to a device. A change means
    /// the hardware lost what was shown and everything must be resent.
    fn generation(&self) -> u64 {
        0
    }
}

impl<S: MidiSink + ?Sized> MidiSink for Arc<S> {
    fn send(&self, message: SurfaceMessage) -> Result<()> {
        (**self).send(message)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn generation(&self) -> u64 {
        (**self).generation()
    }
}

/// In-memory sink that records everything sent through it.
///
/// Clones share the same recording.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<SurfaceMessage>>>,
    available: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn messages(&self) -> Vec<SurfaceMessage> {
        self.messages.lock().clone()
    }

    /// Drain the recording.
    pub fn take(&self) -> Vec<SurfaceMessage> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }

    /// Simulate the transport going away; sends fail while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Simulate the device being power cycled or replugged.
    pub fn reconnect(&self) {
        self.available.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiSink for RecordingSink {
    fn send(&self, message: SurfaceMessage) -> Result<()> {
        if !self.is_available() {
            return Err(Error::MidiPort("recording sink unavailable".to_string()));
        }
        tracing::trace!("-> {:02X?}", message.bytes);
        self.messages.lock().push(message);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
