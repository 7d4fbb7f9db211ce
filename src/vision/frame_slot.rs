//! Single-slot hand-off between frame capture and processing.
//!
//! When capture and classification run on different threads, queueing is
//! the wrong model: a stale landmark frame is worthless once a newer one
//! exists. The slot therefore holds at most one value and `publish`
//! overwrites; the consumer always sees the latest frame or nothing.

use parking_lot::Mutex;

/// A latest-wins hand-off slot for one producer and one consumer.
#[derive(Debug, Default)]
pub struct FrameSlot<T> {
    slot: Mutex<Option<T>>,
}

impl<T> FrameSlot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Publishes a value, replacing any unconsumed one.
    ///
    /// Returns `true` if an unconsumed value was dropped.
    pub fn publish(&self, value: T) -> bool {
        self.slot.lock().replace(value).is_some()
    }

    /// Takes the latest value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    /// Returns whether a value is waiting.
    pub fn is_occupied(&self) -> bool {
        self.slot.lock().is_some()
    }
}
