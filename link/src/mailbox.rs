use std::sync::Arc;
use tokio::sync::watch;

/// Single-slot mailbox: every publish overwrites the slot, readers only ever
/// see the most recent value. Nothing is queued.
pub struct LatestSample<T> {
    slot: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for LatestSample<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for LatestSample<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSample<T> {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
        }
    }

    pub fn publish(&self, value: T) {
        self.slot.send_replace(Some(value));
    }

    pub fn clear(&self) {
        self.slot.send_replace(None);
    }

    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.slot.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }

    /// Receiver that wakes whenever the slot is overwritten.
    pub fn watch(&self) -> watch::Receiver<Option<T>> {
        self.slot.subscribe()
    }
}
