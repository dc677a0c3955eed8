use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StatusSlot {
    generation: u64,
    text: Option<String>,
}

/// Status text that clears itself a fixed delay after it was last set.
///
/// At most one clear task is outstanding; setting a newer message or
/// dropping the line aborts it. Outside a tokio runtime messages stay until
/// replaced.
pub struct StatusLine {
    slot: Arc<watch::Sender<StatusSlot>>,
    clear_task: Option<JoinHandle<()>>,
    clear_after: Duration,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::with_clear_delay(STATUS_CLEAR_DELAY)
    }

    pub fn with_clear_delay(clear_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(StatusSlot::default());
        Self {
            slot: Arc::new(tx),
            clear_task: None,
            clear_after,
        }
    }

    pub fn message(&self) -> Option<String> {
        self.slot.borrow().text.clone()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
        let text = text.into();
        let mut generation = 0;
        self.slot.send_modify(|slot| {
            slot.generation += 1;
            slot.text = Some(text);
            generation = slot.generation;
        });

        let Ok(handle) = Handle::try_current() else {
            log::debug!("no runtime, status will not auto-clear");
            return;
        };
        let slot = Arc::clone(&self.slot);
        let delay = self.clear_after;
        self.clear_task = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            slot.send_if_modified(|current| {
                if current.generation != generation {
                    return false;
                }
                current.text = None;
                true
            });
        }));
    }

    pub fn clear(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
        self.slot.send_modify(|slot| {
            slot.generation += 1;
            slot.text = None;
        });
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusLine")
            .field("message", &self.message())
            .field("clear_after", &self.clear_after)
            .finish()
    }
}
