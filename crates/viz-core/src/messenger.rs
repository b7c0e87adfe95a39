//! User-facing message collection.
//!
//! Adapters and style engines degrade on failure instead of erroring out, but
//! the person viewing the visualisation still needs to know something went
//! wrong. Messages collected here end up on the render output.

use std::sync::Arc;

use parking_lot::Mutex;

/// Ordered collector of user-visible error messages. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct Messenger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a user-facing error alongside a log entry.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "viz", "{message}");
        self.messages.lock().push(message);
    }

    /// Current messages, in the order they were added.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Takes all messages, leaving the collector empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}
