//! Notification sink contract.
//!
//! The graph calls [`NotificationSink::notify`] with `(identifier, field)` for
//! every edge whose observable state changed. Delivery and coalescing beyond
//! the graph's per-flush de-duplication belong to the consumer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::identifier::{FieldName, Identifier};

/// Receives relationship change notifications.
pub trait NotificationSink: Send {
    /// `field` on `identifier` changed observably.
    fn notify(&mut self, identifier: &Identifier, field: &str);
}

impl<F> NotificationSink for F
where
    F: FnMut(&Identifier, &str) + Send,
{
    fn notify(&mut self, identifier: &Identifier, field: &str) {
        self(identifier, field)
    }
}

/// Sink that discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _identifier: &Identifier, _field: &str) {}
}

/// One delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Owner of the edge that changed.
    pub identifier: Identifier,
    /// Field of the edge that changed.
    pub field: FieldName,
}

/// Shared recording sink.
///
/// Clones share the same log, so a host can keep one clone and hand the other
/// to the graph.
#[derive(Debug, Default, Clone)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Copy of everything recorded so far.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    /// Number of recorded notifications.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of notifications recorded for `(identifier, field)`.
    pub fn count_for(&self, identifier: &Identifier, field: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|n| &n.identifier == identifier && &*n.field == field)
            .count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&mut self, identifier: &Identifier, field: &str) {
        self.entries.lock().push(Notification {
            identifier: identifier.clone(),
            field: FieldName::from(field),
        });
    }
}
