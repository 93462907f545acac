//! Queue of documents waiting to be revalidated after their schema changed.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::DocumentId;

/// Documents pushed for revalidation, in arrival order and without duplicates.
#[derive(Debug, Default)]
pub struct RevalidationQueue {
    pending: Mutex<VecDeque<DocumentId>>,
    notify: Notify,
}

impl RevalidationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `ids`, skipping those already pending, and wakes the worker.
    pub fn push(&self, ids: impl IntoIterator<Item = DocumentId>) {
        let mut added = 0;
        {
            let mut pending = self.pending.lock();
            for id in ids {
                if !pending.contains(&id) {
                    pending.push_back(id);
                    added += 1;
                }
            }
        }
        if added > 0 {
            debug!("Queued {} documents for revalidation", added);
            self.notify.notify_one();
        }
    }

    pub fn pop(&self) -> Option<DocumentId> {
        self.pending.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    /// Waits until something was pushed since the last wake-up.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}
