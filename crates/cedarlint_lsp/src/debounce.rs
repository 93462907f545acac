//! Debouncing utilities for LSP notifications.

use std::time::Duration;

use tracing::debug;

use cedarlint_core::DocumentId;

use crate::state::SharedState;

/// Spawns a debounced validation task.
///
/// This function waits for the debounce period, then checks if the document
/// version is still the same before triggering validation.
pub fn spawn_debounced_validation(state: SharedState, id: DocumentId, version: i32, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        if !state.documents.is_current(&id, version) {
            debug!("Skipping superseded change of {} (version {})", id, version);
            return;
        }

        if let Some(doc) = state.documents.snapshot(&id) {
            state.validator.validate_document(&doc, false).await;
        }
    });
}
