//! Watched files handler.

use tower_lsp::lsp_types::*;
use tracing::{debug, info};

use cedarlint_core::{CedarLintConfig, DocumentId, is_schema_file};

use crate::config::reload_config;
use crate::state::SharedState;

/// What a batch of watched file events requires.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WatchedChanges {
    /// Configuration was reloaded; every open document needs validation.
    pub config_reloaded: bool,
    /// Schema files changed on disk.
    pub schemas: Vec<DocumentId>,
}

/// Handles the `workspace/didChangeWatchedFiles` notification.
pub async fn handle_did_change_watched_files(
    state: &SharedState,
    params: DidChangeWatchedFilesParams,
) -> WatchedChanges {
    debug!("Watched files changed: {:?}", params.changes);

    let mut result = WatchedChanges::default();

    let config_changed = params.changes.iter().any(|change| {
        let path = change.uri.path();
        CedarLintConfig::CONFIG_FILES
            .iter()
            .any(|name| path.ends_with(name))
    });

    if config_changed {
        info!("Configuration file changed, reloading...");
        reload_config(state);
        result.config_reloaded = true;
    }

    for change in &params.changes {
        if change.typ == FileChangeType::DELETED {
            continue;
        }
        let Ok(path) = change.uri.to_file_path() else {
            continue;
        };
        if !is_schema_file(&path) {
            continue;
        }
        let id = DocumentId::new(change.uri.as_str());
        // Open buffers are validated through their own notifications.
        if state.documents.snapshot(&id).is_none() {
            // Disk reads are always version 0.
            state.validator.forget(&id);
            result.schemas.push(id);
        }
    }

    result
}
