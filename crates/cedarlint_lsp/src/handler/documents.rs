//! Document lifecycle handlers (open, change, save, close).

use tower_lsp::lsp_types::*;
use tracing::debug;

use cedarlint_core::DocumentId;

use crate::state::{DocumentData, SharedState};

/// Handles the `textDocument/didOpen` notification.
pub async fn handle_did_open(state: &SharedState, params: DidOpenTextDocumentParams) -> DocumentId {
    debug!("Document opened: {}", params.text_document.uri);

    let id = DocumentId::new(params.text_document.uri.as_str());
    state.documents.insert(
        id.clone(),
        DocumentData {
            text: params.text_document.text,
            version: params.text_document.version,
            language_id: Some(params.text_document.language_id),
        },
    );
    id
}

/// Handles the `textDocument/didChange` notification.
///
/// Returns the document and version for debounced validation.
pub async fn handle_did_change(
    state: &SharedState,
    params: DidChangeTextDocumentParams,
) -> Option<(DocumentId, i32)> {
    debug!("Document changed: {}", params.text_document.uri);

    let change = params.content_changes.into_iter().last()?;
    let id = DocumentId::new(params.text_document.uri.as_str());
    let version = params.text_document.version;

    state.documents.update(id.clone(), change.text, version);
    Some((id, version))
}

/// Handles the `textDocument/didSave` notification.
pub async fn handle_did_save(state: &SharedState, params: DidSaveTextDocumentParams) -> DocumentId {
    debug!("Document saved: {}", params.text_document.uri);

    let id = DocumentId::new(params.text_document.uri.as_str());
    if let Some(text) = params.text
        && let Some(version) = state.documents.snapshot(&id).map(|doc| doc.version)
    {
        state.documents.update(id.clone(), text, version);
    }
    id
}

/// Handles the `textDocument/didClose` notification.
///
/// Diagnostics stay published: closed documents can still be revalidated
/// when their schema changes.
pub async fn handle_did_close(state: &SharedState, params: DidCloseTextDocumentParams) -> DocumentId {
    debug!("Document closed: {}", params.text_document.uri);

    let id = DocumentId::new(params.text_document.uri.as_str());
    state.documents.remove(&id);
    // Versions restart when the document is reopened.
    state.validator.forget(&id);
    id
}
