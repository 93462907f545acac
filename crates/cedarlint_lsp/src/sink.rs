//! Publishes validation results to the LSP client.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tower_lsp::Client;
use tower_lsp::lsp_types::{MessageType, Url};
use tracing::{debug, error};

use cedarlint_core::{Diagnostic, DiagnosticsSink, DocumentId, DocumentStore};

use crate::conversion::to_lsp_diagnostic;
use crate::state::DocumentBuffers;

/// [`DiagnosticsSink`] backed by `textDocument/publishDiagnostics`.
pub(crate) struct ClientSink {
    client: Client,
    documents: Arc<DocumentBuffers>,
    /// Documents with diagnostics currently shown by the client.
    published: RwLock<HashSet<DocumentId>>,
}

impl ClientSink {
    pub fn new(client: Client, documents: Arc<DocumentBuffers>) -> Self {
        Self {
            client,
            documents,
            published: RwLock::new(HashSet::new()),
        }
    }

    fn track(&self, id: &DocumentId, shown: bool) {
        match self.published.write() {
            Ok(mut published) => {
                if shown {
                    published.insert(id.clone());
                } else {
                    published.remove(id);
                }
            }
            Err(e) => error!("Published diagnostics lock poisoned: {}", e),
        }
    }

    /// Removes every diagnostic this server published.
    pub async fn clear_all(&self) {
        let ids: Vec<DocumentId> = match self.published.write() {
            Ok(mut published) => published.drain().collect(),
            Err(e) => {
                error!("Published diagnostics lock poisoned: {}", e);
                return;
            }
        };
        debug!("Clearing diagnostics of {} documents", ids.len());
        for id in ids {
            if let Some(uri) = to_url(&id) {
                self.client.publish_diagnostics(uri, vec![], None).await;
            }
        }
    }
}

fn to_url(id: &DocumentId) -> Option<Url> {
    match Url::parse(id.as_str()) {
        Ok(uri) => Some(uri),
        Err(e) => {
            error!("Invalid document URI {}: {}", id, e);
            None
        }
    }
}

#[async_trait]
impl DiagnosticsSink for ClientSink {
    async fn set(&self, id: &DocumentId, diagnostics: Vec<Diagnostic>) {
        let Some(uri) = to_url(id) else {
            return;
        };

        // Dependents revalidated after a schema change may not be open.
        let Some(doc) = self.documents.open(id).await else {
            debug!("Cannot publish diagnostics for unreadable document: {}", id);
            return;
        };
        let version = self.documents.current_version(id);

        let lsp_diagnostics: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| to_lsp_diagnostic(d, &doc.text))
            .collect();

        self.track(id, !lsp_diagnostics.is_empty());
        self.client
            .publish_diagnostics(uri, lsp_diagnostics, version)
            .await;
    }

    async fn delete(&self, id: &DocumentId) {
        let Some(uri) = to_url(id) else {
            return;
        };
        self.track(id, false);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn show_error(&self, message: &str) {
        self.client.show_message(MessageType::ERROR, message).await;
    }
}
