//! LSP Backend state management.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::error;

use cedarlint_core::{
    CedarLintConfig, DocumentId, DocumentStore, TextDocument, Validator, WorkspaceSchemaResolver,
    read_file_document,
};

use crate::sink::ClientSink;

/// Document content and version cache.
#[derive(Debug, Clone)]
pub(crate) struct DocumentData {
    pub text: String,
    pub version: i32,
    pub language_id: Option<String>,
}

/// Open editor buffers. Documents that are not open are read from disk.
#[derive(Debug, Default)]
pub(crate) struct DocumentBuffers {
    documents: RwLock<HashMap<DocumentId, DocumentData>>,
}

impl DocumentBuffers {
    pub fn insert(&self, id: DocumentId, data: DocumentData) {
        match self.documents.write() {
            Ok(mut docs) => {
                docs.insert(id, data);
            }
            Err(e) => error!("Documents lock poisoned: {}", e),
        }
    }

    /// Replaces the text of an open document, keeping its language id.
    pub fn update(&self, id: DocumentId, text: String, version: i32) {
        match self.documents.write() {
            Ok(mut docs) => {
                let language_id = docs.get(&id).and_then(|doc| doc.language_id.clone());
                docs.insert(
                    id,
                    DocumentData {
                        text,
                        version,
                        language_id,
                    },
                );
            }
            Err(e) => error!("Documents lock poisoned: {}", e),
        }
    }

    pub fn remove(&self, id: &DocumentId) {
        match self.documents.write() {
            Ok(mut docs) => {
                docs.remove(id);
            }
            Err(e) => error!("Documents lock poisoned: {}", e),
        }
    }

    /// Returns the buffered snapshot of `id`, if it is open.
    pub fn snapshot(&self, id: &DocumentId) -> Option<TextDocument> {
        let docs = match self.documents.read() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                return None;
            }
        };
        docs.get(id).map(|data| {
            let doc = TextDocument::new(id.clone(), data.version, data.text.clone());
            match &data.language_id {
                Some(language_id) => doc.with_language_id(language_id.clone()),
                None => doc,
            }
        })
    }

    /// Checks if the document version is still current.
    pub fn is_current(&self, id: &DocumentId, version: i32) -> bool {
        self.current_version(id) == Some(version)
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        match self.documents.read() {
            Ok(docs) => docs.keys().cloned().collect(),
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DocumentStore for DocumentBuffers {
    async fn open(&self, id: &DocumentId) -> Option<TextDocument> {
        match self.snapshot(id) {
            Some(doc) => Some(doc),
            None => read_file_document(id).await,
        }
    }

    fn current_version(&self, id: &DocumentId) -> Option<i32> {
        let docs = match self.documents.read() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                return None;
            }
        };
        docs.get(id).map(|doc| doc.version)
    }
}

/// Shared backend state.
pub(crate) struct BackendState {
    pub documents: Arc<DocumentBuffers>,
    pub validator: Arc<Validator>,
    pub resolver: Arc<WorkspaceSchemaResolver>,
    pub sink: Arc<ClientSink>,
    /// Workspace root path.
    pub workspace_root: RwLock<Option<PathBuf>>,
    pub config: RwLock<CedarLintConfig>,
    /// Set once the background revalidation task is running.
    pub revalidation_started: AtomicBool,
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendState")
            .field("documents", &"<DocumentBuffers>")
            .field("validator", &"<Validator>")
            .field("workspace_root", &self.workspace_root)
            .field("config", &self.config)
            .finish()
    }
}

impl BackendState {
    /// Returns a copy of the current configuration.
    pub fn config(&self) -> CedarLintConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(e) => {
                error!("Config lock poisoned: {}", e);
                CedarLintConfig::default()
            }
        }
    }
}

/// Type alias for shared state.
pub type SharedState = Arc<BackendState>;
