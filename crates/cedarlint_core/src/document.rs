//! Document identities, snapshots and the host-side document store.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Canonical URI of an editable document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates an identity from a URI string, canonicalising it when it parses.
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        match Url::parse(&uri) {
            Ok(url) => Self(url.into()),
            Err(_) => Self(uri),
        }
    }

    /// Creates a `file:` identity for an absolute path.
    pub fn from_file_path(path: impl AsRef<Path>) -> Option<Self> {
        Url::from_file_path(path.as_ref())
            .ok()
            .map(|url| Self(url.into()))
    }

    /// Returns the URI string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the URI scheme (`file`, `untitled`, `vscode-local-history`, ...).
    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(scheme, _)| scheme).unwrap_or("")
    }

    /// Returns true if the document lives on the local file system.
    pub fn is_file(&self) -> bool {
        self.scheme() == "file"
    }

    /// Converts a `file:` identity to a local path.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if !self.is_file() {
            return None;
        }
        Url::parse(&self.0).ok()?.to_file_path().ok()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable snapshot of a document at one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub id: DocumentId,
    pub version: i32,
    pub text: String,
    /// Language id declared by the editor, if any.
    pub language_id: Option<String>,
}

impl TextDocument {
    pub fn new(id: DocumentId, version: i32, text: impl Into<String>) -> Self {
        Self {
            id,
            version,
            text: text.into(),
            language_id: None,
        }
    }

    pub fn with_language_id(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }

    /// File path of the document, or the raw URI for non-file documents.
    pub fn file_name(&self) -> PathBuf {
        self.id
            .to_file_path()
            .unwrap_or_else(|| PathBuf::from(self.id.as_str()))
    }
}

/// Access to the host's documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Opens the current content of `id`, from an editor buffer or from disk.
    async fn open(&self, id: &DocumentId) -> Option<TextDocument>;

    /// Returns the current version of `id` if the host is tracking it.
    fn current_version(&self, id: &DocumentId) -> Option<i32>;
}

/// Reads documents straight from disk. Every document is at version 0.
#[derive(Debug, Default, Clone)]
pub struct FileSystemStore;

impl FileSystemStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentStore for FileSystemStore {
    async fn open(&self, id: &DocumentId) -> Option<TextDocument> {
        read_file_document(id).await
    }

    fn current_version(&self, _id: &DocumentId) -> Option<i32> {
        None
    }
}

/// Loads a `file:` document from disk at version 0.
pub async fn read_file_document(id: &DocumentId) -> Option<TextDocument> {
    let path = id.to_file_path()?;
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Some(TextDocument::new(id.clone(), 0, text)),
        Err(e) => {
            debug!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
