//! Finding the schema a policy or entities document is validated against.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::classifier::is_schema_file;
use crate::{CedarLintConfig, Diagnostic, DocumentId, DocumentStore, Span, TextDocument};

/// Resolves the schema associated with a document.
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    /// Returns the schema `doc` should be validated against, or `None`.
    ///
    /// Problems found while resolving are pushed onto `diagnostics`, which
    /// are published for `doc`.
    async fn resolve(
        &self,
        doc: &TextDocument,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<TextDocument>;
}

#[derive(Debug, Default, Clone)]
struct ResolverSettings {
    schema_file: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
}

/// Resolves the configured `schemaFile`, or else the nearest schema file in
/// the document's directory or one of its parents, up to the workspace root.
pub struct WorkspaceSchemaResolver {
    store: Arc<dyn DocumentStore>,
    settings: RwLock<ResolverSettings>,
}

impl WorkspaceSchemaResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            settings: RwLock::new(ResolverSettings::default()),
        }
    }

    /// Limits the upward directory walk to `root`.
    pub fn set_workspace_root(&self, root: Option<PathBuf>) {
        self.settings.write().workspace_root = root;
    }

    /// Applies the `schemaFile` setting of `config`.
    pub fn apply_config(&self, config: &CedarLintConfig) {
        self.settings.write().schema_file = config.schema_path();
    }

    fn settings(&self) -> ResolverSettings {
        self.settings.read().clone()
    }

    async fn open_path(&self, path: &Path) -> Option<TextDocument> {
        let id = DocumentId::from_file_path(path)?;
        self.store.open(&id).await
    }
}

#[async_trait]
impl SchemaResolver for WorkspaceSchemaResolver {
    async fn resolve(
        &self,
        doc: &TextDocument,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<TextDocument> {
        let settings = self.settings();

        if let Some(schema_file) = &settings.schema_file {
            match self.open_path(schema_file).await {
                Some(schema) => return Some(schema),
                None => {
                    debug!("Configured schema {} not found", schema_file.display());
                    diagnostics.push(Diagnostic::warning(
                        Span::default(),
                        format!(
                            "Configured Cedar schema file not found: {}",
                            schema_file.display()
                        ),
                    ));
                }
            }
        }

        let path = doc.id.to_file_path()?;
        let mut dir = path.parent();
        while let Some(current) = dir {
            let candidates = schema_candidates(current).await;
            if let Some(first) = candidates.first() {
                if candidates.len() > 1 {
                    diagnostics.push(Diagnostic::info(
                        Span::default(),
                        format!(
                            "Multiple Cedar schema files found in {}, using {}",
                            current.display(),
                            first.display()
                        ),
                    ));
                }
                return self.open_path(first).await;
            }

            if settings
                .workspace_root
                .as_deref()
                .is_some_and(|root| root == current)
            {
                break;
            }
            dir = current.parent();
        }

        debug!("No schema found for {}", doc.id);
        None
    }
}

/// Lists schema files directly inside `dir`, sorted by path.
async fn schema_candidates(dir: &Path) -> Vec<PathBuf> {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return Vec::new();
    };
    let mut candidates = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !is_schema_file(&path) {
            continue;
        }
        if tokio::fs::metadata(&path)
            .await
            .is_ok_and(|metadata| metadata.is_file())
        {
            candidates.push(path);
        }
    }
    candidates.sort();
    candidates
}
