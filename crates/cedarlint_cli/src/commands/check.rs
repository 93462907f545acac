//! Check command implementation

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use cedarlint_core::{
    CedarEngine, CedarLintConfig, Diagnostic, DiagnosticsSink, DocumentId, FileSystemStore,
    Validator, WorkspaceSchemaResolver, read_file_document,
};

use crate::cli::{Cli, OutputFormat};
use crate::output::{CheckResult, output_results};
use crate::utils::create_tokio_runtime;

/// Keeps the latest diagnostics published for every document.
#[derive(Debug, Default)]
struct CollectingSink {
    published: Mutex<BTreeMap<DocumentId, Vec<Diagnostic>>>,
}

impl CollectingSink {
    fn published(&self) -> std::sync::MutexGuard<'_, BTreeMap<DocumentId, Vec<Diagnostic>>> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take(&self, id: &DocumentId) -> Vec<Diagnostic> {
        self.published().remove(id).unwrap_or_default()
    }

    fn take_all(&self) -> BTreeMap<DocumentId, Vec<Diagnostic>> {
        std::mem::take(&mut *self.published())
    }
}

#[async_trait]
impl DiagnosticsSink for CollectingSink {
    async fn set(&self, id: &DocumentId, diagnostics: Vec<Diagnostic>) {
        self.published().insert(id.clone(), diagnostics);
    }

    async fn delete(&self, id: &DocumentId) {
        self.published().remove(id);
    }

    async fn show_error(&self, message: &str) {
        warn!("{}", message);
    }
}

pub fn run_check(cli: &Cli, files: &[PathBuf], format: OutputFormat) -> Result<bool> {
    let config = if let Some(ref path) = cli.config {
        CedarLintConfig::from_file(path).into_diagnostic()?
    } else {
        find_config()?
    };

    let store = Arc::new(FileSystemStore::new());
    let resolver = Arc::new(WorkspaceSchemaResolver::new(store.clone()));
    resolver.apply_config(&config);
    resolver.set_workspace_root(std::env::current_dir().ok());
    let sink = Arc::new(CollectingSink::default());
    let validator = Validator::new(
        Arc::new(CedarEngine::new()),
        store,
        resolver,
        sink.clone(),
    );
    if cli.no_cache || !config.cache {
        validator.set_cache_enabled(false);
    }

    let runtime = create_tokio_runtime()?;
    let (results, failures) = runtime.block_on(async {
        let mut results = Vec::new();
        let mut failures = Vec::new();
        let mut requested = HashSet::new();

        for file in files {
            let id = std::path::absolute(file)
                .ok()
                .and_then(DocumentId::from_file_path);
            let Some(id) = id else {
                failures.push((file.clone(), "invalid path".to_string()));
                continue;
            };
            let Some(doc) = read_file_document(&id).await else {
                failures.push((file.clone(), "cannot read file".to_string()));
                continue;
            };

            match validator.validate_document(&doc, true).await {
                Some(valid) => {
                    requested.insert(id.clone());
                    results.push(CheckResult {
                        path: file.clone(),
                        valid,
                        diagnostics: sink.take(&id),
                        text: doc.text,
                    });
                }
                None => warn!("Skipping unsupported file: {}", file.display()),
            }
        }

        // Schemas resolved along the way that have problems of their own.
        for (id, diagnostics) in sink.take_all() {
            if requested.contains(&id) || diagnostics.is_empty() {
                continue;
            }
            let Some(doc) = read_file_document(&id).await else {
                continue;
            };
            results.push(CheckResult {
                path: doc.file_name(),
                valid: false,
                diagnostics,
                text: doc.text,
            });
        }

        (results, failures)
    });

    if !failures.is_empty() {
        eprintln!("\n{} file(s) failed to check:", failures.len());
        for (path, error) in &failures {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    let has_errors = output_results(&results, format)?;

    Ok(has_errors || !failures.is_empty())
}

pub fn find_config() -> Result<CedarLintConfig> {
    if let Some(path) = CedarLintConfig::discover(".") {
        info!("Using config: {}", path.display());
        return CedarLintConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(CedarLintConfig::new())
}
