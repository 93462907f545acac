//! CedarLint LSP Server
//!
//! Language Server Protocol implementation for CedarLint.
//! Validates Cedar policies, schemas and entities while they are edited.

mod config;
mod conversion;
mod debounce;
mod handler;
mod sink;
mod state;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info};

use cedarlint_core::{CedarEngine, CedarLintConfig, DocumentId, Validator, WorkspaceSchemaResolver};

pub use conversion::{offset_to_position, offset_to_range, to_lsp_diagnostic};
pub use handler::commands::COMMANDS;

use crate::debounce::spawn_debounced_validation;
use crate::sink::ClientSink;
use crate::state::{BackendState, DocumentBuffers, SharedState};

/// The LSP backend for CedarLint.
#[derive(Clone)]
pub struct Backend {
    /// LSP client for sending notifications.
    client: Client,
    /// Shared state
    state: SharedState,
}

impl Backend {
    /// Creates a new backend with the given client.
    pub fn new(client: Client) -> Self {
        let documents = Arc::new(DocumentBuffers::default());
        let resolver = Arc::new(WorkspaceSchemaResolver::new(documents.clone()));
        let sink = Arc::new(ClientSink::new(client.clone(), documents.clone()));
        let validator = Arc::new(Validator::new(
            Arc::new(CedarEngine::new()),
            documents.clone(),
            resolver.clone(),
            sink.clone(),
        ));

        Self {
            client,
            state: Arc::new(BackendState {
                documents,
                validator,
                resolver,
                sink,
                workspace_root: RwLock::new(None::<PathBuf>),
                config: RwLock::new(CedarLintConfig::default()),
                revalidation_started: AtomicBool::new(false),
            }),
        }
    }

    /// Validates the buffered content of a document.
    async fn validate(&self, id: &DocumentId) {
        if let Some(doc) = self.state.documents.snapshot(id) {
            self.state.validator.validate_document(&doc, false).await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handler::handle_initialize(&self.state, params).await
    }

    async fn initialized(&self, _: InitializedParams) {
        handler::handle_initialized(&self.state, &self.client).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handler::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let id = handler::handle_did_open(&self.state, params).await;
        self.validate(&id).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some((id, version)) = handler::handle_did_change(&self.state, params).await else {
            return;
        };

        let config = self.state.config();
        if !config.validate_on_change {
            debug!("Validation on change is disabled");
            return;
        }

        spawn_debounced_validation(
            self.state.clone(),
            id,
            version,
            Duration::from_millis(config.debounce_ms),
        );
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let id = handler::handle_did_save(&self.state, params).await;
        self.validate(&id).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handler::handle_did_close(&self.state, params).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let changes = handler::handle_did_change_watched_files(&self.state, params).await;

        if changes.config_reloaded {
            for id in self.state.documents.ids() {
                self.validate(&id).await;
            }
        }
        for id in changes.schemas {
            self.state.validator.validate_id(&id, false).await;
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        handler::handle_execute_command(&self.state, params).await
    }
}

/// Starts the LSP server.
///
/// This function does not return unless an error occurs or the server shuts down.
pub async fn run() {
    info!("CedarLint LSP server starting...");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
