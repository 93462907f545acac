//! Initialize and shutdown handlers.

use std::sync::atomic::Ordering;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::{error, info};

use crate::config::reload_config;
use crate::handler::commands::COMMANDS;
use crate::state::SharedState;

/// Handles the `initialize` LSP request.
pub async fn handle_initialize(
    state: &SharedState,
    params: InitializeParams,
) -> Result<InitializeResult> {
    info!("CedarLint LSP server initializing...");

    let root = params.root_uri.and_then(|u| u.to_file_path().ok());
    match state.workspace_root.write() {
        Ok(mut current) => *current = root.clone(),
        Err(e) => {
            error!("Workspace root lock poisoned: {}", e);
            return Ok(InitializeResult::default());
        }
    }
    state.resolver.set_workspace_root(root);

    reload_config(state);

    Ok(InitializeResult {
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                },
            )),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
                work_done_progress_options: Default::default(),
            }),
            ..Default::default()
        },
        server_info: Some(ServerInfo {
            name: "cedarlint-lsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

/// Handles the `initialized` LSP notification.
///
/// Starts the task that revalidates dependents after a schema change.
pub async fn handle_initialized(state: &SharedState, client: &tower_lsp::Client) {
    if !state.revalidation_started.swap(true, Ordering::SeqCst) {
        let validator = state.validator.clone();
        tokio::spawn(async move {
            loop {
                validator.revalidation_requested().await;
                validator.run_pending().await;
            }
        });
    }

    client
        .log_message(MessageType::INFO, "CedarLint LSP server initialized!")
        .await;
}

/// Handles the `shutdown` LSP request.
pub async fn handle_shutdown() -> Result<()> {
    info!("CedarLint LSP server shutting down...");
    Ok(())
}
