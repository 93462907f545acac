//! `workspace/executeCommand` handler.

use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::ExecuteCommandParams;
use tracing::{debug, info};

use cedarlint_core::{
    DiagnosticsSink, DocumentId, DocumentStore, SCHEMA_NOT_FOUND_MESSAGE, SchemaResolver,
    TextDocument, schema_to_json,
};

use crate::state::SharedState;

pub const COMMAND_VALIDATE: &str = "cedar.validate";
pub const COMMAND_SCHEMA_VALIDATE: &str = "cedar.schemavalidate";
pub const COMMAND_ENTITIES_VALIDATE: &str = "cedar.entitiesvalidate";
pub const COMMAND_SCHEMA_EXPORT: &str = "cedar.schemaexport";
pub const COMMAND_SCHEMA_OPEN: &str = "cedar.schemaopen";
pub const COMMAND_CLEAR_PROBLEMS: &str = "cedar.clearproblems";

/// Commands advertised in the server capabilities.
pub const COMMANDS: &[&str] = &[
    COMMAND_VALIDATE,
    COMMAND_SCHEMA_VALIDATE,
    COMMAND_ENTITIES_VALIDATE,
    COMMAND_SCHEMA_EXPORT,
    COMMAND_SCHEMA_OPEN,
    COMMAND_CLEAR_PROBLEMS,
];

/// Handles the `workspace/executeCommand` request.
///
/// Document commands take the document URI as their first argument.
pub async fn handle_execute_command(
    state: &SharedState,
    params: ExecuteCommandParams,
) -> Result<Option<Value>> {
    debug!("Execute command: {}", params.command);

    match params.command.as_str() {
        COMMAND_VALIDATE => {
            let doc = document_argument(state, &params.arguments).await?;
            let valid = state.validator.validate_document(&doc, true).await;
            Ok(valid.map(Value::Bool))
        }
        COMMAND_SCHEMA_VALIDATE => {
            let doc = document_argument(state, &params.arguments).await?;
            let valid = state.validator.validate_schema(&doc, true).await;
            Ok(Some(Value::Bool(valid)))
        }
        COMMAND_ENTITIES_VALIDATE => {
            let doc = document_argument(state, &params.arguments).await?;
            let valid = state.validator.validate_entities(&doc, true).await;
            Ok(Some(Value::Bool(valid)))
        }
        COMMAND_SCHEMA_EXPORT => {
            let doc = document_argument(state, &params.arguments).await?;
            match schema_to_json(&doc.text) {
                Ok(json) => Ok(Some(Value::String(json))),
                Err(e) => {
                    state.sink.show_error(&e.to_string()).await;
                    Ok(None)
                }
            }
        }
        COMMAND_SCHEMA_OPEN => {
            let doc = document_argument(state, &params.arguments).await?;
            let mut diagnostics = Vec::new();
            match state.resolver.resolve(&doc, &mut diagnostics).await {
                Some(schema) => Ok(Some(Value::String(schema.id.to_string()))),
                None => {
                    state.sink.show_error(SCHEMA_NOT_FOUND_MESSAGE).await;
                    Ok(None)
                }
            }
        }
        COMMAND_CLEAR_PROBLEMS => {
            info!("Clearing all Cedar problems");
            state.validator.clear_cache();
            state.sink.clear_all().await;
            Ok(None)
        }
        other => Err(Error::invalid_params(format!("Unknown command: {}", other))),
    }
}

async fn document_argument(state: &SharedState, arguments: &[Value]) -> Result<TextDocument> {
    let uri = arguments
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_params("Expected a document URI argument"))?;
    let id = DocumentId::new(uri);
    state
        .documents
        .open(&id)
        .await
        .ok_or_else(|| Error::invalid_params(format!("Cannot open document: {}", id)))
}
