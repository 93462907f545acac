//! # cedarlint_core
//!
//! Incremental validation of Cedar documents.
//!
//! This crate provides:
//! - The `Validator` orchestrator for policy, schema and entities documents
//! - Document classification and schema resolution
//! - Propagation of schema changes to the documents that depend on them
//! - Configuration loading
//!
//! Editors and other hosts plug in through three traits: [`DocumentStore`]
//! supplies document snapshots, [`DiagnosticsSink`] receives the results, and
//! [`SchemaResolver`] finds the schema a document is checked against.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cedarlint_core::{CedarEngine, FileSystemStore, Validator, WorkspaceSchemaResolver};
//!
//! let store = Arc::new(FileSystemStore::new());
//! let resolver = Arc::new(WorkspaceSchemaResolver::new(store.clone()));
//! let validator = Validator::new(Arc::new(CedarEngine::new()), store, resolver, sink);
//!
//! let valid = validator.validate_id(&id, true).await;
//! ```

pub mod classifier;
pub mod clauses;
mod config;
mod diagnostic;
mod document;
pub mod engine;
mod error;
mod propagation;
mod resolver;
mod validator;

pub use classifier::{DocumentKind, classify, classify_document, is_entities_file, is_schema_file};
pub use clauses::{PolicyClause, policy_clauses};
pub use config::CedarLintConfig;
pub use diagnostic::{
    DIAGNOSTIC_SOURCE, Diagnostic, DiagnosticsSink, FORMATTER_OFF_MARKER, Severity, Span, line_col,
};
pub use document::{DocumentId, DocumentStore, FileSystemStore, TextDocument, read_file_document};
pub use engine::{CedarEngine, EngineError, ValidationEngine, ValidationOutcome, schema_to_json};
pub use error::CedarLintError;
pub use propagation::RevalidationQueue;
pub use resolver::{SchemaResolver, WorkspaceSchemaResolver};
pub use validator::{SCHEMA_NOT_FOUND_MESSAGE, Validator};

#[cfg(test)]
pub mod test_utils;

pub use cedarlint_cache::{CacheEntry, ValidationCache};
