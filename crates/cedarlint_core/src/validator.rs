//! Incremental validation of Cedar documents.
//!
//! [`Validator`] runs the check that matches a document's kind, skips
//! documents whose version was already checked, remembers which schema each
//! policy and entities document was checked against, and pushes those
//! documents back through validation when their schema validates again.

use std::collections::HashSet;
use std::sync::Arc;

use cedarlint_cache::{CacheEntry, ValidationCache};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::clauses::{PolicyClause, policy_clauses};
use crate::diagnostic::report_formatter_off;
use crate::engine::EngineError;
use crate::propagation::RevalidationQueue;
use crate::{
    Diagnostic, DiagnosticsSink, DocumentId, DocumentKind, DocumentStore, SchemaResolver, Span,
    TextDocument, ValidationEngine, classify_document,
};

/// Shown when a user asks to validate a document that has no schema.
pub const SCHEMA_NOT_FOUND_MESSAGE: &str =
    "Cedar schema file not found or configured in .cedarlint.json";

/// Orchestrates validation of policy, schema and entities documents.
pub struct Validator {
    engine: Arc<dyn ValidationEngine>,
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn SchemaResolver>,
    sink: Arc<dyn DiagnosticsSink>,
    /// Never locked across an `.await`.
    cache: Mutex<ValidationCache<DocumentId>>,
    queue: RevalidationQueue,
}

impl Validator {
    pub fn new(
        engine: Arc<dyn ValidationEngine>,
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn SchemaResolver>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            engine,
            store,
            resolver,
            sink,
            cache: Mutex::new(ValidationCache::new()),
            queue: RevalidationQueue::new(),
        }
    }

    /// Enables or disables the result cache.
    pub fn set_cache_enabled(&self, enabled: bool) {
        let mut cache = self.cache.lock();
        if enabled {
            cache.enable();
        } else {
            cache.disable();
        }
    }

    /// Forgets every cached outcome, schema association and pending revalidation.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        self.queue.clear();
    }

    /// Forgets the cached outcome of one document.
    pub fn forget(&self, id: &DocumentId) {
        self.cache.lock().remove(id);
    }

    /// Returns the cached outcome of `id` at `version`, if any.
    pub fn cached(&self, id: &DocumentId, version: i32) -> Option<CacheEntry> {
        self.cache.lock().check(id, version)
    }

    /// Returns the documents last validated against `schema`.
    pub fn dependents_of(&self, schema: &DocumentId) -> HashSet<DocumentId> {
        self.cache.lock().dependencies().dependents_of(schema)
    }

    /// Returns the number of documents waiting to be revalidated.
    pub fn pending_revalidations(&self) -> usize {
        self.queue.len()
    }

    /// Opens `id` from the store and validates it.
    pub async fn validate_id(&self, id: &DocumentId, user_initiated: bool) -> Option<bool> {
        let doc = self.store.open(id).await?;
        self.validate_document(&doc, user_initiated).await
    }

    /// Validates `doc` according to its kind.
    ///
    /// Returns `None` for documents that are not validated at all.
    pub async fn validate_document(&self, doc: &TextDocument, user_initiated: bool) -> Option<bool> {
        self.dispatch(doc, user_initiated, true).await
    }

    /// Validates a policy document.
    ///
    /// The result only reflects the syntax check: policies that parse but fail
    /// schema validation get diagnostics and still return `true`.
    pub async fn validate_policy(&self, doc: &TextDocument, user_initiated: bool) -> bool {
        self.check_policy(doc, user_initiated, true).await
    }

    /// Validates a schema document, and on success pushes every document that
    /// depends on it back through validation.
    pub async fn validate_schema(&self, doc: &TextDocument, user_initiated: bool) -> bool {
        self.check_schema(doc, user_initiated, true).await
    }

    /// Validates an entities document against its schema.
    pub async fn validate_entities(&self, doc: &TextDocument, user_initiated: bool) -> bool {
        self.check_entities(doc, user_initiated, true).await
    }

    /// Revalidates every queued document. Returns how many were validated.
    ///
    /// Schemas checked on the way do not queue their dependents again.
    pub async fn run_pending(&self) -> usize {
        let mut validated = 0;
        while let Some(id) = self.queue.pop() {
            match self.store.open(&id).await {
                Some(doc) => {
                    self.dispatch(&doc, false, false).await;
                    validated += 1;
                }
                None => debug!("Dependent document is no longer available: {}", id),
            }
        }
        validated
    }

    /// Waits until documents are queued for revalidation.
    pub async fn revalidation_requested(&self) {
        self.queue.notified().await;
    }

    /// `propagate` decides whether a schema that validates queues its dependents.
    async fn dispatch(
        &self,
        doc: &TextDocument,
        user_initiated: bool,
        propagate: bool,
    ) -> Option<bool> {
        match classify_document(doc) {
            DocumentKind::Policy => Some(self.check_policy(doc, user_initiated, propagate).await),
            DocumentKind::Schema => Some(self.check_schema(doc, user_initiated, propagate).await),
            DocumentKind::Entities => {
                Some(self.check_entities(doc, user_initiated, propagate).await)
            }
            DocumentKind::Unsupported => {
                debug!("Skipping validation for unsupported document: {}", doc.id);
                None
            }
        }
    }

    async fn check_policy(&self, doc: &TextDocument, user_initiated: bool, propagate: bool) -> bool {
        if let Some(valid) = self.cached_outcome(doc, user_initiated) {
            return valid;
        }
        debug!("Validating policy document: {}", doc.id);

        let mut diagnostics = Vec::new();
        report_formatter_off(&doc.text, &mut diagnostics);

        let syntax = self.engine.validate_syntax(&doc.text);
        let success = syntax.success;
        if !syntax.success {
            diagnostics.extend(
                syntax
                    .errors
                    .iter()
                    .map(|e| to_diagnostic(e, 0, Span::default())),
            );
        } else if let Some(schema) = self.resolver.resolve(doc, &mut diagnostics).await
            && self.check_schema(&schema, user_initiated, propagate).await
        {
            self.cache.lock().associate(schema.id.clone(), doc.id.clone());
            for clause in policy_clauses(&doc.text) {
                self.check_clause(&schema, &clause, &mut diagnostics);
            }
        }
        drop(syntax);

        self.commit(doc, diagnostics, success).await;
        success
    }

    fn check_clause(
        &self,
        schema: &TextDocument,
        clause: &PolicyClause<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let outcome = self.engine.validate_policy(&schema.text, clause.text);
        if outcome.success {
            return;
        }
        let fallback = clause.effect_span.unwrap_or(clause.span);
        diagnostics.extend(
            outcome
                .errors
                .iter()
                .map(|e| to_diagnostic(e, clause.span.start, fallback)),
        );
    }

    async fn check_schema(&self, doc: &TextDocument, user_initiated: bool, propagate: bool) -> bool {
        if let Some(valid) = self.cached_outcome(doc, user_initiated) {
            return valid;
        }
        debug!("Validating schema document: {}", doc.id);

        let outcome = self.engine.validate_schema(&doc.text);
        let success = outcome.success;
        let diagnostics: Vec<Diagnostic> = outcome
            .errors
            .iter()
            .map(|e| to_diagnostic(e, 0, Span::default()))
            .collect();
        drop(outcome);

        if !self.store_outcome(doc, success) {
            return success;
        }

        if success {
            self.sink.delete(&doc.id).await;
            if propagate {
                self.propagate(&doc.id);
            }
        } else {
            self.sink.set(&doc.id, diagnostics).await;
        }
        success
    }

    async fn check_entities(
        &self,
        doc: &TextDocument,
        user_initiated: bool,
        propagate: bool,
    ) -> bool {
        if let Some(valid) = self.cached_outcome(doc, user_initiated) {
            return valid;
        }
        debug!("Validating entities document: {}", doc.id);

        let mut success = false;
        let mut diagnostics = Vec::new();

        match self.resolver.resolve(doc, &mut diagnostics).await {
            Some(schema) => {
                if self.check_schema(&schema, user_initiated, propagate).await {
                    self.cache.lock().associate(schema.id.clone(), doc.id.clone());

                    let outcome = self.engine.validate_entities(&doc.text, &schema.text);
                    success = outcome.success;
                    if !outcome.success {
                        diagnostics.extend(
                            outcome
                                .errors
                                .iter()
                                .map(|e| to_diagnostic(e, 0, Span::default())),
                        );
                    }
                }
            }
            None => {
                if user_initiated {
                    self.sink.show_error(SCHEMA_NOT_FOUND_MESSAGE).await;
                }
            }
        }

        self.commit(doc, diagnostics, success).await;
        success
    }

    fn cached_outcome(&self, doc: &TextDocument, user_initiated: bool) -> Option<bool> {
        if user_initiated {
            return None;
        }
        let entry = self.cache.lock().check(&doc.id, doc.version)?;
        debug!("Using cached result for {} (version {})", doc.id, doc.version);
        Some(entry.valid)
    }

    /// Records the outcome unless a newer version of the document exists.
    ///
    /// Returns false when the result is stale and must not be published.
    fn store_outcome(&self, doc: &TextDocument, success: bool) -> bool {
        let current = self.store.current_version(&doc.id);
        if current.is_some_and(|current| current > doc.version) {
            debug!(
                "Discarding stale result for {} (version {} < {:?})",
                doc.id, doc.version, current
            );
            return false;
        }
        self.cache.lock().store(doc.id.clone(), doc.version, success);
        true
    }

    async fn commit(&self, doc: &TextDocument, diagnostics: Vec<Diagnostic>, success: bool) {
        if self.store_outcome(doc, success) {
            self.sink.set(&doc.id, diagnostics).await;
        }
    }

    fn propagate(&self, schema: &DocumentId) {
        let dependents = self.cache.lock().invalidate_dependents(schema);
        if dependents.is_empty() {
            return;
        }
        info!(
            "Schema {} changed, revalidating {} dependent documents",
            schema,
            dependents.len()
        );
        self.queue.push(dependents);
    }
}

/// Positions an engine error in the document.
///
/// Engine spans are relative to the checked text, which starts at `base`.
fn to_diagnostic(error: &EngineError, base: u32, fallback: Span) -> Diagnostic {
    let span = error.span.map(|span| span.shift(base)).unwrap_or(fallback);
    let diagnostic = Diagnostic::error(span, error.full_message());
    match &error.code {
        Some(code) => diagnostic.with_code(code.clone()),
        None => diagnostic,
    }
}
