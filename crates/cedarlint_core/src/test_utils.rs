//! In-memory fakes for exercising the validator without an editor or the
//! Cedar engine.
//!
//! [`RecordingEngine`] understands a few markers so tests can script outcomes:
//! `!syntax`, `!schema`, `!policy` and `!entities` make the matching check
//! fail, and a policy referencing `Type::` fails unless the schema declares
//! `entity Type`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::{EngineError, ValidationEngine, ValidationOutcome};
use crate::{
    Diagnostic, DiagnosticsSink, DocumentId, DocumentStore, SchemaResolver, Span, TextDocument,
    Validator,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Syntax(String),
    Schema(String),
    Policy { schema: String, policy: String },
    Entities { entities: String, schema: String },
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }
}

fn marker_error(text: &str, marker: &str) -> Option<EngineError> {
    let offset = text.find(marker)?;
    let start = offset as u32;
    Some(
        EngineError::new(format!("unexpected `{}`", marker))
            .with_span(Span::new(start, start + marker.len() as u32)),
    )
}

/// Entity type references (`Type::`) in a policy, with their offsets.
fn type_references(policy: &str) -> Vec<(usize, &str)> {
    let bytes = policy.as_bytes();
    let mut references = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_alphabetic() && (i == 0 || !bytes[i - 1].is_ascii_alphanumeric()) {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                i += 1;
            }
            if policy[i..].starts_with("::") && &policy[start..i] != "Action" {
                references.push((start, &policy[start..i]));
            }
        } else {
            i += 1;
        }
    }
    references
}

impl ValidationEngine for RecordingEngine {
    fn validate_syntax(&self, policies: &str) -> ValidationOutcome {
        self.record(EngineCall::Syntax(policies.to_string()));
        match marker_error(policies, "!syntax") {
            Some(error) => ValidationOutcome::failure(vec![error]),
            None => ValidationOutcome::success(),
        }
    }

    fn validate_schema(&self, schema: &str) -> ValidationOutcome {
        self.record(EngineCall::Schema(schema.to_string()));
        if schema.contains("!schema") {
            ValidationOutcome::failure(vec![EngineError::new("invalid schema")])
        } else {
            ValidationOutcome::success()
        }
    }

    fn validate_policy(&self, schema: &str, policy: &str) -> ValidationOutcome {
        self.record(EngineCall::Policy {
            schema: schema.to_string(),
            policy: policy.to_string(),
        });
        if policy.contains("!policy") {
            return ValidationOutcome::failure(vec![EngineError::new("policy rejected")]);
        }
        let errors: Vec<EngineError> = type_references(policy)
            .into_iter()
            .filter(|(_, name)| !schema.contains(&format!("entity {}", name)))
            .map(|(offset, name)| {
                let start = offset as u32;
                EngineError::new(format!("unrecognized entity type `{}`", name))
                    .with_span(Span::new(start, start + name.len() as u32))
            })
            .collect();
        if errors.is_empty() {
            ValidationOutcome::success()
        } else {
            ValidationOutcome::failure(errors)
        }
    }

    fn validate_entities(&self, entities: &str, schema: &str) -> ValidationOutcome {
        self.record(EngineCall::Entities {
            entities: entities.to_string(),
            schema: schema.to_string(),
        });
        if entities.contains("!entities") {
            ValidationOutcome::failure(vec![EngineError::new("entity does not conform to schema")])
        } else {
            ValidationOutcome::success()
        }
    }
}

/// Editor buffers held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<DocumentId, TextDocument>>,
}

impl MemoryStore {
    pub fn insert(&self, doc: TextDocument) {
        self.docs.lock().insert(doc.id.clone(), doc);
    }

    /// Replaces the text of an open document and bumps its version.
    pub fn edit(&self, id: &DocumentId, text: &str) -> TextDocument {
        let mut docs = self.docs.lock();
        let doc = docs.get_mut(id).expect("document is open");
        doc.version += 1;
        doc.text = text.to_string();
        doc.clone()
    }

    pub fn remove(&self, id: &DocumentId) {
        self.docs.lock().remove(id);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn open(&self, id: &DocumentId) -> Option<TextDocument> {
        self.docs.lock().get(id).cloned()
    }

    fn current_version(&self, id: &DocumentId) -> Option<i32> {
        self.docs.lock().get(id).map(|doc| doc.version)
    }
}

/// Resolves schemas from an explicit document-to-schema map.
pub struct FixedResolver {
    store: Arc<MemoryStore>,
    schemas: Mutex<HashMap<DocumentId, DocumentId>>,
}

impl FixedResolver {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            schemas: Mutex::new(HashMap::new()),
        }
    }

    pub fn set(&self, doc: DocumentId, schema: DocumentId) {
        self.schemas.lock().insert(doc, schema);
    }
}

#[async_trait]
impl SchemaResolver for FixedResolver {
    async fn resolve(
        &self,
        doc: &TextDocument,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<TextDocument> {
        let schema = self.schemas.lock().get(&doc.id).cloned()?;
        self.store.open(&schema).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Set(DocumentId, usize),
    Delete(DocumentId),
    ShowError(String),
}

/// Keeps the latest published diagnostics and a log of every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    published: Mutex<HashMap<DocumentId, Vec<Diagnostic>>>,
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn diagnostics(&self, id: &DocumentId) -> Option<Vec<Diagnostic>> {
        self.published.lock().get(id).cloned()
    }

    pub fn set_count(&self, id: &DocumentId) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Set(target, _) if target == id))
            .count()
    }

    pub fn deleted(&self, id: &DocumentId) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Delete(target) if target == id))
            .count()
    }

    pub fn errors_shown(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::ShowError(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

#[async_trait]
impl DiagnosticsSink for RecordingSink {
    async fn set(&self, id: &DocumentId, diagnostics: Vec<Diagnostic>) {
        self.events
            .lock()
            .push(SinkEvent::Set(id.clone(), diagnostics.len()));
        self.published.lock().insert(id.clone(), diagnostics);
    }

    async fn delete(&self, id: &DocumentId) {
        self.events.lock().push(SinkEvent::Delete(id.clone()));
        self.published.lock().remove(id);
    }

    async fn show_error(&self, message: &str) {
        self.events
            .lock()
            .push(SinkEvent::ShowError(message.to_string()));
    }
}

/// A validator wired to fakes.
pub struct Harness {
    pub validator: Validator,
    pub engine: Arc<RecordingEngine>,
    pub store: Arc<MemoryStore>,
    pub resolver: Arc<FixedResolver>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        let engine = Arc::new(RecordingEngine::default());
        let store = Arc::new(MemoryStore::default());
        let resolver = Arc::new(FixedResolver::new(store.clone()));
        let sink = Arc::new(RecordingSink::default());
        let validator = Validator::new(
            engine.clone(),
            store.clone(),
            resolver.clone(),
            sink.clone(),
        );
        Self {
            validator,
            engine,
            store,
            resolver,
            sink,
        }
    }

    /// Opens a document at version 1.
    pub fn open(&self, uri: &str, text: &str) -> TextDocument {
        let doc = TextDocument::new(DocumentId::new(uri), 1, text);
        self.store.insert(doc.clone());
        doc
    }

    /// Makes `doc` resolve to `schema`.
    pub fn use_schema(&self, doc: &DocumentId, schema: DocumentId) {
        self.resolver.set(doc.clone(), schema);
    }
}
