//! Validation engine.
//!
//! The orchestration in [`crate::Validator`] only needs a success flag and a
//! list of positioned errors from each check. [`ValidationEngine`] is that
//! seam; [`CedarEngine`] implements it with the `cedar-policy` crate.

use std::str::FromStr;

use cedar_policy::{Entities, PolicySet, Schema, SchemaFragment, ValidationMode, Validator};
use miette::Diagnostic as MietteDiagnostic;
use tracing::warn;

use crate::{CedarLintError, Span};

/// One error reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub message: String,
    /// Location relative to the validated text, when the engine knows it.
    pub span: Option<Span>,
    pub help: Option<String>,
    pub code: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            help: None,
            code: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Message with the help text appended, as shown to users.
    pub fn full_message(&self) -> String {
        match &self.help {
            Some(help) => format!("{}\n{}", self.message, help),
            None => self.message.clone(),
        }
    }
}

/// Result of one engine call. Owns all of its data, so releasing it is
/// simply dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    pub success: bool,
    pub errors: Vec<EngineError>,
}

impl ValidationOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<EngineError>) -> Self {
        Self {
            success: false,
            errors,
        }
    }
}

/// The four checks the validator delegates.
pub trait ValidationEngine: Send + Sync {
    /// Parses a policy document.
    fn validate_syntax(&self, policies: &str) -> ValidationOutcome;

    /// Parses and checks a schema in Cedar or JSON syntax.
    fn validate_schema(&self, schema: &str) -> ValidationOutcome;

    /// Type-checks a single policy against a schema.
    fn validate_policy(&self, schema: &str, policy: &str) -> ValidationOutcome;

    /// Checks entity data against a schema.
    fn validate_entities(&self, entities: &str, schema: &str) -> ValidationOutcome;
}

/// [`ValidationEngine`] backed by `cedar-policy`.
#[derive(Debug, Default, Clone)]
pub struct CedarEngine;

impl CedarEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationEngine for CedarEngine {
    fn validate_syntax(&self, policies: &str) -> ValidationOutcome {
        match PolicySet::from_str(policies) {
            Ok(_) => ValidationOutcome::success(),
            Err(e) => ValidationOutcome::failure(collect_errors(&e)),
        }
    }

    fn validate_schema(&self, schema: &str) -> ValidationOutcome {
        match parse_schema(schema) {
            Ok(_) => ValidationOutcome::success(),
            Err(errors) => ValidationOutcome::failure(errors),
        }
    }

    fn validate_policy(&self, schema: &str, policy: &str) -> ValidationOutcome {
        let schema = match parse_schema(schema) {
            Ok(schema) => schema,
            Err(errors) => return ValidationOutcome::failure(errors),
        };
        let policy_set = match PolicySet::from_str(policy) {
            Ok(policy_set) => policy_set,
            Err(e) => return ValidationOutcome::failure(collect_errors(&e)),
        };

        let result = Validator::new(schema).validate(&policy_set, ValidationMode::Strict);
        if result.validation_passed() {
            return ValidationOutcome::success();
        }

        let errors = result
            .validation_errors()
            .flat_map(|e| collect_errors(e))
            .collect();
        ValidationOutcome::failure(errors)
    }

    fn validate_entities(&self, entities: &str, schema: &str) -> ValidationOutcome {
        let schema = match parse_schema(schema) {
            Ok(schema) => schema,
            Err(errors) => return ValidationOutcome::failure(errors),
        };
        match Entities::from_json_str(entities, Some(&schema)) {
            Ok(_) => ValidationOutcome::success(),
            Err(e) => ValidationOutcome::failure(collect_errors(&e)),
        }
    }
}

/// Returns true if the schema text is in JSON syntax.
pub fn is_json_schema(schema: &str) -> bool {
    schema.trim_start().starts_with('{')
}

fn parse_schema(schema: &str) -> Result<Schema, Vec<EngineError>> {
    if is_json_schema(schema) {
        return Schema::from_json_str(schema).map_err(|e| collect_errors(&e));
    }

    let (schema, warnings) = Schema::from_cedarschema_str(schema).map_err(|e| collect_errors(&e))?;
    for warning in warnings {
        warn!(%warning, "Cedar schema warning");
    }
    Ok(schema)
}

/// Translates a schema in Cedar syntax to pretty-printed JSON syntax.
pub fn schema_to_json(schema: &str) -> Result<String, CedarLintError> {
    if is_json_schema(schema) {
        return Err(CedarLintError::schema("schema is already in JSON syntax"));
    }
    let (fragment, _) = SchemaFragment::from_cedarschema_str(schema)
        .map_err(|e| CedarLintError::schema(e.to_string()))?;
    let value = fragment
        .to_json_value()
        .map_err(|e| CedarLintError::schema(e.to_string()))?;
    serde_json::to_string_pretty(&value).map_err(|e| CedarLintError::schema(e.to_string()))
}

/// Flattens a miette diagnostic and its related diagnostics into engine errors.
fn collect_errors(diagnostic: &dyn MietteDiagnostic) -> Vec<EngineError> {
    let mut errors = vec![to_engine_error(diagnostic)];
    if let Some(related) = diagnostic.related() {
        for related in related {
            errors.extend(collect_errors(related));
        }
    }
    errors
}

fn to_engine_error(diagnostic: &dyn MietteDiagnostic) -> EngineError {
    let span = diagnostic.labels().and_then(|mut labels| {
        labels.next().map(|label| {
            let start = label.offset() as u32;
            Span::new(start, start + label.len() as u32)
        })
    });

    EngineError {
        message: diagnostic.to_string(),
        span,
        help: diagnostic.help().map(|help| help.to_string()),
        code: diagnostic.code().map(|code| code.to_string()),
    }
}
