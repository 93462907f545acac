//! Diagnostic types and the host-side diagnostics sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::DocumentId;

/// Source of every diagnostic produced by CedarLint.
pub const DIAGNOSTIC_SOURCE: &str = "cedar";

/// Marker comment that disables the Cedar formatter for a document.
pub const FORMATTER_OFF_MARKER: &str = "@formatter:off";

/// A byte range in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Moves the span forward by `offset` bytes.
    #[inline]
    pub const fn shift(&self, offset: u32) -> Span {
        Span::new(self.start + offset, self.end + offset)
    }
}

/// Severity level for diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

/// A problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Byte span in the document.
    pub span: Span,
    pub severity: Severity,
    pub message: String,
    /// Optional machine-readable code (e.g. the Cedar error code).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(span: Span, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            span,
            severity,
            message: message.into(),
            code: None,
        }
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, Severity::Error, message)
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, Severity::Warning, message)
    }

    pub fn info(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, Severity::Info, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Where validation results are published.
///
/// `set` replaces every diagnostic previously published for the document.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    async fn set(&self, id: &DocumentId, diagnostics: Vec<Diagnostic>);

    async fn delete(&self, id: &DocumentId);

    /// Shows a one-shot message to the user.
    async fn show_error(&self, message: &str);
}

/// Reports an info diagnostic on every line comment that disables the formatter.
pub fn report_formatter_off(text: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut line_start = 0usize;
    for line in text.split_inclusive('\n') {
        if let Some(comment) = line.find("//")
            && let Some(marker) = line[comment..].find(FORMATTER_OFF_MARKER)
        {
            let start = line_start + comment + marker;
            let end = start + FORMATTER_OFF_MARKER.len();
            diagnostics.push(Diagnostic::info(
                Span::new(start as u32, end as u32),
                "Cedar formatter is disabled for this document",
            ));
        }
        line_start += line.len();
    }
}

/// Converts a byte offset into a 1-based line and 1-based character column.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in text.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
