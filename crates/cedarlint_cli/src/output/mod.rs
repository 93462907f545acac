//! Output formatting module

mod json;
mod text;

use std::path::PathBuf;

use miette::Result;
use cedarlint_core::{Diagnostic, Severity};

use crate::cli::OutputFormat;

/// Outcome of checking one file.
#[derive(Debug)]
pub struct CheckResult {
    pub path: PathBuf,
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Checked content, used to turn byte offsets into line and column.
    pub text: String,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        !self.valid
            || self
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error)
    }
}

pub fn output_results(results: &[CheckResult], format: OutputFormat) -> Result<bool> {
    let has_errors = results.iter().any(|r| r.has_errors());

    match format {
        OutputFormat::Json => json::output_json(results)?,
        OutputFormat::Text => text::output_text(results),
    }

    Ok(has_errors)
}
