//! JSON output formatter

use cedarlint_core::line_col;
use miette::{IntoDiagnostic, Result};

use super::CheckResult;

pub fn output_json(results: &[CheckResult]) -> Result<()> {
    let output: Vec<_> = results
        .iter()
        .map(|r| {
            let diagnostics: Vec<_> = r
                .diagnostics
                .iter()
                .map(|d| {
                    let (line, column) = line_col(&r.text, d.span.start as usize);
                    serde_json::json!({
                        "line": line,
                        "column": column,
                        "span": d.span,
                        "severity": d.severity,
                        "message": d.message,
                        "code": d.code,
                    })
                })
                .collect();
            serde_json::json!({
                "path": r.path.display().to_string(),
                "valid": !r.has_errors(),
                "diagnostics": diagnostics,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
