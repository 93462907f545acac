//! Text output formatter

use cedarlint_core::{Severity, line_col};

use super::CheckResult;

pub fn output_text(results: &[CheckResult]) {
    for result in results {
        if result.diagnostics.is_empty() && result.valid {
            continue;
        }

        println!("\n{}:", result.path.display());
        if result.diagnostics.is_empty() {
            println!("  invalid: no valid schema found");
        }
        for diag in &result.diagnostics {
            let severity = match diag.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "info",
            };
            let (line, col) = line_col(&result.text, diag.span.start as usize);
            match &diag.code {
                Some(code) => println!("  {}:{} {} [{}]: {}", line, col, severity, code, diag.message),
                None => println!("  {}:{} {}: {}", line, col, severity, diag.message),
            }
        }
    }

    let total_files = results.len();
    let total_issues: usize = results.iter().map(|r| r.diagnostics.len()).sum();
    let invalid = results.iter().filter(|r| r.has_errors()).count();

    println!();
    println!(
        "Checked {} files ({} invalid), found {} issues",
        total_files, invalid, total_issues
    );
}
