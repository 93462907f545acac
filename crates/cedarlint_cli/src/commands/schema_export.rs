//! Schema export command implementation

use std::path::Path;

use cedarlint_core::schema_to_json;
use miette::{IntoDiagnostic, Result, WrapErr};

pub fn run_schema_export(file: &Path) -> Result<()> {
    let schema = std::fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let json = schema_to_json(&schema).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}
