//! CedarLint configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::CedarLintError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Configuration for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CedarLintConfig {
    /// Explicit schema file, relative to `base_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_file: Option<String>,

    /// Whether to enable the validation cache.
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Debounce delay for `didChange` validation.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Whether to validate while typing.
    #[serde(default = "default_validate_on_change")]
    pub validate_on_change: bool,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_cache() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_validate_on_change() -> bool {
    true
}

impl CedarLintConfig {
    /// Configuration file names, in lookup order.
    pub const CONFIG_FILES: &'static [&'static str] = &[".cedarlint.jsonc", ".cedarlint.json"];

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            schema_file: None,
            cache: default_cache(),
            debounce_ms: default_debounce_ms(),
            validate_on_change: default_validate_on_change(),
            base_dir: None,
        }
    }

    /// Finds a configuration file directly inside `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads configuration from a file.
    ///
    /// Supports `.cedarlint.jsonc`, `.cedarlint.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CedarLintError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CedarLintError::file(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir =
                Some(std::path::absolute(parent).unwrap_or_else(|_| parent.to_path_buf()));
        }

        Ok(config)
    }

    /// Parses configuration from a JSON (or JSONC) string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, CedarLintError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| CedarLintError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(CedarLintError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| CedarLintError::config(format!("Invalid config: {}", e)))
    }

    /// Returns the configured schema file as an absolute path, if any.
    pub fn schema_path(&self) -> Option<PathBuf> {
        let schema_file = self.schema_file.as_deref()?;
        let path = Path::new(schema_file);
        if path.is_absolute() {
            return Some(path.to_path_buf());
        }
        Some(match &self.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        })
    }
}

impl Default for CedarLintConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_config_new() {
        let config = CedarLintConfig::new();
        assert!(config.schema_file.is_none());
        assert!(config.cache);
        assert_eq!(config.debounce_ms, 300);
        assert!(config.validate_on_change);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "schemaFile": "policies/app.cedarschema",
            "cache": false,
            "debounceMs": 150
        }"#;

        let config = CedarLintConfig::from_json(json).unwrap();
        assert_eq!(config.schema_file.as_deref(), Some("policies/app.cedarschema"));
        assert!(!config.cache);
        assert_eq!(config.debounce_ms, 150);
        assert!(config.validate_on_change);
    }

    #[test]
    fn test_config_from_jsonc_with_comments() {
        let json = r#"{
            // the schema shared by every policy
            "schemaFile": "cedarschema",
        }"#;

        let config = CedarLintConfig::from_json(json).unwrap();
        assert_eq!(config.schema_file.as_deref(), Some("cedarschema"));
    }

    #[test]
    fn test_config_empty_document() {
        let config = CedarLintConfig::from_json("").unwrap();
        assert_eq!(config, CedarLintConfig::new());
    }

    #[rstest]
    #[case::unknown_property(r#"{ "schemaFiles": "x" }"#)]
    #[case::type_mismatch(r#"{ "cache": "not-a-bool" }"#)]
    #[case::negative_debounce(r#"{ "debounceMs": -1 }"#)]
    #[case::empty_schema_file(r#"{ "schemaFile": "" }"#)]
    fn test_config_validation_errors(#[case] json: &str) {
        let err = CedarLintConfig::from_json(json).unwrap_err();
        assert!(
            err.to_string().contains("Config validation failed"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_config_invalid_json() {
        let err = CedarLintConfig::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_from_file_sets_base_dir_and_schema_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".cedarlint.json");
        std::fs::write(&path, r#"{ "schemaFile": "schema/app.cedarschema" }"#).unwrap();

        let config = CedarLintConfig::from_file(&path).unwrap();

        assert_eq!(config.base_dir.as_deref(), Some(dir.path()));
        assert_eq!(
            config.schema_path(),
            Some(dir.path().join("schema/app.cedarschema"))
        );
    }

    #[test]
    fn test_from_file_missing_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CedarLintConfig::from_file(dir.path().join(".cedarlint.json")).unwrap_err();
        assert!(matches!(err, CedarLintError::File(_)));
    }

    #[test]
    fn test_discover_prefers_jsonc() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".cedarlint.json"), "{}").unwrap();
        std::fs::write(dir.path().join(".cedarlint.jsonc"), "{}").unwrap();

        assert_eq!(
            CedarLintConfig::discover(dir.path()),
            Some(dir.path().join(".cedarlint.jsonc"))
        );
    }

    #[test]
    fn test_discover_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CedarLintConfig::discover(dir.path()).is_none());
    }
}
