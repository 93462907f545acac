//! Document kind classification.

use std::path::Path;

use crate::TextDocument;

/// Language id editors use for Cedar policy files.
pub const CEDAR_LANGUAGE_ID: &str = "cedar";
/// Extension of Cedar policy files.
pub const CEDAR_POLICY_EXTENSION: &str = "cedar";
/// Canonical schema file name.
pub const CEDAR_SCHEMA_FILE: &str = "cedarschema";
/// Canonical schema file name in JSON syntax.
pub const CEDAR_SCHEMA_FILE_JSON: &str = "cedarschema.json";
/// Suffix of schema files in Cedar schema syntax.
pub const CEDAR_SCHEMA_EXTENSION: &str = ".cedarschema";
/// Suffix of schema files in JSON syntax.
pub const CEDAR_SCHEMA_EXTENSION_JSON: &str = ".cedarschema.json";
/// Canonical entities file name.
pub const CEDAR_ENTITIES_FILE: &str = "cedarentities.json";
/// Suffix of entities files.
pub const CEDAR_ENTITIES_EXTENSION_JSON: &str = ".cedarentities.json";

/// What a document is validated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Policy,
    Schema,
    Entities,
    Unsupported,
}

/// Classifies a document from its declared language and file name.
///
/// Non-file documents (history views, untitled buffers, ...) are always
/// `Unsupported`.
pub fn classify_document(doc: &TextDocument) -> DocumentKind {
    if !doc.id.is_file() {
        return DocumentKind::Unsupported;
    }
    classify(doc.language_id.as_deref(), &doc.file_name())
}

/// Classifies by language id first, then by file name.
pub fn classify(language_id: Option<&str>, file_name: &Path) -> DocumentKind {
    match language_id {
        Some(CEDAR_LANGUAGE_ID) => return DocumentKind::Policy,
        None if file_name
            .extension()
            .is_some_and(|ext| ext == CEDAR_POLICY_EXTENSION) =>
        {
            return DocumentKind::Policy;
        }
        _ => {}
    }

    if is_schema_file(file_name) {
        DocumentKind::Schema
    } else if is_entities_file(file_name) {
        DocumentKind::Entities
    } else {
        DocumentKind::Unsupported
    }
}

/// Returns true for `cedarschema`, `*.cedarschema`, `cedarschema.json` and `*.cedarschema.json`.
pub fn is_schema_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == CEDAR_SCHEMA_FILE
        || name.ends_with(CEDAR_SCHEMA_EXTENSION)
        || name == CEDAR_SCHEMA_FILE_JSON
        || name.ends_with(CEDAR_SCHEMA_EXTENSION_JSON)
}

/// Returns true for `cedarentities.json` and `*.cedarentities.json`.
pub fn is_entities_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == CEDAR_ENTITIES_FILE || name.ends_with(CEDAR_ENTITIES_EXTENSION_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentId;
    use rstest::rstest;

    #[rstest]
    #[case::policy_language(Some("cedar"), "/w/anything.txt", DocumentKind::Policy)]
    #[case::policy_extension(None, "/w/policies.cedar", DocumentKind::Policy)]
    #[case::schema_canonical(None, "/w/cedarschema", DocumentKind::Schema)]
    #[case::schema_extension(None, "/w/foo.cedarschema", DocumentKind::Schema)]
    #[case::schema_json_canonical(Some("json"), "/w/cedarschema.json", DocumentKind::Schema)]
    #[case::schema_json(Some("json"), "/w/foo.cedarschema.json", DocumentKind::Schema)]
    #[case::entities_canonical(Some("json"), "/w/cedarentities.json", DocumentKind::Entities)]
    #[case::entities_json(Some("json"), "/w/prod.cedarentities.json", DocumentKind::Entities)]
    #[case::plain_json(Some("json"), "/w/package.json", DocumentKind::Unsupported)]
    #[case::lookalike(None, "/w/mycedarschema.txt", DocumentKind::Unsupported)]
    #[case::cedar_extension_other_language(Some("plaintext"), "/w/a.cedar", DocumentKind::Unsupported)]
    fn test_classify(
        #[case] language_id: Option<&str>,
        #[case] file_name: &str,
        #[case] expected: DocumentKind,
    ) {
        assert_eq!(classify(language_id, Path::new(file_name)), expected);
    }

    #[test]
    fn test_language_id_wins_over_file_name() {
        assert_eq!(
            classify(Some("cedar"), Path::new("/w/cedarschema")),
            DocumentKind::Policy
        );
    }

    #[test]
    fn test_non_file_document_is_unsupported() {
        let doc = TextDocument::new(
            DocumentId::new("vscode-local-history:/w/policies.cedar"),
            1,
            "permit(principal, action, resource);",
        )
        .with_language_id("cedar");

        assert_eq!(classify_document(&doc), DocumentKind::Unsupported);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_document() {
        let doc = TextDocument::new(DocumentId::new("file:///w/foo.cedarschema"), 1, "");
        assert_eq!(classify_document(&doc), DocumentKind::Schema);
    }
}
