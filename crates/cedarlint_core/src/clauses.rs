//! Splits a Cedar policy document into its individual policies.
//!
//! This is a lexical scan, not a parser: it only needs to find where each
//! `permit`/`forbid` statement starts and ends so that each one can be
//! validated on its own and errors can be positioned in the document. It is
//! run on documents that already passed the syntax check.

use crate::Span;

/// One policy statement in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyClause<'a> {
    /// Span of the statement, annotations included, up to and including `;`.
    pub span: Span,
    /// Span of the `permit`/`forbid` keyword.
    pub effect_span: Option<Span>,
    /// Source text of the statement.
    pub text: &'a str,
}

/// Returns a lazy iterator over the policy statements of `text`.
pub fn policy_clauses(text: &str) -> PolicyClauses<'_> {
    PolicyClauses { text, pos: 0 }
}

/// Iterator returned by [`policy_clauses`].
#[derive(Debug, Clone)]
pub struct PolicyClauses<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> PolicyClauses<'a> {
    /// Skips whitespace and `//` comments between statements.
    fn skip_trivia(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    self.pos = line_end(bytes, self.pos);
                }
                _ => break,
            }
        }
    }
}

impl<'a> Iterator for PolicyClauses<'a> {
    type Item = PolicyClause<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        let bytes = self.text.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        let mut effect_span = None;
        let mut i = start;

        while i < bytes.len() {
            match bytes[i] {
                b'"' => i = string_end(bytes, i),
                b'/' if bytes.get(i + 1) == Some(&b'/') => i = line_end(bytes, i),
                b';' => {
                    i += 1;
                    break;
                }
                b if is_ident_start(b) => {
                    let word_end = ident_end(bytes, i);
                    let preceded_by_at = i > 0 && bytes[i - 1] == b'@';
                    if effect_span.is_none()
                        && !preceded_by_at
                        && matches!(&self.text[i..word_end], "permit" | "forbid")
                    {
                        effect_span = Some(Span::new(i as u32, word_end as u32));
                    }
                    i = word_end;
                }
                _ => i += 1,
            }
        }

        self.pos = i;
        Some(PolicyClause {
            span: Span::new(start as u32, i as u32),
            effect_span,
            text: &self.text[start..i],
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn ident_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    i
}

/// Returns the offset just past the closing quote of the string starting at `i`.
fn string_end(bytes: &[u8], mut i: usize) -> usize {
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn line_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_policy() {
        let text = "permit(principal, action, resource);";
        let clauses: Vec<_> = policy_clauses(text).collect();

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].text, text);
        assert_eq!(clauses[0].span, Span::new(0, 36));
        assert_eq!(clauses[0].effect_span, Some(Span::new(0, 6)));
    }

    #[test]
    fn test_multiple_policies_with_comments_and_annotations() {
        let text = r#"// header comment
@id("allow-read")
permit(principal, action == Action::"read", resource);

// deny everyone; really
forbid(principal, action, resource) when { resource.name == "a;b" };
"#;
        let clauses: Vec<_> = policy_clauses(text).collect();

        assert_eq!(clauses.len(), 2);
        assert!(clauses[0].text.starts_with("@id(\"allow-read\")"));
        assert!(clauses[0].text.ends_with("resource);"));
        assert!(clauses[1].text.starts_with("forbid"));
        assert!(clauses[1].text.ends_with("};"));

        let effect = clauses[0].effect_span.unwrap();
        assert_eq!(&text[effect.start as usize..effect.end as usize], "permit");
        let effect = clauses[1].effect_span.unwrap();
        assert_eq!(&text[effect.start as usize..effect.end as usize], "forbid");
    }

    #[test]
    fn test_clause_span_matches_text() {
        let text = "permit(principal, action, resource);\n  forbid(principal, action, resource);";
        for clause in policy_clauses(text) {
            assert_eq!(
                &text[clause.span.start as usize..clause.span.end as usize],
                clause.text
            );
        }
    }

    #[test]
    fn test_annotation_named_like_effect_is_not_the_effect() {
        let text = r#"@permit("x") forbid(principal, action, resource);"#;
        let clause = policy_clauses(text).next().unwrap();
        let effect = clause.effect_span.unwrap();
        assert_eq!(&text[effect.start as usize..effect.end as usize], "forbid");
        assert_eq!(effect.start, 13);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let text = r#"permit(principal, action, resource) when { context.s == "a\";b" };"#;
        let clauses: Vec<_> = policy_clauses(text).collect();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].text, text);
    }

    #[test]
    fn test_unterminated_trailing_statement() {
        let text = "permit(principal, action, resource);\nforbid(principal";
        let clauses: Vec<_> = policy_clauses(text).collect();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[1].text, "forbid(principal");
    }

    #[test]
    fn test_empty_and_comment_only() {
        assert_eq!(policy_clauses("").count(), 0);
        assert_eq!(policy_clauses("  \n// nothing here\n").count(), 0);
    }
}
