//! Guard for the ad-hoc query endpoint: one read-only statement only.

use crate::error::{Result, ToolError};

const READ_ONLY_PREFIXES: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "EXPLAIN", "WITH"];

/// Statements that may wrap a data-modifying one.
const WRAPPING_PREFIXES: &[&str] = &["EXPLAIN", "WITH"];

const WRITE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "MERGE", "DROP", "ALTER", "CREATE", "TRUNCATE", "GRANT", "REVOKE",
];

/// Returns the statement with surrounding whitespace and trailing
/// semicolons removed.
pub fn ensure_read_only(sql: &str) -> Result<&str> {
    let statement = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if statement.is_empty() {
        return Err(ToolError::EmptyInput);
    }

    let upper = statement.to_ascii_uppercase();
    let first_word = upper
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    if !READ_ONLY_PREFIXES.contains(&first_word) {
        return Err(ToolError::ReadOnlyViolation);
    }

    let bare = strip_quoted(&upper);
    if bare.contains(';') {
        return Err(ToolError::MultipleStatements);
    }
    if WRAPPING_PREFIXES.contains(&first_word)
        && bare
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|word| WRITE_KEYWORDS.contains(&word))
    {
        return Err(ToolError::ReadOnlyViolation);
    }
    Ok(statement)
}

/// Blanks out quoted literals and identifiers.
fn strip_quoted(sql: &str) -> String {
    let mut quote: Option<char> = None;
    sql.chars()
        .map(|c| match quote {
            Some(q) if c == q => {
                quote = None;
                ' '
            }
            Some(_) => ' ',
            None if matches!(c, '\'' | '"' | '`') => {
                quote = Some(c);
                ' '
            }
            None => c,
        })
        .collect()
}
