//! SQL identifier validation.
//!
//! Table and column names are interpolated into statement text (SQLite does not
//! allow binding identifiers), so every name that reaches a statement is checked
//! first. A valid identifier is one or more `.`-separated segments, each matching
//! `[A-Za-z_][A-Za-z0-9_]*`.

use crate::error::{OrmError, OrmResult};

/// Check a single identifier segment (no dots).
pub(crate) fn is_valid_segment(seg: &str) -> bool {
    let mut chars = seg.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Validate a possibly dotted identifier (`users`, `users.id`).
pub fn validate_ident(ident: &str) -> OrmResult<&str> {
    if ident.is_empty() {
        return Err(OrmError::validation("empty identifier"));
    }
    if !ident.split('.').all(is_valid_segment) {
        return Err(OrmError::validation(format!("invalid identifier '{ident}'")));
    }
    Ok(ident)
}
