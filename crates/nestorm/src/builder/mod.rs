//! Statement builders.
//!
//! Each builder renders one [`Sql`](crate::Sql) statement: text with `?`
//! placeholders plus the values bound to them.
//!
//! ## Design
//!
//! - Identifiers are validated before they are interpolated; values are always bound.
//! - DELETE requires a WHERE condition unless `all()` is requested explicitly;
//!   INSERT and UPDATE require at least one column.
//! - Array and object values are bound as JSON text.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::{SelectBuilder, count_where, select_by_id};
pub use update::UpdateBuilder;

use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Reject an empty table name with [`OrmError::MissingArgument`], then validate it.
pub(crate) fn require_table_name(table: &str) -> OrmResult<&str> {
    if table.trim().is_empty() {
        return Err(OrmError::missing_argument("table name is required"));
    }
    validate_ident(table)
}

/// The value actually handed to the collaborator for an entity field.
pub(crate) fn bindable(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        scalar => scalar.clone(),
    }
}
