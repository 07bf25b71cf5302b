use super::require_table_name;
use crate::error::{OrmError, OrmResult};
use crate::sql::Sql;
use serde_json::Value;

/// DELETE builder.
///
/// Deleting every row must be requested with [`DeleteBuilder::all`].
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    key: Option<(String, Value)>,
    allow_delete_all: bool,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            key: None,
            allow_delete_all: false,
        }
    }

    /// Delete rows where `column = value`.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.key = Some((column.to_string(), value.into()));
        self
    }

    /// Allow deleting the whole table (no WHERE condition).
    pub fn all(&mut self) -> &mut Self {
        self.allow_delete_all = true;
        self
    }

    pub fn build(&self) -> OrmResult<Sql> {
        let table = require_table_name(&self.table)?;

        let mut q = Sql::new("DELETE FROM ");
        q.push(table);
        match &self.key {
            Some((column, value)) => {
                q.push(" WHERE ");
                q.push_ident(column)?.push("=").push_bind(value.clone());
            }
            None if self.allow_delete_all => {}
            None => {
                return Err(OrmError::validation(
                    "DELETE without WHERE; call all() to delete every row",
                ));
            }
        }
        Ok(q)
    }
}
