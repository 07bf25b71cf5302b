use super::{bindable, require_table_name};
use crate::client::Row;
use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use crate::sql::Sql;
use serde_json::Value;

/// INSERT builder.
///
/// Columns are rendered in the order they were set; for an entity that is its
/// own key order.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.columns.push(column.to_string());
        self.values.push(value.into());
        self
    }

    /// Set every field of an entity, in key order.
    pub fn set_entity(&mut self, entity: &Row) -> &mut Self {
        for (column, value) in entity {
            self.set(column, value.clone());
        }
        self
    }

    /// `INSERT INTO table (c1, c2) VALUES (?, ?)`
    pub fn build(&self) -> OrmResult<Sql> {
        let table = require_table_name(&self.table)?;
        if self.columns.is_empty() {
            return Err(OrmError::validation("INSERT requires at least one column"));
        }

        let columns = self
            .columns
            .iter()
            .map(|c| validate_ident(c))
            .collect::<OrmResult<Vec<_>>>()?;

        let mut q = Sql::new("INSERT INTO ");
        q.push(table)
            .push(" (")
            .push(&columns.join(", "))
            .push(") VALUES (")
            .push_bind_list(self.values.iter().map(bindable))
            .push(")");
        Ok(q)
    }
}
