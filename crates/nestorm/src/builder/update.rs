use super::{bindable, require_table_name};
use crate::client::Row;
use crate::error::{OrmError, OrmResult};
use crate::sql::Sql;
use serde_json::Value;

/// UPDATE builder.
///
/// The SET values and the WHERE value are all bound, SET values first.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    sets: Vec<(String, Value)>,
    key: Option<(String, Value)>,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            sets: Vec::new(),
            key: None,
        }
    }

    /// Set a column value.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.sets.push((column.to_string(), value.into()));
        self
    }

    /// Set every field of an entity, in key order.
    pub fn set_entity(&mut self, entity: &Row) -> &mut Self {
        for (column, value) in entity {
            self.set(column, value.clone());
        }
        self
    }

    /// Restrict the update to rows where `column = value`.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.key = Some((column.to_string(), value.into()));
        self
    }

    /// `UPDATE table SET c1=?, c2=? WHERE key=?`
    pub fn build(&self) -> OrmResult<Sql> {
        let table = require_table_name(&self.table)?;
        if self.sets.is_empty() {
            return Err(OrmError::validation("UPDATE requires at least one SET column"));
        }
        let Some((key_column, key_value)) = &self.key else {
            return Err(OrmError::validation("UPDATE requires a WHERE condition"));
        };

        let mut q = Sql::new("UPDATE ");
        q.push(table).push(" SET ");
        for (i, (column, value)) in self.sets.iter().enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push_ident(column)?.push("=").push_bind(bindable(value));
        }
        q.push(" WHERE ");
        q.push_ident(key_column)?.push("=").push_bind(key_value.clone());
        Ok(q)
    }
}
