use super::require_table_name;
use crate::condition::Predicate;
use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use crate::options::FindOptions;
use crate::schema::SchemaRegistry;
use crate::sql::Sql;
use serde_json::Value;

/// SELECT builder for `find_all`.
///
/// Renders, in order: projection, `LEFT JOIN`s, `WHERE`, `ORDER BY`, `LIMIT`.
/// Joined tables are projected as `join.col AS "join.col"` so the result
/// shaper can nest them back under `join`.
pub struct SelectBuilder<'a> {
    schema: &'a SchemaRegistry,
    table: &'a str,
    options: &'a FindOptions,
}

impl<'a> SelectBuilder<'a> {
    pub fn new(schema: &'a SchemaRegistry, table: &'a str, options: &'a FindOptions) -> Self {
        Self {
            schema,
            table,
            options,
        }
    }

    fn projection(&self, table: &str) -> OrmResult<Vec<String>> {
        let mut columns = Vec::new();

        if self.options.attributes.is_empty() {
            let base = self.schema.require_table(table)?;
            for column in base.column_names() {
                columns.push(format!("{table}.{}", validate_ident(column)?));
            }
        } else {
            for column in &self.options.attributes {
                columns.push(format!("{table}.{}", validate_ident(column)?));
            }
        }

        for include in &self.options.include {
            let joined = validate_ident(&include.table)?;
            for column in self.schema.require_table(joined)?.column_names() {
                let column = validate_ident(column)?;
                columns.push(format!("{joined}.{column} AS \"{joined}.{column}\""));
            }
        }

        if columns.is_empty() {
            return Err(OrmError::validation(format!(
                "no columns to select from table '{table}'"
            )));
        }
        Ok(columns)
    }

    /// Build the statement.
    pub fn build(&self) -> OrmResult<Sql> {
        let table = require_table_name(self.table)?;
        self.schema.require_table(table)?;

        let mut q = Sql::new("SELECT ");
        q.push(&self.projection(table)?.join(", "));
        q.push(" FROM ").push(table);

        for include in &self.options.include {
            let joined = validate_ident(&include.table)?;
            let left = validate_ident(&include.left)?;
            let right = validate_ident(&include.right)?;
            q.push(&format!("\nLEFT JOIN {joined} AS {joined} ON {left}={right}"));
        }

        let mut conditions = Vec::new();
        for predicate in &self.options.filter {
            match predicate {
                Predicate::Condition(condition) => conditions.push(condition.to_sql(self.schema)?),
                Predicate::Combination { combinator, .. } => {
                    tracing::warn!(
                        target: "nestorm.sql",
                        table,
                        combinator = %combinator,
                        "logical combination predicates are not translated; skipping"
                    );
                }
            }
        }
        if !conditions.is_empty() {
            q.push("\nWHERE ");
            for (i, condition) in conditions.into_iter().enumerate() {
                if i > 0 {
                    q.push(" AND ");
                }
                q.push_sql(condition);
            }
        }

        if let Some((column, direction)) = self.options.order_by.effective() {
            let column = validate_ident(column)?;
            q.push(&format!("\nORDER BY {table}.{column} {}", direction.as_sql()));
        }

        if let Some(limit) = self.options.limit.filter(|limit| *limit > 0) {
            q.push(&format!("\nLIMIT {limit}"));
        }

        q.squash_whitespace();
        Ok(q)
    }
}

/// `SELECT * FROM table WHERE id_column=?`
pub fn select_by_id(table: &str, id_column: &str, id: impl Into<Value>) -> OrmResult<Sql> {
    let table = require_table_name(table)?;
    let mut q = Sql::new("SELECT * FROM ");
    q.push(table).push(" WHERE ");
    q.push_ident(id_column)?.push("=").push_bind(id);
    Ok(q)
}

/// `SELECT COUNT(*) AS alias FROM table WHERE column=?`
pub fn count_where(
    table: &str,
    column: &str,
    alias: &str,
    value: impl Into<Value>,
) -> OrmResult<Sql> {
    let table = require_table_name(table)?;
    let mut q = Sql::new("SELECT COUNT(*) AS ");
    q.push_ident(alias)?.push(" FROM ").push(table).push(" WHERE ");
    q.push_ident(column)?.push("=").push_bind(value);
    Ok(q)
}
