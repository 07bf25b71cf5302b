//! Parameter-safe SQL statement builder.
//!
//! `Sql` stores statement text and bound values separately and renders one `?`
//! placeholder per bound value, in push order. Every builder in this crate
//! produces a `Sql`, and the [`Database`] collaborator receives its rendered
//! text together with [`Sql::params`].
//!
//! # Example
//!
//! ```ignore
//! use nestorm::sql;
//!
//! let mut q = sql("SELECT * FROM users WHERE ");
//! q.push("status=").push_bind("active");
//! let rows = q.fetch_all(&db).await?;
//! ```

use crate::client::{Database, Row};
use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL statement with positional `?` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a `?` placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: Into<Value>,
    {
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_bind(v);
        }
        self
    }

    /// Append another `Sql` fragment, consuming it.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Append a SQL identifier (table/column, optionally dotted) after validating it.
    pub fn push_ident(&mut self, ident: &str) -> OrmResult<&mut Self> {
        let ident = validate_ident(ident)?;
        Ok(self.push(ident))
    }

    /// Render the statement text with `?` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => out.push('?'),
            }
        }
        out
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Collapse every whitespace run in the raw text to a single space and trim both ends.
    pub fn squash_whitespace(&mut self) -> &mut Self {
        let mut prev_space = true;
        for part in &mut self.parts {
            match part {
                SqlPart::Raw(s) => {
                    let mut out = String::with_capacity(s.len());
                    for c in s.chars() {
                        if c.is_whitespace() {
                            if !prev_space {
                                out.push(' ');
                            }
                            prev_space = true;
                        } else {
                            out.push(c);
                            prev_space = false;
                        }
                    }
                    *s = out;
                }
                SqlPart::Param => prev_space = false,
            }
        }
        if let Some(SqlPart::Raw(last)) = self.parts.last_mut() {
            let trimmed = last.trim_end().len();
            last.truncate(trimmed);
        }
        self
    }

    fn validate(&self) -> OrmResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();
        if placeholder_count != self.params.len() {
            return Err(OrmError::Validation(format!(
                "Sql: {} placeholders but {} params",
                placeholder_count,
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Execute the statement and return all rows.
    pub async fn fetch_all(&self, db: &impl Database) -> OrmResult<Vec<Row>> {
        self.validate()?;
        db.all(&self.to_sql(), &self.params).await
    }

    /// Execute the statement and return the first row, if any.
    pub async fn fetch_opt(&self, db: &impl Database) -> OrmResult<Option<Row>> {
        self.validate()?;
        db.first(&self.to_sql(), &self.params).await
    }

    /// Execute the statement and return the affected row count.
    pub async fn execute(&self, db: &impl Database) -> OrmResult<u64> {
        self.validate()?;
        db.run(&self.to_sql(), &self.params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM users WHERE a=");
        q.push_bind(1).push(" AND b=").push_bind("x");

        assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a=? AND b=?");
        assert_eq!(q.params(), &[json!(1), json!("x")]);
    }

    #[test]
    fn can_compose_fragments() {
        let mut w = Sql::empty();
        w.push(" WHERE id=").push_bind(42);

        let mut q = sql("SELECT * FROM users");
        q.push_sql(w);

        assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id=?");
        assert_eq!(q.params().len(), 1);
    }

    #[test]
    fn bind_list_renders_commas() {
        let mut q = sql("INSERT INTO users (id, name) VALUES (");
        q.push_bind_list(vec![json!("u1"), json!("Ann")]).push(")");
        assert_eq!(q.to_sql(), "INSERT INTO users (id, name) VALUES (?, ?)");
        assert_eq!(q.params().len(), 2);
    }

    #[test]
    fn push_ident_rejects_unsafe() {
        let mut q = Sql::empty();
        assert!(q.push_ident("users.id").is_ok());
        assert!(q.push_ident("users; drop table users; --").is_err());
        assert_eq!(q.to_sql(), "users.id");
    }

    #[test]
    fn squash_whitespace_collapses_runs_and_trims() {
        let mut q = sql("  SELECT *\n   FROM users  \n  WHERE a=");
        q.push_bind(1).push("   \n  LIMIT 5 \n ");
        q.squash_whitespace();
        assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a=? LIMIT 5");
    }
}
