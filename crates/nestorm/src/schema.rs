//! Table schema registry.
//!
//! The registry maps table names to their ordered columns and each column's
//! declared kind. It is supplied once when constructing an [`Orm`](crate::Orm)
//! and never mutated afterwards. Only the `json` kind changes behavior: it lets
//! a `table.column.key` predicate address a key inside a JSON column.
//!
//! # Example
//!
//! ```ignore
//! use nestorm::{SchemaRegistry, TableSchema};
//!
//! let schema = SchemaRegistry::new()
//!     .with_table(TableSchema::new("users").column("id", "text").column("profile", "json"));
//!
//! // Or from the `{ table: { column: kind } }` document form.
//! let schema = SchemaRegistry::from_json_str(r#"{"users": {"id": "text", "profile": "json"}}"#)?;
//! ```

use crate::error::{OrmError, OrmResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Declared kind of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// A column holding JSON text.
    Json,
    /// Any other declared kind; kept verbatim, never interpreted.
    Other(String),
}

impl ColumnKind {
    pub fn is_json(&self) -> bool {
        matches!(self, ColumnKind::Json)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColumnKind::Json => "json",
            ColumnKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for ColumnKind {
    fn from(kind: &str) -> Self {
        if kind == "json" {
            ColumnKind::Json
        } else {
            ColumnKind::Other(kind.to_string())
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,
    /// Declared kind.
    pub kind: ColumnKind,
}

/// One table's columns, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column metadata.
    pub columns: Vec<ColumnMeta>,
}

impl TableSchema {
    /// Create a new table schema with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column, replacing the kind of an existing column with the same name.
    pub fn column(mut self, name: impl Into<String>, kind: impl Into<ColumnKind>) -> Self {
        let name = name.into();
        let kind = kind.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.kind = kind,
            None => self.columns.push(ColumnMeta { name, kind }),
        }
        self
    }

    /// Declared kind of a column.
    pub fn column_kind(&self, name: &str) -> Option<&ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.kind)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Registry for table schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Create a new empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any previous table with the same name.
    pub fn register(&mut self, table: TableSchema) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Builder form of [`SchemaRegistry::register`].
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.register(table);
        self
    }

    /// Get a table schema by name.
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Get a table schema by name, failing with [`OrmError::UnknownTable`].
    pub fn require_table(&self, name: &str) -> OrmResult<&TableSchema> {
        self.get_table(name)
            .ok_or_else(|| OrmError::UnknownTable(name.to_string()))
    }

    /// Declared kind of `table.column`, if both are registered.
    pub fn column_kind(&self, table: &str, column: &str) -> Option<&ColumnKind> {
        self.get_table(table).and_then(|t| t.column_kind(column))
    }

    /// Load a registry from a `{ "table": { "column": "kind" } }` document.
    pub fn from_value(value: &Value) -> OrmResult<Self> {
        let Value::Object(tables) = value else {
            return Err(OrmError::validation("schema document must be an object"));
        };

        let mut registry = Self::new();
        for (table_name, columns) in tables {
            let Value::Object(columns) = columns else {
                return Err(OrmError::validation(format!(
                    "columns of table '{table_name}' must be an object"
                )));
            };
            let mut table = TableSchema::new(table_name.as_str());
            for (column, kind) in columns {
                let Value::String(kind) = kind else {
                    return Err(OrmError::validation(format!(
                        "kind of column '{table_name}.{column}' must be a string"
                    )));
                };
                table = table.column(column.as_str(), kind.as_str());
            }
            registry.register(table);
        }
        Ok(registry)
    }

    /// Parse a registry from JSON text; see [`SchemaRegistry::from_value`].
    pub fn from_json_str(json: &str) -> OrmResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }
}
