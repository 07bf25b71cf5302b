//! Options for [`Orm::find_all`](crate::Orm::find_all).
//!
//! `FindOptions` can be built in code or deserialized from the JSON options
//! document form:
//!
//! ```ignore
//! let options = FindOptions::from_json_str(r#"{
//!     "attributes": ["id", "email"],
//!     "include": [["orgs", "orgs.id", "users.orgID"]],
//!     "where": [["status", "=", "active"], ["users.profile.city", "LIKE", "Alm"]],
//!     "orderBy": { "createdAt": "DESC" },
//!     "limit": 20
//! }"#)?;
//! ```

use crate::condition::{Condition, Predicate};
use crate::error::{OrmError, OrmResult};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Sort direction of an `ORDER BY` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(OrmError::validation(format!("unsupported sort direction '{s}'"))),
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A `LEFT JOIN` descriptor: joined table plus the two sides of the `ON` equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub table: String,
    pub left: String,
    pub right: String,
}

impl Include {
    pub fn new(
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}

impl<'de> Deserialize<'de> for Include {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (table, left, right) = <(String, String, String)>::deserialize(deserializer)?;
        Ok(Include { table, left, right })
    }
}

/// Ordered `column -> direction` pairs.
///
/// Setting a column that is already present updates its direction in place.
/// Only the last pair is rendered into the statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderBy(Vec<(String, Direction)>);

impl OrderBy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, direction: Direction) {
        let column = column.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = direction,
            None => self.0.push((column, direction)),
        }
    }

    /// The pair that determines the emitted `ORDER BY` clause.
    pub fn effective(&self) -> Option<(&str, Direction)> {
        self.0.last().map(|(c, d)| (c.as_str(), *d))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.0.iter().map(|(c, d)| (c.as_str(), *d))
    }
}

impl<'de> Deserialize<'de> for OrderBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderByVisitor;

        impl<'de> Visitor<'de> for OrderByVisitor {
            type Value = OrderBy;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping column names to ASC/DESC")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut order = OrderBy::new();
                while let Some((column, direction)) = map.next_entry::<String, Direction>()? {
                    order.set(column, direction);
                }
                Ok(order)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut order = OrderBy::new();
                while let Some((column, direction)) = seq.next_element::<(String, Direction)>()? {
                    order.set(column, direction);
                }
                Ok(order)
            }
        }

        deserializer.deserialize_any(OrderByVisitor)
    }
}

/// Per-call options for `find_all`. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FindOptions {
    /// Columns of the queried table to project; empty means every registered column.
    pub attributes: Vec<String>,
    /// Joined tables; all of their registered columns are projected as `"table.column"`.
    pub include: Vec<Include>,
    /// Filters, combined with `AND`.
    #[serde(rename = "where")]
    pub filter: Vec<Predicate>,
    #[serde(rename = "orderBy")]
    pub order_by: OrderBy,
    /// Row limit; `None` or `Some(0)` means unlimited.
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON options document.
    pub fn from_value(value: Value) -> OrmResult<Self> {
        serde_json::from_value(value).map_err(|e| OrmError::validation(e.to_string()))
    }

    /// Parse options from JSON text; see [`FindOptions::from_value`].
    pub fn from_json_str(json: &str) -> OrmResult<Self> {
        serde_json::from_str(json).map_err(|e| OrmError::validation(e.to_string()))
    }

    /// Project these columns instead of every registered column.
    pub fn attributes<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a `LEFT JOIN table AS table ON left=right`.
    pub fn include(
        mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.include.push(Include::new(table, left, right));
        self
    }

    /// Add a filter.
    pub fn filter(mut self, predicate: impl Into<Predicate>) -> Self {
        self.filter.push(predicate.into());
        self
    }

    /// Add a `column = value` filter.
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Condition::eq(column, value))
    }

    /// Set the sort direction of a column.
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order_by.set(column, direction);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
