//! Predicate types for `find_all` filters.
//!
//! A [`Condition`] is one `column operator value` filter. Its value is always
//! bound as a `?` parameter when the condition is rendered for execution; the
//! inline form produced by [`Condition::to_literal_sql`] exists for logs and
//! diagnostics only.
//!
//! A column of the form `table.column.key`, where the registry declares
//! `table.column` as `json`, is rewritten to `json_extract(table.column, '$.key')`.
//! Other columns are rendered exactly as given, never qualified with the
//! queried table.

use crate::error::{OrmError, OrmResult};
use crate::ident::{is_valid_segment, validate_ident};
use crate::schema::SchemaRegistry;
use crate::sql::Sql;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=` (also parsed from `<>`)
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// Substring match: the value is wrapped as `%value%`
    Like,
    /// Negated substring match
    NotLike,
    /// `IS` (NULL-safe equality in SQLite)
    Is,
    /// `IS NOT`
    IsNot,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::Is => "IS",
            Op::IsNot => "IS NOT",
        }
    }

    /// Whether the value is wrapped with `%` wildcards on both sides.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Op::Like | Op::NotLike)
    }

    /// Operator text as placed between column and value.
    ///
    /// Symbolic operators are glued to their operands (`status=?`); keyword
    /// operators get surrounding spaces (`name LIKE ?`).
    fn rendered(&self) -> &'static str {
        match self {
            Op::Like => " LIKE ",
            Op::NotLike => " NOT LIKE ",
            Op::Is => " IS ",
            Op::IsNot => " IS NOT ",
            other => other.as_str(),
        }
    }
}

impl FromStr for Op {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_uppercase().as_str() {
            "=" => Op::Eq,
            "!=" | "<>" => Op::Ne,
            ">" => Op::Gt,
            ">=" => Op::Gte,
            "<" => Op::Lt,
            "<=" => Op::Lte,
            "LIKE" => Op::Like,
            "NOT LIKE" => Op::NotLike,
            "IS" => Op::Is,
            "IS NOT" => Op::IsNot,
            _ => return Err(OrmError::validation(format!("unsupported operator '{s}'"))),
        };
        Ok(op)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `column operator value` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    /// Create a condition from an already parsed operator.
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Create a condition from an operator token such as `"="` or `"LIKE"`.
    pub fn parse(column: impl Into<String>, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        Ok(Self::new(column, op.parse()?, value))
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Eq, value)
    }

    /// `column != value`
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Ne, value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gt, value)
    }

    /// `column >= value`
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gte, value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lt, value)
    }

    /// `column <= value`
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lte, value)
    }

    /// `column LIKE %value%`
    pub fn like(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Like, value)
    }

    /// Column expression: a `json_extract` call for JSON paths, else the validated column.
    fn column_expr(&self, schema: &SchemaRegistry) -> OrmResult<String> {
        let segments: Vec<&str> = self.column.split('.').collect();
        if let [table, column, key] = segments.as_slice() {
            let is_json = schema
                .column_kind(table, column)
                .is_some_and(|kind| kind.is_json());
            if is_json {
                // The key is any JSON object key; only the column reference is an identifier.
                if !is_valid_segment(table) || !is_valid_segment(column) || key.is_empty() {
                    return Err(OrmError::validation(format!(
                        "invalid JSON path column '{}'",
                        self.column
                    )));
                }
                let key = key.replace('\'', "''");
                return Ok(format!("json_extract({table}.{column}, '$.{key}')"));
            }
        }
        Ok(validate_ident(&self.column)?.to_string())
    }

    /// The value as compared: wrapped with `%` for pattern operators.
    fn compared_value(&self) -> Value {
        if !self.op.is_pattern() {
            return self.value.clone();
        }
        let text = match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Value::String(format!("%{text}%"))
    }

    /// Render as an executable fragment with the value bound: `status=?`.
    pub fn to_sql(&self, schema: &SchemaRegistry) -> OrmResult<Sql> {
        let column = self.column_expr(schema)?;
        let mut sql = Sql::empty();
        sql.push(&column)
            .push(self.op.rendered())
            .push_bind(self.compared_value());
        Ok(sql)
    }

    /// Render with the value inlined: `status="active"`, `count>3`, `name LIKE "%ann%"`.
    ///
    /// String values are double-quoted with embedded quotes doubled; other values
    /// are written as JSON. Never execute this output.
    pub fn to_literal_sql(&self, schema: &SchemaRegistry) -> OrmResult<String> {
        let column = self.column_expr(schema)?;
        let value = match self.compared_value() {
            Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            other => other.to_string(),
        };
        Ok(format!("{column}{}{value}", self.op.rendered()))
    }
}

/// One entry of a `where` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A `[column, operator, value]` filter.
    Condition(Condition),
    /// A `[combinator, operand]` logical combination.
    ///
    /// Accepted so that option documents containing one still load, but not
    /// translated: it contributes nothing to the WHERE clause.
    Combination { combinator: String, operand: Value },
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self {
        Predicate::Condition(condition)
    }
}

impl TryFrom<Value> for Predicate {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Array(items) = value else {
            return Err(OrmError::validation("predicate must be an array"));
        };
        let len = items.len();
        let mut items = items.into_iter();
        match (items.next(), items.next(), items.next()) {
            (Some(Value::String(column)), Some(Value::String(op)), Some(value)) if len == 3 => {
                Ok(Predicate::Condition(Condition::parse(column, &op, value)?))
            }
            (Some(combinator), Some(operand), None) => {
                let combinator = match combinator {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Ok(Predicate::Combination {
                    combinator,
                    operand,
                })
            }
            _ => Err(OrmError::validation(format!(
                "expected [column, operator, value] or [combinator, operand], got {len} elements"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Predicate::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;
    use serde_json::json;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new().with_table(
            TableSchema::new("users")
                .column("id", "text")
                .column("profile", "json")
                .column("status", "text"),
        )
    }

    #[test]
    fn string_equality_is_quoted_inline_and_bound_for_execution() {
        let c = Condition::parse("status", "=", "active").unwrap();
        assert_eq!(c.to_literal_sql(&schema()).unwrap(), r#"status="active""#);

        let sql = c.to_sql(&schema()).unwrap();
        assert_eq!(sql.to_sql(), "status=?");
        assert_eq!(sql.params(), &[json!("active")]);
    }

    #[test]
    fn numeric_comparison_is_unquoted() {
        let c = Condition::parse("count", ">", 3).unwrap();
        assert_eq!(c.to_literal_sql(&schema()).unwrap(), "count>3");
        assert_eq!(c.to_sql(&schema()).unwrap().params(), &[json!(3)]);
    }

    #[test]
    fn like_wraps_value_and_spaces_operator() {
        let c = Condition::parse("name", "LIKE", "ann").unwrap();
        assert_eq!(c.to_literal_sql(&schema()).unwrap(), r#"name LIKE "%ann%""#);

        let sql = c.to_sql(&schema()).unwrap();
        assert_eq!(sql.to_sql(), "name LIKE ?");
        assert_eq!(sql.params(), &[json!("%ann%")]);
    }

    #[test]
    fn like_on_number_matches_its_text() {
        let c = Condition::like("users.iin", 91);
        assert_eq!(c.to_sql(&schema()).unwrap().params(), &[json!("%91%")]);
    }

    #[test]
    fn json_path_rewrites_to_json_extract() {
        let c = Condition::eq("users.profile.city", "Almaty");
        let sql = c.to_sql(&schema()).unwrap();
        assert_eq!(sql.to_sql(), "json_extract(users.profile, '$.city')=?");
        assert_eq!(sql.params(), &[json!("Almaty")]);
    }

    #[test]
    fn json_path_keys_need_not_be_identifiers() {
        let c = Condition::eq("users.profile.first-name", "Ann");
        assert_eq!(
            c.to_sql(&schema()).unwrap().to_sql(),
            "json_extract(users.profile, '$.first-name')=?"
        );

        let c = Condition::eq("users.profile.город", "Алматы");
        let sql = c.to_sql(&schema()).unwrap();
        assert_eq!(sql.to_sql(), "json_extract(users.profile, '$.город')=?");
        assert_eq!(sql.params(), &[json!("Алматы")]);

        let c = Condition::eq("users.profile.zip code", "050000");
        assert_eq!(
            c.to_sql(&schema()).unwrap().to_sql(),
            "json_extract(users.profile, '$.zip code')=?"
        );
    }

    #[test]
    fn json_path_key_quotes_are_doubled() {
        let c = Condition::eq("users.profile.o'neil", 1);
        assert_eq!(
            c.to_sql(&schema()).unwrap().to_sql(),
            "json_extract(users.profile, '$.o''neil')=?"
        );
        assert!(Condition::eq("users.profile.", 1).to_sql(&schema()).is_err());
    }

    #[test]
    fn three_segments_on_non_json_column_are_left_alone() {
        let c = Condition::eq("users.status.city", "x");
        assert_eq!(c.to_sql(&schema()).unwrap().to_sql(), "users.status.city=?");
    }

    #[test]
    fn plain_columns_are_not_qualified() {
        let c = Condition::eq("status", "x");
        assert_eq!(c.to_sql(&schema()).unwrap().to_sql(), "status=?");
    }

    #[test]
    fn rejects_unsafe_columns_and_operators() {
        assert!(Condition::eq("status; --", "x").to_sql(&schema()).is_err());
        assert!(Condition::parse("status", "OR 1=1 --", "x").is_err());
    }

    #[test]
    fn literal_escapes_embedded_quotes() {
        let c = Condition::eq("name", r#"a"b"#);
        assert_eq!(c.to_literal_sql(&schema()).unwrap(), r#"name="a""b""#);
    }

    #[test]
    fn operator_parsing_is_case_and_space_insensitive() {
        assert_eq!("like".parse::<Op>().unwrap(), Op::Like);
        assert_eq!("not   like".parse::<Op>().unwrap(), Op::NotLike);
        assert_eq!("<>".parse::<Op>().unwrap(), Op::Ne);
        assert_eq!("is not".parse::<Op>().unwrap(), Op::IsNot);
    }

    #[test]
    fn predicates_deserialize_from_tuples() {
        let p: Predicate = serde_json::from_value(json!(["status", "=", "active"])).unwrap();
        assert_eq!(p, Predicate::Condition(Condition::eq("status", "active")));

        let p: Predicate = serde_json::from_value(json!(["or", [["a", "=", 1]]])).unwrap();
        assert!(matches!(p, Predicate::Combination { ref combinator, .. } if combinator == "or"));

        assert!(serde_json::from_value::<Predicate>(json!(["a"])).is_err());
        assert!(serde_json::from_value::<Predicate>(json!(["a", "=", 1, 2])).is_err());
        assert!(serde_json::from_value::<Predicate>(json!({"a": 1})).is_err());
    }
}
