//! Reshaping flat rows into nested entities.
//!
//! A row such as
//!
//! ```text
//! { "data.phone": "123", "data.language": "en", "email": "a@b.com" }
//! ```
//!
//! becomes
//!
//! ```text
//! { "data": { "phone": "123", "language": "en" }, "email": "a@b.com" }
//! ```
//!
//! Rules, applied per key in row order:
//! - falsy values (`null`, `false`, `0`, `""`) are dropped;
//! - a dotted key `outer.inner[.rest]` is merged into an object under `outer`
//!   keyed by `inner`; anything after the second segment is ignored;
//! - values reached through a dotted key go through [`parse_embedded_json`], so
//!   JSON columns selected via joins arrive decoded;
//! - other keys are copied as-is.

use crate::client::Row;
use crate::error::{OrmError, OrmResult};
use serde_json::{Map, Value};

/// Something the shaper accepts: a single row or a sequence of rows.
pub trait Shape {
    type Output;

    fn shape(self) -> OrmResult<Self::Output>;
}

impl Shape for Row {
    type Output = Row;

    fn shape(self) -> OrmResult<Row> {
        shape_row(self)
    }
}

impl Shape for Vec<Row> {
    type Output = Vec<Row>;

    fn shape(self) -> OrmResult<Vec<Row>> {
        self.into_iter().map(shape_row).collect()
    }
}

/// Shape a single row or a sequence of rows.
pub fn shape<S: Shape>(input: S) -> OrmResult<S::Output> {
    input.shape()
}

/// Shape arbitrary JSON input: an object is shaped as one row, an array element-wise.
///
/// `null` and scalars are rejected with [`OrmError::InvalidInput`].
pub fn shape_value(input: Value) -> OrmResult<Value> {
    match input {
        Value::Object(row) => shape_row(row).map(Value::Object),
        Value::Array(items) => items
            .into_iter()
            .map(shape_value)
            .collect::<OrmResult<Vec<_>>>()
            .map(Value::Array),
        Value::Null => Err(OrmError::invalid_input("no input to shape")),
        other => Err(OrmError::invalid_input(format!(
            "expected an object, got {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Whether a value counts as absent when shaping.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn shape_row(row: Row) -> OrmResult<Row> {
    if row.is_empty() {
        return Err(OrmError::invalid_input("empty row"));
    }

    let mut out = Map::with_capacity(row.len());
    for (key, value) in row {
        if is_falsy(&value) {
            continue;
        }

        let Some((outer, inner)) = split_dotted(&key) else {
            out.insert(key, value);
            continue;
        };
        let nested = out
            .entry(outer)
            .or_insert_with(|| Value::Object(Map::new()));
        if !nested.is_object() {
            *nested = Value::Object(Map::new());
        }
        if let Value::Object(nested) = nested {
            nested.insert(inner, parse_embedded_json(value));
        }
    }
    Ok(out)
}

/// `outer.inner[.rest]` -> `(outer, inner)`; `None` for keys without a dot.
fn split_dotted(key: &str) -> Option<(String, String)> {
    let (outer, rest) = key.split_once('.')?;
    let inner = rest.split('.').next().unwrap_or_default();
    Some((outer.to_string(), inner.to_string()))
}

/// Try to decode `text` as JSON.
pub fn try_parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Decode a string holding a JSON array or object; return anything else unchanged.
///
/// Strings that decode to a scalar (`"123"`, `"true"`) stay strings, so text
/// columns that happen to look numeric keep their type.
pub fn parse_embedded_json(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };
    match try_parse_json(text) {
        Some(decoded @ (Value::Array(_) | Value::Object(_))) => decoded,
        _ => value,
    }
}
