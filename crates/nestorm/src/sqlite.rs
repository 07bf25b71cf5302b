//! [`Database`] implementation over an embedded SQLite connection.

use crate::client::{Database, Row};
use crate::error::{OrmError, OrmResult};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use serde_json::{Map, Number, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A `rusqlite` connection behind a mutex.
///
/// Statements run synchronously inside the returned futures; the lock is never
/// held across an await point.
#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open_in_memory() -> OrmResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn open(path: impl AsRef<Path>) -> OrmResult<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Run several `;`-separated statements without parameters (DDL, fixtures).
    pub fn execute_batch(&self, sql: &str) -> OrmResult<()> {
        self.lock()?.execute_batch(sql).map_err(OrmError::from_db_error)
    }

    fn lock(&self) -> OrmResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| OrmError::Query("sqlite connection mutex poisoned".to_string()))
    }

    fn query_rows(&self, sql: &str, params: &[Value], limit: Option<usize>) -> OrmResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(OrmError::from_db_error)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql_value)))
            .map_err(OrmError::from_db_error)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(OrmError::from_db_error)? {
            let mut map = Map::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                let value = row.get_ref(i).map_err(OrmError::from_db_error)?;
                map.insert(name.clone(), from_sql_value(name, value)?);
            }
            out.push(map);
            if limit.is_some_and(|limit| out.len() >= limit) {
                break;
            }
        }
        Ok(out)
    }

    fn run_statement(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let conn = self.lock()?;
        let changed = conn
            .execute(sql, params_from_iter(params.iter().map(to_sql_value)))
            .map_err(OrmError::from_db_error)?;
        Ok(changed as u64)
    }
}

/// JSON value to SQLite value: booleans as 0/1, arrays and objects as JSON text.
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql_value(column: &str, value: ValueRef<'_>) -> OrmResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| OrmError::decode(column, format!("non-finite REAL value {f}")))?,
        ValueRef::Text(bytes) => Value::String(
            std::str::from_utf8(bytes)
                .map_err(|e| OrmError::decode(column, e.to_string()))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    })
}

impl Database for SqliteDatabase {
    fn first(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        let result = self
            .query_rows(sql, params, Some(1))
            .map(|rows| rows.into_iter().next());
        std::future::ready(result)
    }

    fn all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send {
        std::future::ready(self.query_rows(sql, params, None))
    }

    fn run(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        std::future::ready(self.run_statement(sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> SqliteDatabase {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE items (
                 id TEXT PRIMARY KEY,
                 qty INTEGER,
                 price REAL,
                 tags TEXT,
                 raw BLOB
             );",
        )
        .unwrap();
        db
    }

    #[tokio::test]
    async fn round_trips_scalar_kinds() {
        let db = db();
        let changed = db
            .run(
                "INSERT INTO items (id, qty, price, tags, raw) VALUES (?, ?, ?, ?, ?)",
                &[json!("a"), json!(true), json!(1.5), json!(["x"]), json!(null)],
            )
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let row = db
            .first("SELECT * FROM items WHERE id=?", &[json!("a")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            Value::Object(row),
            json!({ "id": "a", "qty": 1, "price": 1.5, "tags": "[\"x\"]", "raw": null })
        );
    }

    #[tokio::test]
    async fn aliases_become_row_keys() {
        let db = db();
        db.execute_batch("INSERT INTO items (id) VALUES ('a');").unwrap();
        let rows = db
            .all(r#"SELECT items.id AS "items.id" FROM items"#, &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("items.id"), Some(&json!("a")));
    }

    #[tokio::test]
    async fn first_returns_none_without_rows() {
        let db = db();
        assert!(db.first("SELECT * FROM items", &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn classifies_unique_violations() {
        let db = db();
        db.run("INSERT INTO items (id) VALUES (?)", &[json!("a")]).await.unwrap();
        let err = db
            .run("INSERT INTO items (id) VALUES (?)", &[json!("a")])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn surfaces_malformed_sql() {
        let db = db();
        let err = db.all("SELEC nothing", &[]).await.unwrap_err();
        assert!(matches!(err, OrmError::Sqlite(_)));
    }
}
