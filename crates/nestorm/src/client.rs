//! Database execution collaborator.

use crate::error::OrmResult;
use serde_json::{Map, Value};

/// A flat result row: column name (possibly dotted, e.g. `users.email`) to value.
pub type Row = Map<String, Value>;

/// A trait over prepared-statement clients.
///
/// This is the `prepare(sql).bind(params)` + `first()/all()/run()` contract:
/// every method receives statement text with `?` placeholders and the values to
/// bind to them positionally. Timeouts and cancellation belong to the implementor.
pub trait Database: Send + Sync {
    /// Execute a query and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 or more rows: returns `Ok(Some(first_row))` (does **not** error)
    fn first(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send;

    /// Execute a query and return all rows.
    fn all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Execute a statement for its side effect and return the number of affected rows.
    fn run(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;
}
