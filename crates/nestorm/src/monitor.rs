//! Statement logging via `tracing`.
//!
//! Every statement the [`Orm`](crate::Orm) executes is emitted before execution
//! under the `nestorm.sql` target, with its query type and parameter count.
//! Parameter values are never logged.

use crate::config::OrmConfig;
use tracing::Level;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Anything else
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword of a SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql.split_whitespace().next().unwrap_or_default();
        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emits executed SQL as `tracing` events.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    enabled: bool,
    level: Level,
    max_sql_length: Option<usize>,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self::from_config(&OrmConfig::default())
    }
}

impl SqlLogger {
    pub fn from_config(config: &OrmConfig) -> Self {
        Self {
            enabled: config.logging_enabled,
            level: config.sql_log_level,
            max_sql_length: config.max_sql_length,
        }
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    /// Log a statement about to be executed.
    pub fn log(&self, sql: &str, param_count: usize) {
        if !self.enabled {
            return;
        }

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {{
                let level = $level;
                if level == Level::ERROR {
                    tracing::error!($($field)*)
                } else if level == Level::WARN {
                    tracing::warn!($($field)*)
                } else if level == Level::INFO {
                    tracing::info!($($field)*)
                } else if level == Level::DEBUG {
                    tracing::debug!($($field)*)
                } else {
                    tracing::trace!($($field)*)
                }
            }};
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "nestorm.sql",
            query_type = ?QueryType::from_sql(&sql),
            param_count,
            sql = %sql,
        );
    }
}
