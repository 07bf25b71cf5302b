use crate::id::DEFAULT_ID_LENGTH;
use tracing::Level;

/// Configuration for [`Orm`](crate::Orm).
#[derive(Debug, Clone)]
pub struct OrmConfig {
    /// Primary key column, generated on create when absent.
    pub id_column: String,
    /// Column stamped with epoch milliseconds on every update.
    pub updated_at_column: String,
    /// Column `count` filters on.
    pub tenant_column: String,
    /// Result alias of the `COUNT(*)` column.
    pub count_alias: String,
    /// Length of generated identifiers.
    pub id_length: usize,
    /// Whether executed statements are logged.
    pub logging_enabled: bool,
    /// Tracing level statements are logged at.
    pub sql_log_level: Level,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            updated_at_column: "updatedAt".to_string(),
            tenant_column: "orgID".to_string(),
            count_alias: "totals".to_string(),
            id_length: DEFAULT_ID_LENGTH,
            logging_enabled: true,
            sql_log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl OrmConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary key column.
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Set the column stamped on update.
    pub fn updated_at_column(mut self, column: impl Into<String>) -> Self {
        self.updated_at_column = column.into();
        self
    }

    /// Set the column `count` filters on.
    pub fn tenant_column(mut self, column: impl Into<String>) -> Self {
        self.tenant_column = column.into();
        self
    }

    /// Set the alias of the `COUNT(*)` result column.
    pub fn count_alias(mut self, alias: impl Into<String>) -> Self {
        self.count_alias = alias.into();
        self
    }

    /// Set the length of generated identifiers.
    pub fn id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    /// Override the tracing level statements are logged at.
    pub fn sql_log_level(mut self, level: Level) -> Self {
        self.sql_log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Disable statement logging.
    pub fn disable_logging(mut self) -> Self {
        self.logging_enabled = false;
        self
    }
}
