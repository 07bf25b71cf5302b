//! CRUD entry points over a [`Database`] collaborator.

use crate::builder::{
    DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder, count_where, require_table_name,
    select_by_id,
};
use crate::client::{Database, Row};
use crate::config::OrmConfig;
use crate::error::{OrmError, OrmResult};
use crate::id::{IdGenerator, RandomIdGenerator};
use crate::monitor::SqlLogger;
use crate::options::FindOptions;
use crate::schema::SchemaRegistry;
use crate::shape::{is_falsy, shape};
use crate::sql::Sql;
use serde_json::Value;

/// Schema-aware CRUD operations.
///
/// `Orm` owns the read-only schema registry and configuration plus a handle to
/// the collaborator. Each operation renders one statement, executes it once and
/// returns; there is no shared mutable state between calls.
///
/// # Example
///
/// ```ignore
/// use nestorm::{FindOptions, Orm, SchemaRegistry, SqliteDatabase};
///
/// let schema = SchemaRegistry::from_json_str(r#"{"users": {"id": "text", "email": "text"}}"#)?;
/// let orm = Orm::new(SqliteDatabase::open_in_memory()?, schema);
///
/// let user = orm.create("users", entity).await?;
/// let users = orm.find_all("users", &FindOptions::new().eq("email", "a@b.com")).await?;
/// ```
pub struct Orm<D> {
    db: D,
    schema: SchemaRegistry,
    config: OrmConfig,
    ids: Box<dyn IdGenerator>,
    logger: SqlLogger,
}

impl<D: Database> Orm<D> {
    /// Create an `Orm` with the default configuration.
    pub fn new(db: D, schema: SchemaRegistry) -> Self {
        Self::with_config(db, schema, OrmConfig::default())
    }

    pub fn with_config(db: D, schema: SchemaRegistry, config: OrmConfig) -> Self {
        Self {
            db,
            schema,
            ids: Box::new(RandomIdGenerator::new(config.id_length)),
            logger: SqlLogger::from_config(&config),
            config,
        }
    }

    /// Replace the identifier generator used by `create`.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn db(&self) -> &D {
        &self.db
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    async fn fetch_all(&self, q: &Sql) -> OrmResult<Vec<Row>> {
        self.logger.log(&q.to_sql(), q.params().len());
        q.fetch_all(&self.db).await
    }

    async fn fetch_opt(&self, q: &Sql) -> OrmResult<Option<Row>> {
        self.logger.log(&q.to_sql(), q.params().len());
        q.fetch_opt(&self.db).await
    }

    async fn execute(&self, q: &Sql) -> OrmResult<u64> {
        self.logger.log(&q.to_sql(), q.params().len());
        q.execute(&self.db).await
    }

    /// Fetch one row by primary key, shaped. `None` when no row matches.
    pub async fn get_by_id(&self, table: &str, id: impl Into<Value>) -> OrmResult<Option<Row>> {
        let q = select_by_id(table, &self.config.id_column, id)?;
        self.fetch_opt(&q).await?.map(shape).transpose()
    }

    /// Insert an entity, generating its id when absent, and return it.
    pub async fn create(&self, table: &str, mut entity: Row) -> OrmResult<Row> {
        require_table_name(table)?;

        let id_column = self.config.id_column.as_str();
        if entity.get(id_column).is_none_or(is_falsy) {
            let id = self.ids.generate();
            tracing::trace!(target: "nestorm", table, id = %id, "generated entity id");
            entity.insert(id_column.to_string(), Value::String(id));
        }

        let q = InsertBuilder::new(table).set_entity(&entity).build()?;
        self.execute(&q).await?;
        Ok(entity)
    }

    /// Update the row with the given id from an entity and return the entity.
    ///
    /// The `updatedAt` column is always overwritten with the current epoch
    /// milliseconds. The id column itself is never part of the SET list.
    pub async fn update(
        &self,
        table: &str,
        id: impl Into<Value>,
        mut entity: Row,
    ) -> OrmResult<Row> {
        require_table_name(table)?;

        let now = chrono::Utc::now().timestamp_millis();
        entity.insert(self.config.updated_at_column.clone(), Value::from(now));

        let mut builder = UpdateBuilder::new(table);
        for (column, value) in &entity {
            if *column != self.config.id_column {
                builder.set(column, value.clone());
            }
        }
        builder.where_eq(&self.config.id_column, id);

        let q = builder.build()?;
        self.execute(&q).await?;
        Ok(entity)
    }

    /// Delete the row with the given id; returns the affected row count.
    pub async fn delete(&self, table: &str, id: impl Into<Value>) -> OrmResult<u64> {
        let q = DeleteBuilder::new(table)
            .where_eq(&self.config.id_column, id)
            .build()?;
        self.execute(&q).await
    }

    /// Delete every row of a table; returns the affected row count.
    pub async fn delete_all(&self, table: &str) -> OrmResult<u64> {
        let q = DeleteBuilder::new(table).all().build()?;
        self.execute(&q).await
    }

    /// Count the rows of a table belonging to an organization.
    pub async fn count(&self, table: &str, org_id: impl Into<Value>) -> OrmResult<i64> {
        let alias = self.config.count_alias.as_str();
        let q = count_where(table, &self.config.tenant_column, alias, org_id)?;
        let row = self
            .fetch_opt(&q)
            .await?
            .ok_or_else(|| OrmError::decode(alias, "COUNT(*) returned no row"))?;
        row.get(alias)
            .and_then(Value::as_i64)
            .ok_or_else(|| OrmError::decode(alias, "expected an integer count"))
    }

    /// Run a SELECT built from `options` and return the shaped rows.
    pub async fn find_all(&self, table: &str, options: &FindOptions) -> OrmResult<Vec<Row>> {
        tracing::debug!(
            target: "nestorm",
            table,
            attributes = options.attributes.len(),
            includes = options.include.len(),
            predicates = options.filter.len(),
            "find_all"
        );
        let q = SelectBuilder::new(&self.schema, table, options).build()?;
        shape(self.fetch_all(&q).await?)
    }
}
