//! # nestorm
//!
//! A small schema-aware SQL ORM over JSON rows.
//!
//! ## Features
//!
//! - **Schema registry**: tables and column kinds loaded from JSON; `json` columns
//!   can be filtered by path (`users.profile.city`) through `json_extract`
//! - **Find options**: projection, LEFT JOIN includes, WHERE conditions, ORDER BY
//!   and LIMIT described as plain data
//! - **Bound parameters**: values are never interpolated; identifiers are validated
//! - **Result shaping**: `"orgs.name"` style keys are nested, falsy fields dropped
//!   and embedded JSON text decoded
//! - **Pluggable execution**: anything implementing [`Database`]; an embedded
//!   SQLite implementation ships behind the `sqlite` feature
//! - **Statement logging**: every statement is emitted via `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use nestorm::{Direction, FindOptions, Orm, SchemaRegistry, SqliteDatabase};
//!
//! let schema = SchemaRegistry::from_json_str(
//!     r#"{"users": {"id": "text", "orgID": "text", "profile": "json"},
//!         "orgs": {"id": "text", "name": "text"}}"#,
//! )?;
//! let orm = Orm::new(SqliteDatabase::open("app.db")?, schema);
//!
//! let users = orm
//!     .find_all(
//!         "users",
//!         &FindOptions::new()
//!             .include("orgs", "orgs.id", "users.orgID")
//!             .eq("users.profile.city", "Almaty")
//!             .order_by("id", Direction::Desc)
//!             .limit(10),
//!     )
//!     .await?;
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod id;
pub mod ident;
pub mod monitor;
pub mod options;
pub mod orm;
pub mod schema;
pub mod shape;
pub mod sql;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use builder::{
    DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder, count_where, select_by_id,
};
pub use client::{Database, Row};
pub use condition::{Condition, Op, Predicate};
pub use config::OrmConfig;
pub use error::{OrmError, OrmResult};
pub use id::{IdGenerator, RandomIdGenerator};
pub use ident::validate_ident;
pub use monitor::{QueryType, SqlLogger};
pub use options::{Direction, FindOptions, Include, OrderBy};
pub use orm::Orm;
pub use schema::{ColumnKind, ColumnMeta, SchemaRegistry, TableSchema};
pub use shape::{Shape, is_falsy, parse_embedded_json, shape, shape_value, try_parse_json};
pub use sql::{Sql, sql};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
