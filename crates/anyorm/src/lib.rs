//! # anyorm
//!
//! A dialect-aware SQL query builder and ORM core for Rust.
//!
//! ## Features
//!
//! - **Fluent, order-independent construction**: predicates, joins,
//!   groupings, and pagination accumulate in any call order; clauses always
//!   serialize JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT
//! - **Nested AND/OR grouping**: explicit `*_open()` / `*_close()` pairs
//!   with balance checking at compile time
//! - **Dialect-correct output**: identifier quoting and LIMIT/OFFSET
//!   rewriting for MySQL, SQLite, Postgres, SQL Server, and Oracle
//! - **Parameterized by construction**: literal values become positional
//!   placeholders; [`CompiledSql`] pairs the text with its ordered parameter
//!   sequence and can be cached and re-bound per execution
//! - **IN-list splitting**: oversized `IN` collections are rewritten into
//!   OR-combined chunks under the vendor parameter limit
//! - **No I/O**: execution goes through the caller-supplied [`Executor`];
//!   rows come back as generic maps converted by a caller-supplied transform
//!
//! ## Query builder
//!
//! ```ignore
//! use anyorm::{select, Dialect, Value};
//!
//! let compiled = select("user")
//!     .select_cols(&["id", "name"])
//!     .and_where("age", ">", 18)?
//!     .or_where_open()
//!     .and_where("role", "=", "admin")?
//!     .or_where("role", "=", "owner")?
//!     .or_where_close()
//!     .order_by_asc("id")
//!     .limit(10, 0)
//!     .compile(Dialect::MySql)?;
//!
//! // Re-bind a cached template with per-page arguments:
//! let params = compiled.bind(&[])?;
//! ```
//!
//! ## Execution
//!
//! ```ignore
//! let users = select("user")
//!     .and_where("status", "=", "active")?
//!     .find_all(&executor, &[], |row| Ok(User::from(row)))
//!     .await?;
//! ```

pub mod clause;
pub mod compiled;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod qb;
pub mod relation;
pub mod value;

mod quote;

pub use clause::{Connector, OrderDir};
pub use compiled::CompiledSql;
pub use config::OrmConfig;
pub use dialect::Dialect;
pub use error::{OrmError, OrmResult};
pub use executor::{Executor, Row, RowTransform};
pub use relation::{Relation, RelationKind};
pub use value::Value;

// Re-export the qb surface for easy access
pub use qb::{
    delete, delete_from, insert, insert_into, select, update, JoinKind, QueryBuilder, SqlAction,
};
