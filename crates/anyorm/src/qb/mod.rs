//! The query builder.
//!
//! A [`QueryBuilder`] accumulates clause state through fluent calls in any
//! order and compiles on demand into a [`CompiledSql`](crate::CompiledSql).
//! Construction order and serialization order are independent: clauses are
//! always rendered JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT.
//!
//! # Usage
//!
//! ```ignore
//! use anyorm::{select, Dialect};
//!
//! let compiled = select("user")
//!     .select_cols(&["id", "name"])
//!     .and_where("age", ">", 18)?
//!     .order_by_asc("id")
//!     .limit(10, 0)
//!     .compile(Dialect::MySql)?;
//!
//! assert_eq!(compiled.static_params.len(), 1);
//!
//! // INSERT
//! let id = insert("user")
//!     .set("name", "alice")
//!     .set("age", 30)
//!     .insert(&executor, &[], Some("id"))
//!     .await?;
//! ```
//!
//! Builders are cheap to clone and a clone is fully independent — sharing a
//! partially-built prototype across tasks requires `clone()` first.

mod action;
mod compile;
mod decoration;

pub use action::SqlAction;
pub use decoration::JoinKind;

pub(crate) use action::{ColumnExpr, TableRef, TableSource};
pub(crate) use decoration::Join;

use crate::clause::{ConditionClause, OrderExpr};
use crate::config::OrmConfig;
use crate::value::Value;

/// Mutable, clonable SQL query state.
///
/// One instance must not be mutated from multiple threads of control;
/// `clone()` is the concurrency boundary. `compile()` never mutates.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuilder {
    pub(crate) config: OrmConfig,
    pub(crate) action: SqlAction,
    pub(crate) table: Option<TableRef>,
    pub(crate) distinct: bool,
    pub(crate) select_columns: Vec<ColumnExpr>,
    pub(crate) insert_columns: Vec<String>,
    pub(crate) insert_rows: Vec<Vec<Value>>,
    pub(crate) sets: Vec<(String, Value)>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_clause: ConditionClause,
    pub(crate) group_by: Vec<String>,
    pub(crate) having_clause: ConditionClause,
    pub(crate) order_by: Vec<OrderExpr>,
    pub(crate) limit: Option<(u64, u64)>,
}

impl QueryBuilder {
    /// Create an empty builder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(OrmConfig::default())
    }

    /// Create an empty builder with an explicit configuration.
    pub fn with_config(config: OrmConfig) -> Self {
        Self {
            config,
            action: SqlAction::Select,
            table: None,
            distinct: false,
            select_columns: Vec::new(),
            insert_columns: Vec::new(),
            insert_rows: Vec::new(),
            sets: Vec::new(),
            joins: Vec::new(),
            where_clause: ConditionClause::new(),
            group_by: Vec::new(),
            having_clause: ConditionClause::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Reset every clause container, the action, and the limit pair. The
    /// configuration is kept.
    pub fn clear(mut self) -> Self {
        self.action = SqlAction::Select;
        self.table = None;
        self.distinct = false;
        self.select_columns.clear();
        self.insert_columns.clear();
        self.insert_rows.clear();
        self.sets.clear();
        self.joins.clear();
        self.where_clause.clear();
        self.group_by.clear();
        self.having_clause.clear();
        self.order_by.clear();
        self.limit = None;
        self
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a SELECT query builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = anyorm::select("user").and_where("id", "=", 1)?;
/// ```
pub fn select(table: &str) -> QueryBuilder {
    QueryBuilder::new().action(SqlAction::Select).from(table)
}

/// Create an INSERT query builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = anyorm::insert("user")
///     .set("username", "alice")
///     .set("email", "alice@example.com");
/// ```
pub fn insert(table: &str) -> QueryBuilder {
    QueryBuilder::new().action(SqlAction::Insert).from(table)
}

/// Alias for `insert`.
pub fn insert_into(table: &str) -> QueryBuilder {
    insert(table)
}

/// Create an UPDATE query builder for the given table.
pub fn update(table: &str) -> QueryBuilder {
    QueryBuilder::new().action(SqlAction::Update).from(table)
}

/// Create a DELETE query builder for the given table.
pub fn delete(table: &str) -> QueryBuilder {
    QueryBuilder::new().action(SqlAction::Delete).from(table)
}

/// Alias for `delete`.
pub fn delete_from(table: &str) -> QueryBuilder {
    delete(table)
}
