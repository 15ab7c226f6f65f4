//! Action-clause state: target table, projected columns, insert rows, and
//! update assignments.

use crate::error::{OrmError, OrmResult};
use crate::qb::QueryBuilder;
use crate::value::Value;
use std::fmt;

/// The statement kind a builder compiles into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlAction {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for SqlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlAction::Select => "SELECT",
            SqlAction::Insert => "INSERT",
            SqlAction::Update => "UPDATE",
            SqlAction::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A table position: a plain name or a sub-query.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TableSource {
    Name(String),
    Query(Box<QueryBuilder>),
}

/// A FROM/JOIN target with an optional alias.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TableRef {
    pub source: TableSource,
    pub alias: Option<String>,
}

/// A projected column: expression text plus optional alias. Whether the
/// expression gets identifier-quoted is decided by the quoter (plain paths
/// are quoted, function calls pass through).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ColumnExpr {
    pub expr: String,
    pub alias: Option<String>,
}

impl QueryBuilder {
    /// Set the default action used by [`compile`](QueryBuilder::compile).
    pub fn action(mut self, action: SqlAction) -> Self {
        self.action = action;
        self
    }

    /// Set the target table.
    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(TableRef {
            source: TableSource::Name(table.to_string()),
            alias: None,
        });
        self
    }

    /// Set the target table with an alias.
    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        self.table = Some(TableRef {
            source: TableSource::Name(table.to_string()),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Use a sub-query as the FROM target.
    pub fn from_query(mut self, subquery: QueryBuilder, alias: &str) -> Self {
        self.table = Some(TableRef {
            source: TableSource::Query(Box::new(subquery)),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Set the SELECT column list, replacing any previous list.
    pub fn select_cols(mut self, cols: &[&str]) -> Self {
        self.select_columns = cols
            .iter()
            .map(|c| ColumnExpr {
                expr: c.to_string(),
                alias: None,
            })
            .collect();
        self
    }

    /// Append one SELECT column.
    pub fn add_select(mut self, col: &str) -> Self {
        self.select_columns.push(ColumnExpr {
            expr: col.to_string(),
            alias: None,
        });
        self
    }

    /// Append a SELECT expression with an optional alias.
    ///
    /// # Example
    /// ```ignore
    /// select("order").select_expr("count(1)", Some("num"))
    /// ```
    pub fn select_expr(mut self, expr: &str, alias: Option<&str>) -> Self {
        self.select_columns.push(ColumnExpr {
            expr: expr.to_string(),
            alias: alias.map(str::to_string),
        });
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set a column value, used by UPDATE assignments and single-row INSERT.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.sets.push((column.to_string(), value.into()));
        self
    }

    /// Set multiple column values at once.
    pub fn sets(mut self, pairs: Vec<(&str, Value)>) -> Self {
        for (column, value) in pairs {
            self.sets.push((column.to_string(), value));
        }
        self
    }

    /// Declare the INSERT column list for multi-row inserts.
    pub fn insert_columns(mut self, cols: &[&str]) -> Self {
        self.insert_columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append one INSERT row. Row arity must match the declared columns.
    pub fn add_row(mut self, row: Vec<Value>) -> OrmResult<Self> {
        if self.insert_columns.is_empty() {
            return Err(OrmError::validation(
                "add_row() requires insert_columns() to be set first",
            ));
        }
        if row.len() != self.insert_columns.len() {
            return Err(OrmError::validation(format!(
                "insert row has {} value(s), expected {}",
                row.len(),
                self.insert_columns.len()
            )));
        }
        self.insert_rows.push(row);
        Ok(self)
    }

    /// Append multiple INSERT rows.
    pub fn values(mut self, rows: Vec<Vec<Value>>) -> OrmResult<Self> {
        for row in rows {
            self = self.add_row(row)?;
        }
        Ok(self)
    }
}
