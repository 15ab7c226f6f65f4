//! Decoration clauses: the fluent WHERE / HAVING / GROUP BY / ORDER BY /
//! JOIN / LIMIT surface.
//!
//! Every method is O(1) beyond collection insertion — nothing is serialized
//! here. Methods that can reject their input (operator validation, empty IN
//! collections) return `OrmResult<Self>` and chain with `?`; everything else
//! returns `Self`.

use crate::clause::{ClauseGroup, Connector, OrderDir, OrderExpr, SubExpr, prepare_operator};
use crate::error::{OrmError, OrmResult};
use crate::qb::{QueryBuilder, TableRef, TableSource};
use crate::value::Value;

/// JOIN flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// One JOIN target and its ON group. `on()` always appends to the most
/// recently added join.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Join {
    pub table: TableRef,
    pub kind: JoinKind,
    pub on: ClauseGroup,
}

/// Which condition clause a predicate mutator targets. WHERE and HAVING own
/// independent grouping stacks.
#[derive(Clone, Copy)]
enum CondTarget {
    Where,
    Having,
}

impl QueryBuilder {
    fn push_condition(
        mut self,
        target: CondTarget,
        column: &str,
        op: &str,
        value: Value,
        connector: Connector,
    ) -> OrmResult<Self> {
        let canonical = prepare_operator(column, op, &value)?;
        let max = self.config.max_in_params;
        let clause = match target {
            CondTarget::Where => &mut self.where_clause,
            CondTarget::Having => &mut self.having_clause,
        };

        // Oversized IN-lists are rewritten before insertion into an
        // OR-chain of chunks wrapped in a single group opened with the
        // caller's connector, so surrounding predicates are unaffected.
        if canonical == "IN" {
            if let Value::Array(items) = &value {
                if items.len() > max {
                    let chunk_size = max.saturating_sub(1).max(1);
                    clause.open(connector);
                    for chunk in items.chunks(chunk_size) {
                        clause.add(
                            SubExpr {
                                column: column.to_string(),
                                op: canonical.clone(),
                                value: Value::Array(chunk.to_vec()),
                            },
                            Connector::Or,
                        );
                    }
                    clause.close();
                    return Ok(self);
                }
            }
        }

        clause.add(
            SubExpr {
                column: column.to_string(),
                op: canonical,
                value,
            },
            connector,
        );
        Ok(self)
    }

    // ==================== WHERE ====================

    /// Alias of [`and_where`](QueryBuilder::and_where).
    pub fn where_(self, column: &str, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.and_where(column, op, value)
    }

    /// Add an `AND WHERE` predicate.
    pub fn and_where(self, column: &str, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_condition(CondTarget::Where, column, op, value.into(), Connector::And)
    }

    /// Add an `OR WHERE` predicate.
    pub fn or_where(self, column: &str, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_condition(CondTarget::Where, column, op, value.into(), Connector::Or)
    }

    /// Add an `AND WHERE` predicate, picking the operator from the value:
    /// NULL compares with `IS`, a collection with `IN`, anything else `=`.
    pub fn where_value(self, column: &str, value: impl Into<Value>) -> OrmResult<Self> {
        let value = value.into();
        let op = match &value {
            Value::Null => "IS",
            Value::Array(_) => "IN",
            _ => "=",
        };
        self.and_where(column, op, value)
    }

    /// Add several `AND WHERE` predicates via
    /// [`where_value`](QueryBuilder::where_value).
    pub fn wheres(mut self, conditions: Vec<(&str, Value)>) -> OrmResult<Self> {
        for (column, value) in conditions {
            self = self.where_value(column, value)?;
        }
        Ok(self)
    }

    /// Alias of [`and_where_open`](QueryBuilder::and_where_open).
    pub fn where_open(self) -> Self {
        self.and_where_open()
    }

    /// Open a new `AND WHERE (...)` grouping.
    pub fn and_where_open(mut self) -> Self {
        self.where_clause.open(Connector::And);
        self
    }

    /// Open a new `OR WHERE (...)` grouping.
    pub fn or_where_open(mut self) -> Self {
        self.where_clause.open(Connector::Or);
        self
    }

    /// Alias of [`and_where_close`](QueryBuilder::and_where_close).
    pub fn where_close(self) -> Self {
        self.and_where_close()
    }

    /// Close an open `WHERE (...)` grouping.
    pub fn and_where_close(mut self) -> Self {
        self.where_clause.close();
        self
    }

    /// Close an open `WHERE (...)` grouping.
    pub fn or_where_close(mut self) -> Self {
        self.where_clause.close();
        self
    }

    // ==================== GROUP BY ====================

    /// Add a `GROUP BY` column.
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    /// Add several `GROUP BY` columns.
    pub fn group_bys(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self.group_by.push(column.to_string());
        }
        self
    }

    // ==================== HAVING ====================

    /// Alias of [`and_having`](QueryBuilder::and_having).
    pub fn having(self, column: &str, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.and_having(column, op, value)
    }

    /// Add an `AND HAVING` predicate.
    pub fn and_having(self, column: &str, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_condition(CondTarget::Having, column, op, value.into(), Connector::And)
    }

    /// Add an `OR HAVING` predicate.
    pub fn or_having(self, column: &str, op: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_condition(CondTarget::Having, column, op, value.into(), Connector::Or)
    }

    /// Add several equality `AND HAVING` predicates.
    pub fn havings(mut self, conditions: Vec<(&str, Value)>) -> OrmResult<Self> {
        for (column, value) in conditions {
            self = self.and_having(column, "=", value)?;
        }
        Ok(self)
    }

    /// Alias of [`and_having_open`](QueryBuilder::and_having_open).
    pub fn having_open(self) -> Self {
        self.and_having_open()
    }

    /// Open a new `AND HAVING (...)` grouping.
    pub fn and_having_open(mut self) -> Self {
        self.having_clause.open(Connector::And);
        self
    }

    /// Open a new `OR HAVING (...)` grouping.
    pub fn or_having_open(mut self) -> Self {
        self.having_clause.open(Connector::Or);
        self
    }

    /// Alias of [`and_having_close`](QueryBuilder::and_having_close).
    pub fn having_close(self) -> Self {
        self.and_having_close()
    }

    /// Close an open `HAVING (...)` grouping.
    pub fn and_having_close(mut self) -> Self {
        self.having_clause.close();
        self
    }

    /// Close an open `HAVING (...)` grouping.
    pub fn or_having_close(mut self) -> Self {
        self.having_clause.close();
        self
    }

    // ==================== ORDER BY ====================

    /// Add an `ORDER BY` entry.
    pub fn order_by(mut self, column: &str, dir: Option<OrderDir>) -> Self {
        self.order_by.push(OrderExpr {
            column: column.to_string(),
            dir,
        });
        self
    }

    /// Add `ORDER BY column ASC`.
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, Some(OrderDir::Asc))
    }

    /// Add `ORDER BY column DESC`.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, Some(OrderDir::Desc))
    }

    /// Add several `ORDER BY` columns without directions.
    pub fn order_bys(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self = self.order_by(column, None);
        }
        self
    }

    // ==================== JOIN ====================

    /// Add a JOIN target and open a fresh ON group for it.
    pub fn join(mut self, table: &str, kind: JoinKind) -> Self {
        self.joins.push(Join {
            table: TableRef {
                source: TableSource::Name(table.to_string()),
                alias: None,
            },
            kind,
            on: ClauseGroup::new(),
        });
        self
    }

    /// Add a JOIN target with an alias.
    pub fn join_as(mut self, table: &str, alias: &str, kind: JoinKind) -> Self {
        self.joins.push(Join {
            table: TableRef {
                source: TableSource::Name(table.to_string()),
                alias: Some(alias.to_string()),
            },
            kind,
            on: ClauseGroup::new(),
        });
        self
    }

    /// Join a sub-query under an alias.
    pub fn join_query(mut self, subquery: QueryBuilder, alias: &str, kind: JoinKind) -> Self {
        self.joins.push(Join {
            table: TableRef {
                source: TableSource::Query(Box::new(subquery)),
                alias: Some(alias.to_string()),
            },
            kind,
            on: ClauseGroup::new(),
        });
        self
    }

    /// Add an `INNER JOIN`.
    pub fn inner_join(self, table: &str) -> Self {
        self.join(table, JoinKind::Inner)
    }

    /// Add a `LEFT JOIN`.
    pub fn left_join(self, table: &str) -> Self {
        self.join(table, JoinKind::Left)
    }

    /// Add a `RIGHT JOIN`.
    pub fn right_join(self, table: &str) -> Self {
        self.join(table, JoinKind::Right)
    }

    /// Add an `ON` condition (column against column) to the most recently
    /// added join.
    pub fn on(mut self, left: &str, op: &str, right: &str) -> OrmResult<Self> {
        let right_col = Value::Expr(right.to_string());
        let canonical = prepare_operator(left, op, &right_col)?;
        let join = self.joins.last_mut().ok_or_else(|| {
            OrmError::validation("on() called before any join()")
        })?;
        join.on.push_expr(
            SubExpr {
                column: left.to_string(),
                op: canonical,
                value: right_col,
            },
            Connector::And,
        );
        Ok(self)
    }

    /// Add several equality `ON` conditions to the most recent join.
    pub fn ons(mut self, conditions: &[(&str, &str)]) -> OrmResult<Self> {
        for (left, right) in conditions {
            self = self.on(left, "=", right)?;
        }
        Ok(self)
    }

    // ==================== LIMIT ====================

    /// Store the `(count, offset)` pagination pair.
    ///
    /// Nothing is rendered here; the compiler rewrites the pair into the
    /// target dialect's statement shape.
    pub fn limit(mut self, count: u64, offset: u64) -> Self {
        self.limit = Some((count, offset));
        self
    }

    /// Pagination helper. `page` is 1-based (clamped to >= 1).
    pub fn paginate(self, page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        self.limit(per_page, (page - 1) * per_page)
    }
}
