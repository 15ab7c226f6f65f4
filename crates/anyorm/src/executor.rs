//! The execution boundary.
//!
//! The core performs no I/O: compiled statements are handed to an
//! [`Executor`] supplied by the caller, and result rows come back as generic
//! row maps that a caller-supplied [`RowTransform`] converts into typed
//! values. Connection lifecycle, transactions, timeouts, and cancellation
//! all live behind the executor.

use crate::compiled::CompiledSql;
use crate::error::{OrmError, OrmResult};
use crate::qb::{ColumnExpr, QueryBuilder, SqlAction};
use crate::dialect::Dialect;
use crate::value::Value;
use std::collections::HashMap;
use tracing::debug;

/// A generic result row: column name to value.
pub type Row = HashMap<String, Value>;

/// Convert a generic row map into a typed result. Supplied by the caller
/// per query; reflection/mapping logic lives outside this crate.
pub trait RowTransform<T>: Fn(&Row) -> OrmResult<T> {}

impl<T, F: Fn(&Row) -> OrmResult<T>> RowTransform<T> for F {}

/// A driver adapter that can run compiled statements.
///
/// Implementations wrap a live connection (or a test double) and report the
/// [`Dialect`] the connection speaks; the builder entry points compile for
/// that dialect and delegate here.
pub trait Executor: Send + Sync {
    /// The dialect this connection speaks.
    fn dialect(&self) -> Dialect;

    /// Run a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Run an INSERT and return the generated key from `generated_column`.
    ///
    /// The default implementation errors; drivers without key retrieval
    /// support don't have to pretend.
    fn insert_returning(
        &self,
        sql: &str,
        params: &[Value],
        generated_column: &str,
    ) -> impl std::future::Future<Output = OrmResult<i64>> + Send {
        let _ = (sql, params, generated_column);
        async {
            Err(OrmError::Execution(
                "generated key retrieval is not supported by this executor".to_string(),
            ))
        }
    }

    /// Run a query and return the first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Run a query and return the first row, erroring when there is none.
    fn query_one(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Row>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| OrmError::not_found("Expected one row, got none"))
        }
    }
}

impl<E: Executor> Executor for &E {
    fn dialect(&self) -> Dialect {
        (*self).dialect()
    }

    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send {
        (*self).query(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (*self).execute(sql, params)
    }

    fn insert_returning(
        &self,
        sql: &str,
        params: &[Value],
        generated_column: &str,
    ) -> impl std::future::Future<Output = OrmResult<i64>> + Send {
        (*self).insert_returning(sql, params, generated_column)
    }
}

impl QueryBuilder {
    /// Compile a SELECT, run it, and map every row through `transform`.
    pub async fn find_all<T>(
        &self,
        exec: &impl Executor,
        params: &[Value],
        transform: impl RowTransform<T>,
    ) -> OrmResult<Vec<T>> {
        let compiled = self.compile_select(exec.dialect())?;
        let rows = run_query(exec, &compiled, params).await?;
        rows.iter().map(|row| transform(row)).collect()
    }

    /// Compile a SELECT forced to `LIMIT 1`, run it, and map the row.
    pub async fn find<T>(
        &self,
        exec: &impl Executor,
        params: &[Value],
        transform: impl RowTransform<T>,
    ) -> OrmResult<Option<T>> {
        let compiled = self.compile_select_one(exec.dialect())?;
        let bound = compiled.bind(params)?;
        let row = exec.query_opt(&compiled.sql, &bound).await?;
        row.as_ref().map(|r| transform(r)).transpose()
    }

    /// Run a SELECT and collect one named column across all rows.
    pub async fn find_column(
        &self,
        exec: &impl Executor,
        params: &[Value],
        column: &str,
    ) -> OrmResult<Vec<Value>> {
        let compiled = self.compile_select(exec.dialect())?;
        let rows = run_query(exec, &compiled, params).await?;
        rows.into_iter()
            .map(|mut row| {
                row.remove(column).ok_or_else(|| {
                    OrmError::validation(format!("column {column:?} missing from result row"))
                })
            })
            .collect()
    }

    /// Run a SELECT limited to one row and return one named cell.
    ///
    /// `Ok(None)` means no row matched; `Ok(Some(Value::Null))` means the
    /// row exists and the cell is NULL.
    pub async fn find_cell(
        &self,
        exec: &impl Executor,
        params: &[Value],
        column: &str,
    ) -> OrmResult<Option<Value>> {
        let compiled = self.compile_select_one(exec.dialect())?;
        let bound = compiled.bind(params)?;
        let row = exec.query_opt(&compiled.sql, &bound).await?;
        match row {
            Some(mut row) => row
                .remove(column)
                .ok_or_else(|| {
                    OrmError::validation(format!("column {column:?} missing from result row"))
                })
                .map(Some),
            None => Ok(None),
        }
    }

    /// Count matching rows with a `count(1)` projection.
    ///
    /// The column list, ordering, pagination, and DISTINCT of the builder
    /// are replaced for the count; everything else is kept.
    pub async fn count(&self, exec: &impl Executor, params: &[Value]) -> OrmResult<i64> {
        let mut counted = self.clone();
        counted.select_columns = vec![ColumnExpr {
            expr: "count(1)".to_string(),
            alias: Some("num".to_string()),
        }];
        counted.distinct = false;
        counted.order_by.clear();
        counted.limit = None;

        let compiled = counted.compile_select(exec.dialect())?;
        let bound = compiled.bind(params)?;
        let row = exec.query_one(&compiled.sql, &bound).await?;
        match row.get("num") {
            Some(Value::Int(n)) => Ok(*n),
            Some(other) => Err(OrmError::Execution(format!(
                "count(1) returned a non-integer value: {other}"
            ))),
            None => Err(OrmError::validation("count(1) column missing from result")),
        }
    }

    /// Compile and run an INSERT, returning the generated key from
    /// `generated_column`, or the affected row count when `None`.
    pub async fn insert(
        &self,
        exec: &impl Executor,
        params: &[Value],
        generated_column: Option<&str>,
    ) -> OrmResult<i64> {
        let compiled = self.compile_action(SqlAction::Insert, exec.dialect())?;
        let bound = compiled.bind(params)?;
        debug!(sql = %compiled.sql, "executing insert");
        match generated_column {
            Some(column) => exec.insert_returning(&compiled.sql, &bound, column).await,
            None => Ok(exec.execute(&compiled.sql, &bound).await? as i64),
        }
    }

    /// Compile and run an UPDATE, returning the affected row count.
    pub async fn update(&self, exec: &impl Executor, params: &[Value]) -> OrmResult<u64> {
        self.execute_action(exec, SqlAction::Update, params).await
    }

    /// Compile and run a DELETE, returning the affected row count.
    pub async fn delete(&self, exec: &impl Executor, params: &[Value]) -> OrmResult<u64> {
        self.execute_action(exec, SqlAction::Delete, params).await
    }

    /// Compile once and run with the given action.
    pub async fn execute_action(
        &self,
        exec: &impl Executor,
        action: SqlAction,
        params: &[Value],
    ) -> OrmResult<u64> {
        let compiled = self.compile_action(action, exec.dialect())?;
        let bound = compiled.bind(params)?;
        debug!(sql = %compiled.sql, action = %action, "executing statement");
        exec.execute(&compiled.sql, &bound).await
    }

    /// Compile once and run repeatedly, consuming `chunk_size` dynamic
    /// arguments per execution. `params.len()` must be a multiple of
    /// `chunk_size`.
    pub async fn batch_execute(
        &self,
        exec: &impl Executor,
        action: SqlAction,
        params: &[Value],
        chunk_size: usize,
    ) -> OrmResult<Vec<u64>> {
        if chunk_size == 0 {
            return Err(OrmError::validation("batch chunk size must be positive"));
        }
        if params.len() % chunk_size != 0 {
            return Err(OrmError::validation(format!(
                "batch parameter count {} is not a multiple of chunk size {chunk_size}",
                params.len()
            )));
        }

        let compiled = self.compile_action(action, exec.dialect())?;
        let mut affected = Vec::with_capacity(params.len() / chunk_size);
        for chunk in params.chunks(chunk_size) {
            let bound = compiled.bind(chunk)?;
            affected.push(exec.execute(&compiled.sql, &bound).await?);
        }
        Ok(affected)
    }
}

async fn run_query(
    exec: &impl Executor,
    compiled: &CompiledSql,
    params: &[Value],
) -> OrmResult<Vec<Row>> {
    let bound = compiled.bind(params)?;
    debug!(sql = %compiled.sql, params = bound.len(), "executing query");
    exec.query(&compiled.sql, &bound).await
}
