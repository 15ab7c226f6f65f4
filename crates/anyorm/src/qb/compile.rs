//! Statement compilation.
//!
//! `compile()` is a pure function over the builder state: it renders the
//! action clause, walks the decoration clauses in the fixed order JOIN,
//! WHERE, GROUP BY, HAVING, ORDER BY, and finally applies the dialect's
//! pagination rewrite. The ORDER BY fragment is rendered separately from the
//! statement body so the SQL Server and Oracle rewrites can reposition it
//! structurally instead of scanning the rendered text.

use crate::clause::SubExpr;
use crate::compiled::CompiledSql;
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::qb::{QueryBuilder, SqlAction, TableRef, TableSource};
use crate::quote::Quoter;
use crate::value::Value;
use tracing::debug;

impl QueryBuilder {
    /// Compile with the builder's default action.
    pub fn compile(&self, dialect: Dialect) -> OrmResult<CompiledSql> {
        self.compile_action(self.action, dialect)
    }

    /// Compile the clause state into dialect-correct SQL text plus the
    /// ordered static parameter sequence.
    ///
    /// Idempotent: compiling an unmutated builder repeatedly yields
    /// byte-identical output.
    pub fn compile_action(&self, action: SqlAction, dialect: Dialect) -> OrmResult<CompiledSql> {
        self.where_clause.validate("WHERE")?;
        self.having_clause.validate("HAVING")?;

        let quoter = Quoter::new(dialect);
        let mut params: Vec<Value> = Vec::new();

        let sql = match action {
            SqlAction::Select => self.render_select(&quoter, &mut params)?,
            SqlAction::Insert => self.render_insert(&quoter, &mut params)?,
            SqlAction::Update => {
                let mut sql = self.render_update(&quoter, &mut params)?;
                sql.push_str(&self.render_where(&quoter, &mut params)?);
                sql.push_str(&self.render_mutation_limit(dialect, action)?);
                sql
            }
            SqlAction::Delete => {
                let mut sql = format!(
                    "DELETE FROM {}",
                    render_table(&quoter, &mut params, self.table_ref()?)?
                );
                sql.push_str(&self.render_where(&quoter, &mut params)?);
                sql.push_str(&self.render_mutation_limit(dialect, action)?);
                sql
            }
        };

        debug!(
            action = %action,
            dialect = %dialect,
            params = params.len(),
            sql = %sql,
            "compiled statement"
        );

        Ok(CompiledSql::new(sql, params))
    }

    /// Compile a SELECT statement.
    pub fn compile_select(&self, dialect: Dialect) -> OrmResult<CompiledSql> {
        self.compile_action(SqlAction::Select, dialect)
    }

    /// Compile a SELECT statement forced to return at most one row.
    pub fn compile_select_one(&self, dialect: Dialect) -> OrmResult<CompiledSql> {
        let mut one = self.clone();
        one.limit = Some((1, 0));
        one.compile_action(SqlAction::Select, dialect)
    }

    fn table_ref(&self) -> OrmResult<&TableRef> {
        self.table
            .as_ref()
            .ok_or_else(|| OrmError::validation("no target table specified"))
    }

    // ==================== SELECT ====================

    fn render_select(&self, q: &Quoter, params: &mut Vec<Value>) -> OrmResult<String> {
        let mut body = self.render_columns(q);
        body.push_str(" FROM ");
        body.push_str(&render_table(q, params, self.table_ref()?)?);
        body.push_str(&self.render_joins(q, params)?);
        body.push_str(&self.render_where(q, params)?);
        body.push_str(&self.render_group_by(q));
        body.push_str(&self.render_having(q, params)?);

        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let order = self.render_order(q);
        self.apply_pagination(q, distinct, body, order)
    }

    fn render_columns(&self, q: &Quoter) -> String {
        if self.select_columns.is_empty() {
            return "*".to_string();
        }
        self.select_columns
            .iter()
            .map(|c| q.quote_column_alias(&c.expr, c.alias.as_deref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_joins(&self, q: &Quoter, params: &mut Vec<Value>) -> OrmResult<String> {
        let mut out = String::new();
        for join in &self.joins {
            out.push(' ');
            out.push_str(join.kind.as_sql());
            out.push(' ');
            out.push_str(&render_table(q, params, &join.table)?);
            if !join.on.is_empty() {
                out.push_str(" ON ");
                out.push_str(&join.on.render(&mut |expr| render_on_leaf(q, expr))?);
            }
        }
        Ok(out)
    }

    fn render_where(&self, q: &Quoter, params: &mut Vec<Value>) -> OrmResult<String> {
        if self.where_clause.is_empty() {
            return Ok(String::new());
        }
        let rendered = self
            .where_clause
            .render(&mut |expr| render_condition_leaf(q, params, expr))?;
        Ok(format!(" WHERE {rendered}"))
    }

    fn render_group_by(&self, q: &Quoter) -> String {
        if self.group_by.is_empty() {
            return String::new();
        }
        let cols = self
            .group_by
            .iter()
            .map(|c| q.quote_column(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(" GROUP BY {cols}")
    }

    fn render_having(&self, q: &Quoter, params: &mut Vec<Value>) -> OrmResult<String> {
        if self.having_clause.is_empty() {
            return Ok(String::new());
        }
        let rendered = self
            .having_clause
            .render(&mut |expr| render_condition_leaf(q, params, expr))?;
        Ok(format!(" HAVING {rendered}"))
    }

    /// Render the ORDER BY fragment, kept separate from the body so
    /// pagination rewrites can reposition it.
    fn render_order(&self, q: &Quoter) -> Option<String> {
        if self.order_by.is_empty() {
            return None;
        }
        let entries = self
            .order_by
            .iter()
            .map(|o| match o.dir {
                Some(dir) => format!("{} {}", q.quote_column(&o.column), dir.as_sql()),
                None => q.quote_column(&o.column),
            })
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("ORDER BY {entries}"))
    }

    // ==================== Pagination ====================

    /// Assemble the final SELECT, rewriting the stored `(count, offset)`
    /// pair into the dialect's statement shape.
    fn apply_pagination(
        &self,
        q: &Quoter,
        distinct: &str,
        body: String,
        order: Option<String>,
    ) -> OrmResult<String> {
        let plain = |extra: &str| {
            let mut sql = format!("SELECT {distinct}{body}");
            if let Some(o) = &order {
                sql.push(' ');
                sql.push_str(o);
            }
            sql.push_str(extra);
            sql
        };

        let Some((count, offset)) = self.limit else {
            return Ok(plain(""));
        };

        match q.dialect() {
            Dialect::MySql | Dialect::Sqlite => {
                if offset == 0 {
                    Ok(plain(&format!(" LIMIT {count}")))
                } else {
                    Ok(plain(&format!(" LIMIT {offset}, {count}")))
                }
            }
            Dialect::Postgres => {
                if offset == 0 {
                    Ok(plain(&format!(" LIMIT {count}")))
                } else {
                    Ok(plain(&format!(" LIMIT {count} OFFSET {offset}")))
                }
            }
            Dialect::SqlServer => {
                if offset == 0 {
                    let mut sql = format!("SELECT {distinct}TOP {count} {body}");
                    if let Some(o) = &order {
                        sql.push(' ');
                        sql.push_str(o);
                    }
                    Ok(sql)
                } else {
                    // ROW_NUMBER() requires an ordering; fall back to the
                    // configured column when the builder has none.
                    let over = match &order {
                        Some(o) => o.clone(),
                        None => format!(
                            "ORDER BY {}",
                            q.quote_column(&self.config.fallback_order_column)
                        ),
                    };
                    Ok(format!(
                        "SELECT * FROM (SELECT ROW_NUMBER() OVER ({over}) AS rownum_, \
                         {distinct}{body}) t_ WHERE rownum_ >= {offset} AND rownum_ < {end}",
                        end = offset + count
                    ))
                }
            }
            Dialect::Oracle => {
                let inner = plain("");
                let wrapped = format!(
                    "SELECT t1_.*, ROWNUM rownum_ FROM ({inner}) t1_ WHERE ROWNUM < {end}",
                    end = offset + count
                );
                if offset == 0 {
                    Ok(wrapped)
                } else {
                    Ok(format!(
                        "SELECT * FROM ({wrapped}) t2_ WHERE t2_.rownum_ >= {offset}"
                    ))
                }
            }
            other => Err(OrmError::UnknownDialect(other.to_string())),
        }
    }

    /// LIMIT on UPDATE/DELETE: valid for the MySQL family only.
    fn render_mutation_limit(&self, dialect: Dialect, action: SqlAction) -> OrmResult<String> {
        let Some((count, offset)) = self.limit else {
            return Ok(String::new());
        };
        match dialect {
            Dialect::MySql | Dialect::Sqlite if offset == 0 => Ok(format!(" LIMIT {count}")),
            _ => Err(OrmError::validation(format!(
                "LIMIT is not supported for {action} under {dialect}"
            ))),
        }
    }

    // ==================== INSERT / UPDATE ====================

    fn render_insert(&self, q: &Quoter, params: &mut Vec<Value>) -> OrmResult<String> {
        let table = render_table(q, params, self.table_ref()?)?;

        let (columns, rows): (Vec<&str>, Vec<&[Value]>) = if !self.insert_rows.is_empty() {
            (
                self.insert_columns.iter().map(String::as_str).collect(),
                self.insert_rows.iter().map(Vec::as_slice).collect(),
            )
        } else if !self.sets.is_empty() {
            // set() pairs describe a single row.
            (
                self.sets.iter().map(|(c, _)| c.as_str()).collect(),
                Vec::new(),
            )
        } else {
            return Err(OrmError::validation(
                "INSERT requires set() values or insert rows",
            ));
        };

        let cols = columns
            .iter()
            .map(|c| q.quote_column(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("INSERT INTO {table} ({cols}) VALUES ");

        if rows.is_empty() {
            sql.push('(');
            for (i, (_, value)) in self.sets.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&quote_value(q, params, value)?);
            }
            sql.push(')');
        } else {
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push('(');
                for (j, value) in row.iter().enumerate() {
                    if j > 0 {
                        sql.push_str(", ");
                    }
                    sql.push_str(&quote_value(q, params, value)?);
                }
                sql.push(')');
            }
        }
        Ok(sql)
    }

    fn render_update(&self, q: &Quoter, params: &mut Vec<Value>) -> OrmResult<String> {
        if self.sets.is_empty() {
            return Err(OrmError::validation("UPDATE requires at least one set()"));
        }
        let table = render_table(q, params, self.table_ref()?)?;
        let mut sql = format!("UPDATE {table} SET ");
        for (i, (column, value)) in self.sets.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&q.quote_column(column));
            sql.push_str(" = ");
            sql.push_str(&quote_value(q, params, value)?);
        }
        Ok(sql)
    }
}

/// Render a FROM/JOIN target, compiling sub-query sources recursively and
/// splicing their static parameters in.
fn render_table(q: &Quoter, params: &mut Vec<Value>, table: &TableRef) -> OrmResult<String> {
    match &table.source {
        TableSource::Name(name) => Ok(q.quote_table(name, table.alias.as_deref())),
        TableSource::Query(sub) => {
            let compiled = sub.compile_action(SqlAction::Select, q.dialect())?;
            params.extend(compiled.static_params);
            match &table.alias {
                Some(alias) => Ok(format!("({}) {}", compiled.sql, q.quote_identifier(alias))),
                None => Ok(format!("({})", compiled.sql)),
            }
        }
    }
}

/// Render one WHERE/HAVING predicate.
fn render_condition_leaf(
    q: &Quoter,
    params: &mut Vec<Value>,
    expr: &SubExpr,
) -> OrmResult<String> {
    let column = q.quote_column(&expr.column);
    let value = match (expr.op.as_str(), &expr.value) {
        ("BETWEEN" | "NOT BETWEEN", Value::Array(pair)) if pair.len() == 2 => {
            format!(
                "{} AND {}",
                quote_value(q, params, &pair[0])?,
                quote_value(q, params, &pair[1])?
            )
        }
        _ => quote_value(q, params, &expr.value)?,
    };
    Ok(format!("{column} {} {value}", expr.op))
}

/// Render one JOIN-ON predicate; both sides are columns.
fn render_on_leaf(q: &Quoter, expr: &SubExpr) -> OrmResult<String> {
    let Value::Expr(right) = &expr.value else {
        return Err(OrmError::validation(
            "ON predicate right side must be a column",
        ));
    };
    Ok(format!(
        "{} {} {}",
        q.quote_column(&expr.column),
        expr.op,
        q.quote_column(right)
    ))
}

/// Quote a single value position.
///
/// NULL becomes a literal token (some dialects reject binding NULL
/// positionally); sub-queries compile recursively with their parameters
/// spliced ahead of subsequent outer values; raw expressions pass through;
/// the `Param` marker and every literal render as a placeholder and land in
/// `params`.
fn quote_value(q: &Quoter, params: &mut Vec<Value>, value: &Value) -> OrmResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Expr(sql) => Ok(sql.clone()),
        Value::Query(sub) => {
            let compiled = sub.compile_action(SqlAction::Select, q.dialect())?;
            params.extend(compiled.static_params);
            Ok(format!("({})", compiled.sql))
        }
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(quote_value(q, params, item)?);
            }
            Ok(format!("({})", parts.join(", ")))
        }
        Value::Param => {
            params.push(Value::Param);
            Ok("?".to_string())
        }
        literal => {
            params.push(literal.clone());
            Ok("?".to_string())
        }
    }
}
