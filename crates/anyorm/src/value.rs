//! Owned parameter and operand model.
//!
//! [`Value`] is the single currency the builder, compiler, and executor trade
//! in: every predicate operand, every static parameter, and every dynamic
//! argument is a `Value`. Because values are plain owned data (no borrowed
//! driver types), builders clone deeply and compiled statements can be cached
//! and re-bound freely.

use crate::qb::QueryBuilder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A SQL operand or parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// SQL NULL. Rendered as a literal `NULL` token, never bound positionally.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    /// A collection, used as the right side of `IN` / `BETWEEN`.
    Array(Vec<Value>),
    /// A raw SQL expression passed through verbatim (e.g. `count(1)`).
    Expr(String),
    /// A sub-query, compiled recursively and rendered parenthesized.
    Query(Box<QueryBuilder>),
    /// The distinguished placeholder marker: "substitute the next dynamic
    /// argument here" at bind time.
    Param,
}

impl Value {
    /// Create a raw expression value.
    pub fn expr(sql: impl Into<String>) -> Self {
        Value::Expr(sql.into())
    }

    /// Create a sub-query value.
    pub fn query(qb: QueryBuilder) -> Self {
        Value::Query(Box::new(qb))
    }

    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a collection (`Array`).
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Whether this value is an empty collection.
    pub fn is_empty_array(&self) -> bool {
        matches!(self, Value::Array(items) if items.is_empty())
    }
}

impl fmt::Display for Value {
    /// Render the value as a SQL-ish literal. Used by
    /// [`CompiledSql::preview_sql`](crate::CompiledSql::preview_sql) for
    /// logging; not safe for statement text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Uuid(u) => write!(f, "'{u}'"),
            Value::Timestamp(ts) => write!(f, "'{}'", ts.to_rfc3339()),
            Value::Array(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Expr(sql) => write!(f, "{sql}"),
            Value::Query(_) => write!(f, "(<subquery>)"),
            Value::Param => write!(f, "?"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<QueryBuilder> for Value {
    fn from(qb: QueryBuilder) -> Self {
        Value::Query(Box::new(qb))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Into::into).collect())
            }
            // Objects have no scalar SQL form; carry them as JSON text.
            obj @ serde_json::Value::Object(_) => Value::Text(obj.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scalars() {
        assert_eq!(Value::from(1i32), Value::Int(1));
        assert_eq!(Value::from("a"), Value::Text("a".to_string()));
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
        assert_eq!(
            Value::from(vec![1i64, 2]),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn from_json() {
        let v: Value = serde_json::json!([1, "two", null]).into();
        assert_eq!(
            v,
            Value::Array(vec![
                Value::Int(1),
                Value::Text("two".to_string()),
                Value::Null
            ])
        );
    }

    #[test]
    fn display_literals() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Text("o'brien".to_string()).to_string(), "'o''brien'");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "(1, 2)");
    }
}
