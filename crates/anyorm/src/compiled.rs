//! The compiled statement artifact.
//!
//! [`CompiledSql`] is the boundary object handed to the driver/binding
//! layer: ANSI-ish SQL text with positional `?` placeholders plus the
//! ordered static parameter sequence. It is immutable after construction
//! and may be cached and re-bound against many dynamic argument sets.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Rendered SQL text plus its static parameter sequence.
///
/// `static_params` holds one entry per `?` placeholder in `sql`, in
/// placeholder order. Entries are either literal values fixed at compile
/// time or the [`Value::Param`] marker, which consumes one dynamic argument
/// at [`bind`](CompiledSql::bind) time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledSql {
    pub sql: String,
    pub static_params: Vec<Value>,
}

impl CompiledSql {
    pub(crate) fn new(sql: String, static_params: Vec<Value>) -> Self {
        Self { sql, static_params }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Merge dynamic arguments into the static parameter sequence.
    ///
    /// Literal entries pass through unchanged; each [`Value::Param`] marker
    /// consumes the next dynamic argument in order. Pure and repeatable:
    /// binding never mutates the template, so the same `CompiledSql` can be
    /// bound with different argument sets (e.g. a pagination template bound
    /// per page).
    pub fn bind(&self, dynamic_args: &[Value]) -> OrmResult<Vec<Value>> {
        let markers = self
            .static_params
            .iter()
            .filter(|p| matches!(p, Value::Param))
            .count();
        if dynamic_args.len() != markers {
            return Err(OrmError::bind(format!(
                "statement expects {markers} dynamic argument(s), got {}",
                dynamic_args.len()
            )));
        }

        let mut args = dynamic_args.iter();
        Ok(self
            .static_params
            .iter()
            .map(|p| match p {
                Value::Param => args.next().cloned().unwrap_or(Value::Null),
                other => other.clone(),
            })
            .collect())
    }

    /// Substitute parameters into the SQL text for logging and debugging.
    ///
    /// Placeholders are replaced left to right with the display form of the
    /// corresponding parameter; markers take from `dynamic_args` when
    /// provided. Not injection-safe; never execute the result.
    pub fn preview_sql(&self, dynamic_args: &[Value]) -> String {
        let mut params = self.static_params.iter();
        let mut args = dynamic_args.iter();
        let mut out = String::with_capacity(self.sql.len());
        for ch in self.sql.chars() {
            if ch != '?' {
                out.push(ch);
                continue;
            }
            match params.next() {
                Some(Value::Param) => match args.next() {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => out.push('?'),
                },
                Some(value) => out.push_str(&value.to_string()),
                None => out.push('?'),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> CompiledSql {
        CompiledSql::new(
            "SELECT * FROM user WHERE age > ? AND status = ? AND id = ?".to_string(),
            vec![Value::Int(18), Value::Param, Value::Param],
        )
    }

    #[test]
    fn bind_merges_in_order() {
        let compiled = template();
        let params = compiled
            .bind(&[Value::Text("active".to_string()), Value::Int(7)])
            .unwrap();
        assert_eq!(
            params,
            vec![
                Value::Int(18),
                Value::Text("active".to_string()),
                Value::Int(7)
            ]
        );
    }

    #[test]
    fn bind_is_repeatable() {
        let compiled = template();
        let first = compiled.bind(&[Value::Int(1), Value::Int(2)]).unwrap();
        let second = compiled.bind(&[Value::Int(3), Value::Int(4)]).unwrap();
        assert_ne!(first, second);
        // The template itself is untouched.
        assert_eq!(compiled, template());
    }

    #[test]
    fn bind_arity_checked() {
        let compiled = template();
        assert!(compiled.bind(&[Value::Int(1)]).is_err());
        assert!(
            compiled
                .bind(&[Value::Int(1), Value::Int(2), Value::Int(3)])
                .is_err()
        );
    }

    #[test]
    fn preview_substitutes() {
        let compiled = CompiledSql::new(
            "SELECT * FROM user WHERE name = ? AND age > ?".to_string(),
            vec![Value::Text("alice".to_string()), Value::Param],
        );
        assert_eq!(
            compiled.preview_sql(&[Value::Int(18)]),
            "SELECT * FROM user WHERE name = 'alice' AND age > 18"
        );
    }
}
