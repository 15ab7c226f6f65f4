//! Relation resolution: building lookup queries from foreign/primary key
//! correspondence.
//!
//! A [`Relation`] describes how one table's records point at another's and
//! builds the [`QueryBuilder`] that fetches the related side, either for a
//! single source record or for a batch (one `IN` query, per-record matching
//! deferred to the caller).

use crate::error::OrmResult;
use crate::executor::Row;
use crate::qb::{select, QueryBuilder};
use crate::value::Value;

/// The direction of a relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    /// The source record carries the foreign key of the related record.
    BelongsTo,
    /// One related record carries the source's primary key as its foreign key.
    HasOne,
    /// Many related records carry the source's primary key as their foreign key.
    HasMany,
}

/// Metadata for one relation between a source record shape and a related
/// table.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    pub kind: RelationKind,
    /// The related table queries are built against.
    pub table: String,
    /// Foreign key column. For `BelongsTo` it lives on the source record;
    /// for `HasOne`/`HasMany` it lives on the related table.
    pub foreign_key: String,
    /// Primary key column, by the usual convention shared between both
    /// tables' key columns.
    pub primary_key: String,
    /// Extra fixed conditions ANDed onto every generated query.
    pub conditions: Vec<(String, Value)>,
}

impl Relation {
    pub fn new(
        kind: RelationKind,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            foreign_key: foreign_key.into(),
            primary_key: primary_key.into(),
            conditions: Vec::new(),
        }
    }

    /// Add a fixed condition applied to every query this relation builds.
    pub fn with_condition(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    fn base_query(&self) -> OrmResult<QueryBuilder> {
        let mut qb = select(&self.table);
        for (column, value) in &self.conditions {
            qb = qb.where_value(column, value.clone())?;
        }
        Ok(qb)
    }

    /// Build the lookup for one source record.
    ///
    /// Returns `Ok(None)` when the relation is known to be absent — a
    /// `BelongsTo` whose foreign value is NULL, numeric zero, or the empty
    /// string never issues a query. For `HasMany`, `fk_in_many` narrows the
    /// result to one specific related record.
    pub fn query_related(
        &self,
        record: &Row,
        fk_in_many: Option<Value>,
    ) -> OrmResult<Option<QueryBuilder>> {
        match self.kind {
            RelationKind::BelongsTo => {
                let fk = record.get(&self.foreign_key).cloned().unwrap_or(Value::Null);
                if key_absent(&fk) {
                    return Ok(None);
                }
                Ok(Some(
                    self.base_query()?.and_where(&self.primary_key, "=", fk)?,
                ))
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                let pk = record.get(&self.primary_key).cloned().unwrap_or(Value::Null);
                if key_absent(&pk) {
                    return Ok(None);
                }
                let mut qb = self.base_query()?.and_where(&self.foreign_key, "=", pk)?;
                if let Some(related_id) = fk_in_many {
                    qb = qb.and_where(&self.primary_key, "=", related_id)?;
                }
                Ok(Some(qb))
            }
        }
    }

    /// Build one batched lookup for many source records.
    ///
    /// The per-record equality becomes an `IN` over the distinct usable key
    /// values (first-seen order preserved); matching rows back to their
    /// source records is the caller's job after the single query. Returns
    /// `Ok(None)` when no record carries a usable key.
    pub fn query_related_batch(&self, records: &[Row]) -> OrmResult<Option<QueryBuilder>> {
        let (source_column, target_column) = match self.kind {
            RelationKind::BelongsTo => (&self.foreign_key, &self.primary_key),
            RelationKind::HasOne | RelationKind::HasMany => (&self.primary_key, &self.foreign_key),
        };

        let mut keys: Vec<Value> = Vec::new();
        for record in records {
            let key = record.get(source_column).cloned().unwrap_or(Value::Null);
            if key_absent(&key) || keys.contains(&key) {
                continue;
            }
            keys.push(key);
        }
        if keys.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.base_query()?.and_where(
            target_column,
            "IN",
            Value::Array(keys),
        )?))
    }
}

/// The conventions for "this key points nowhere": NULL, integer zero, or an
/// empty string.
fn key_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Int(0) => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn belongs_to() -> Relation {
        Relation::new(RelationKind::BelongsTo, "user", "user_id", "id")
    }

    fn has_many() -> Relation {
        Relation::new(RelationKind::HasMany, "post", "user_id", "id")
    }

    #[test]
    fn belongs_to_builds_pk_filter() {
        let rel = belongs_to();
        let record = row(&[("id", Value::Int(7)), ("user_id", Value::Int(3))]);
        let qb = rel.query_related(&record, None).unwrap().unwrap();
        let compiled = qb.compile(Dialect::MySql).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM `user` WHERE `id` = ?");
        assert_eq!(compiled.static_params, vec![Value::Int(3)]);
    }

    #[test]
    fn belongs_to_absent_keys_build_no_query() {
        let rel = belongs_to();
        for fk in [Value::Null, Value::Int(0), Value::Text(String::new())] {
            let record = row(&[("user_id", fk)]);
            assert!(rel.query_related(&record, None).unwrap().is_none());
        }
        // Missing column counts as NULL.
        assert!(rel.query_related(&Row::new(), None).unwrap().is_none());
    }

    #[test]
    fn has_many_builds_fk_filter() {
        let rel = has_many();
        let record = row(&[("id", Value::Int(5))]);
        let qb = rel.query_related(&record, None).unwrap().unwrap();
        let compiled = qb.compile(Dialect::MySql).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM `post` WHERE `user_id` = ?");
        assert_eq!(compiled.static_params, vec![Value::Int(5)]);
    }

    #[test]
    fn has_many_narrowed_to_one_related_record() {
        let rel = has_many();
        let record = row(&[("id", Value::Int(5))]);
        let qb = rel
            .query_related(&record, Some(Value::Int(99)))
            .unwrap()
            .unwrap();
        let compiled = qb.compile(Dialect::MySql).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM `post` WHERE `user_id` = ? AND `id` = ?"
        );
        assert_eq!(compiled.static_params, vec![Value::Int(5), Value::Int(99)]);
    }

    #[test]
    fn batch_collects_distinct_keys_in_order() {
        let rel = belongs_to();
        let records = vec![
            row(&[("user_id", Value::Int(3))]),
            row(&[("user_id", Value::Int(1))]),
            row(&[("user_id", Value::Int(3))]),
            row(&[("user_id", Value::Null)]),
            row(&[("user_id", Value::Int(0))]),
        ];
        let qb = rel.query_related_batch(&records).unwrap().unwrap();
        let compiled = qb.compile(Dialect::MySql).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM `user` WHERE `id` IN (?, ?)");
        assert_eq!(compiled.static_params, vec![Value::Int(3), Value::Int(1)]);
    }

    #[test]
    fn batch_with_no_usable_keys_builds_no_query() {
        let rel = has_many();
        let records = vec![row(&[("id", Value::Null)]), row(&[("id", Value::Int(0))])];
        assert!(rel.query_related_batch(&records).unwrap().is_none());
    }

    #[test]
    fn fixed_conditions_applied() {
        let rel = has_many().with_condition("deleted", false);
        let record = row(&[("id", Value::Int(5))]);
        let qb = rel.query_related(&record, None).unwrap().unwrap();
        let compiled = qb.compile(Dialect::MySql).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM `post` WHERE `deleted` = ? AND `user_id` = ?"
        );
    }
}
