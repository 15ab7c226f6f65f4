//! Builder configuration.

/// Tunables for query construction.
///
/// A config is attached to every [`QueryBuilder`](crate::QueryBuilder);
/// [`OrmConfig::default`] matches the common vendor limits.
#[derive(Clone, Debug, PartialEq)]
pub struct OrmConfig {
    /// IN-list splitting threshold. A predicate whose `IN` collection has
    /// more values than this is rewritten into OR-combined chunks of at most
    /// `max_in_params - 1` values each.
    pub max_in_params: usize,

    /// Ordering column used when a SQL Server offset rewrite needs an
    /// `ORDER BY` and the builder has none (`ROW_NUMBER()` requires one).
    pub fallback_order_column: String,
}

impl OrmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IN-list splitting threshold.
    pub fn with_max_in_params(mut self, max: usize) -> Self {
        self.max_in_params = max;
        self
    }

    /// Set the fallback ordering column for the SQL Server offset rewrite.
    pub fn with_fallback_order_column(mut self, column: impl Into<String>) -> Self {
        self.fallback_order_column = column.into();
        self
    }
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            max_in_params: 1000,
            fallback_order_column: "id".to_string(),
        }
    }
}
