//! Error types for anyorm

use thiserror::Error;

/// Result type alias for anyorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query construction, compilation, and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// Invalid predicate at a fluent call site (empty IN collection,
    /// unsupported operator)
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    /// Unbalanced open()/close() grouping detected at compile time
    #[error("Unbalanced group: {0}")]
    UnbalancedGroup(String),

    /// Pagination requested for a dialect with no rewrite rule
    #[error("No pagination rule for dialect: {0}")]
    UnknownDialect(String),

    /// Dynamic argument arity mismatch at bind time
    #[error("Bind error: {0}")]
    Bind(String),

    /// Malformed identifier or builder state
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error passed through from the executor
    #[error("Execution error: {0}")]
    Execution(String),
}

impl OrmError {
    /// Create an invalid predicate error
    pub fn invalid_predicate(message: impl Into<String>) -> Self {
        Self::InvalidPredicate(message.into())
    }

    /// Create an unbalanced group error
    pub fn unbalanced_group(message: impl Into<String>) -> Self {
        Self::UnbalancedGroup(message.into())
    }

    /// Create a bind error
    pub fn bind(message: impl Into<String>) -> Self {
        Self::Bind(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is an invalid predicate error
    pub fn is_invalid_predicate(&self) -> bool {
        matches!(self, Self::InvalidPredicate(_))
    }

    /// Check if this is an unbalanced group error
    pub fn is_unbalanced_group(&self) -> bool {
        matches!(self, Self::UnbalancedGroup(_))
    }

    /// Check if this is an unknown dialect error
    pub fn is_unknown_dialect(&self) -> bool {
        matches!(self, Self::UnknownDialect(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
