//! Error types for schema reconciliation.

/// Errors that can occur while building, diffing or rendering a schema.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// A schema object violates one of its construction invariants.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation without an inverse was asked to reverse itself.
    #[error("Irreversible operation: {0}")]
    IrreversibleOperation(String),

    /// A dialect cannot render the given operation.
    #[error("Operation '{operation}' is not supported by {dialect}")]
    UnsupportedOperation {
        /// Dialect name.
        dialect: &'static str,
        /// Description of the rejected operation.
        operation: String,
    },

    /// A dialect cannot render the given constraint.
    #[error("Constraints of type {constraint} are not supported by {dialect}")]
    UnsupportedConstraint {
        /// Dialect name.
        dialect: &'static str,
        /// Constraint keyword.
        constraint: String,
    },

    /// Database error during introspection or execution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading schema files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReconcileError {
    /// Shorthand for a [`ReconcileError::Validation`].
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
