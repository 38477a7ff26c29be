//! Error types for qbd

use crate::builder::Operation;
use crate::dialect::Dialect;
use thiserror::Error;

/// Result type alias for statement building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type alias for operations that may touch a database.
pub type QbResult<T> = Result<T, QbError>;

/// Errors raised while assembling a statement.
///
/// A builder captures the first of these and returns it from `build()`;
/// every chained call after that is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An empty string was passed where a table or column name was required.
    #[error("Identifier cannot be empty")]
    EmptyIdentifier,

    /// Dialect name outside the supported set.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// Operation name outside SELECT/INSERT/UPDATE/DELETE.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// INSERT built without any column/value pairs.
    #[error("No data provided for INSERT")]
    NoDataForInsert,

    /// UPDATE built without any SET column/value pairs.
    #[error("No data provided for UPDATE")]
    NoDataForUpdate,

    /// A configuration method was called on a builder of the wrong kind.
    #[error("{method}() is not allowed for {operation} statements")]
    WrongSetterForOperation {
        method: &'static str,
        operation: Operation,
    },

    /// Internal invariant: the placeholder generator returned the wrong count.
    #[error("Placeholder generation failed: expected {expected}, got {got}")]
    PlaceholderGeneration { expected: usize, got: usize },

    /// The number of `?` markers in a condition differs from the bound values.
    #[error("Condition '{condition}' has {markers} '?' marker(s), but {args} value(s) were provided")]
    ArgumentCountMismatch {
        condition: String,
        markers: usize,
        args: usize,
    },

    /// Aggregate function names are rendered unquoted and must be plain identifiers.
    #[error("Invalid function name: '{0}'")]
    InvalidFunctionName(String),
}

/// Error types for configuration, pooling and execution.
#[derive(Debug, Error)]
pub enum QbError {
    /// The statement could not be built
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A statement or config targets a dialect this adapter cannot run.
    #[error("Dialect mismatch: expected {expected}, found {found}")]
    DialectMismatch { expected: Dialect, found: Dialect },
}

impl QbError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error was raised before anything reached the database
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
