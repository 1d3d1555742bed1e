//! Application error types

use dashvar_domain::DataQueryError;
use thiserror::Error;

use crate::ports::DataSourceError;

/// Errors produced while resolving a variable's options.
#[derive(Debug, Clone, Error)]
pub enum VariableError {
    /// The datasource could not be resolved.
    #[error("datasource error: {0}")]
    DataSource(#[from] DataSourceError),

    /// The datasource reported a (non-cancelled) query failure.
    #[error("query failed: {0}")]
    Query(#[from] DataQueryError),

    /// The result stream ended before a final snapshot arrived.
    #[error("query stream for request {request_id} ended without a final result")]
    NoTerminalResult {
        /// Correlation id of the request.
        request_id: String,
    },

    /// The datasource resolution was released because the variable was
    /// deactivated. Not a failure: callers should drop the result silently.
    #[error("datasource resolution released")]
    Released,
}

impl VariableError {
    /// Returns true if the resolution ended because the variable was
    /// deactivated, which callers should ignore rather than report.
    #[must_use]
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

/// Result type alias for variable operations.
pub type VariableResult<T> = Result<T, VariableError>;
