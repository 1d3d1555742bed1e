//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while decoding variable definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A numeric sort code has no matching sort order.
    #[error("unknown variable sort code: {0}")]
    UnknownSortCode(i64),

    /// A sort name has no matching sort order.
    #[error("unknown variable sort: {0}")]
    UnknownSortName(String),

    /// A numeric refresh code has no matching refresh trigger.
    #[error("unknown variable refresh code: {0}")]
    UnknownRefreshCode(i64),

    /// A refresh name has no matching refresh trigger.
    #[error("unknown variable refresh: {0}")]
    UnknownRefreshName(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
