//! Domain-level error type.

use thiserror::Error;

/// Errors returned by repositories and lookup providers.
///
/// The enrichment engine treats any of these as a soft, per-key failure;
/// the article use case surfaces them to its caller unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The requested item does not exist.
    #[error("your requested item is not found")]
    NotFound,

    /// An item with the same identity already exists.
    #[error("your item already exists")]
    AlreadyExists,

    /// A caller-supplied parameter was rejected.
    #[error("given param is not valid: {0}")]
    BadParamInput(String),

    /// Anything else the backing store reported.
    #[error("internal server error: {0}")]
    Internal(String),
}
