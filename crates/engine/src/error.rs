//! Engine-level error types.

use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Fatal errors from an enrichment call.
///
/// Only a malformed invocation ends up here. Per-key lookup failures and
/// timeouts never do; they degrade the output instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnrichError {
    /// The deadline must be strictly positive.
    #[error("enrichment deadline must be greater than zero")]
    InvalidDeadline,

    /// At least one lookup must be allowed in flight.
    #[error("max_in_flight must be at least 1")]
    InvalidConcurrency,
}

/// Why a single key could not be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The provider returned an error.
    #[error("lookup failed: {0}")]
    Provider(#[from] DomainError),

    /// The provider panicked; the panic was contained to this key.
    #[error("lookup panicked: {0}")]
    Panicked(String),
}

/// Errors produced by the article use case.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Repository or single-author lookup error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Precondition failure from the enrichment core.
    #[error("enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    /// The request did not finish within its budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}
