//! Tuning knobs for enrichment and the article use case.

use std::time::Duration;

use crate::EnrichError;

/// How the timeout guard measures its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlinePolicy {
    /// Wait up to the deadline for the *next* outcome; the timer is re-armed
    /// after every received outcome.
    #[default]
    PerOutcome,
    /// One deadline for the whole drain, measured from when draining starts.
    Overall,
}

/// Configuration for one enrichment call.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Upper bound on the wait applied by the timeout guard.
    pub deadline: Duration,
    /// Maximum number of lookups running at once.
    pub max_in_flight: usize,
    pub policy: DeadlinePolicy,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(1),
            max_in_flight: 16,
            policy: DeadlinePolicy::PerOutcome,
        }
    }
}

impl EnrichConfig {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline,
            ..Self::default()
        }
    }

    /// Check the invocation preconditions.
    ///
    /// # Errors
    /// - [`EnrichError::InvalidDeadline`] for a zero deadline.
    /// - [`EnrichError::InvalidConcurrency`] for `max_in_flight == 0`.
    pub fn validate(&self) -> Result<(), EnrichError> {
        if self.deadline.is_zero() {
            return Err(EnrichError::InvalidDeadline);
        }
        if self.max_in_flight == 0 {
            return Err(EnrichError::InvalidConcurrency);
        }
        Ok(())
    }
}

/// Configuration for [`crate::ArticleService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Budget for a whole use-case call, enrichment included.
    pub request_timeout: Duration,
    /// Page size used when the caller asks for zero articles.
    pub default_page_size: usize,
    pub enrich: EnrichConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            default_page_size: 10,
            enrich: EnrichConfig::default(),
        }
    }
}
