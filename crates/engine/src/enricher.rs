//! Enrichment orchestrator.
//!
//! `Enricher` is the single entry point the rest of the system uses:
//! 1. Validates the invocation (deadline, concurrency cap).
//! 2. Collects the distinct reference keys of the batch.
//! 3. Fans out one lookup per key through the provider.
//! 4. Drains outcomes under the timeout guard.
//! 5. Merges resolved entities back onto the batch in input order.
//!
//! Only step 1 can fail. Lookup errors, panics, and timeouts leave the
//! affected records unresolved.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use domain::{Enrichable, LookupProvider};

use crate::config::EnrichConfig;
use crate::fanout::fan_out;
use crate::guard::{drain_before, drain_bounded};
use crate::keys::collect_keys;
use crate::merge::{merge, EnrichedBatch, Resolution};
use crate::EnrichError;

/// Resolves foreign references of record batches through one provider.
///
/// Holds no per-call state; one instance can serve any number of concurrent
/// `enrich` calls.
pub struct Enricher<P: ?Sized> {
    provider: Arc<P>,
    config: EnrichConfig,
}

impl<P: ?Sized> Enricher<P> {
    pub fn new(provider: Arc<P>, config: EnrichConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Enrich `batch` and return it with per-record resolution status.
    ///
    /// # Errors
    /// Returns `EnrichError` only when the configuration violates a
    /// precondition; see [`EnrichConfig::validate`].
    #[instrument(skip_all, fields(records = batch.len()))]
    pub async fn enrich<R>(&self, batch: Vec<R>) -> Result<EnrichedBatch<R>, EnrichError>
    where
        R: Enrichable,
        P: LookupProvider<R::Key, R::Entity> + 'static,
    {
        self.run(batch, None).await
    }

    /// Like [`Enricher::enrich`], but stop waiting for lookups at `ceiling`
    /// even if the configured deadline would allow more time.
    ///
    /// # Errors
    /// See [`Enricher::enrich`].
    #[instrument(skip_all, fields(records = batch.len()))]
    pub async fn enrich_before<R>(
        &self,
        batch: Vec<R>,
        ceiling: Instant,
    ) -> Result<EnrichedBatch<R>, EnrichError>
    where
        R: Enrichable,
        P: LookupProvider<R::Key, R::Entity> + 'static,
    {
        self.run(batch, Some(ceiling)).await
    }

    async fn run<R>(
        &self,
        batch: Vec<R>,
        ceiling: Option<Instant>,
    ) -> Result<EnrichedBatch<R>, EnrichError>
    where
        R: Enrichable,
        P: LookupProvider<R::Key, R::Entity> + 'static,
    {
        self.config.validate()?;

        if batch.is_empty() {
            return Ok(EnrichedBatch::default());
        }

        let keys = collect_keys(&batch);
        let expected = keys.len();
        debug!(keys = expected, "resolving distinct references");

        let rx = fan_out(keys, Arc::clone(&self.provider), self.config.max_in_flight);
        let (deadline, policy) = (self.config.deadline, self.config.policy);
        let drained = match ceiling {
            Some(ceiling) => drain_before(rx, expected, deadline, policy, ceiling).await,
            None => drain_bounded(rx, expected, deadline, policy).await,
        };

        if drained.timed_out {
            warn!(
                missing = drained.missing(expected),
                deadline = ?self.config.deadline,
                "deadline elapsed before every lookup finished; leaving the rest unresolved"
            );
        }

        let enriched = merge(batch, drained.outcomes);

        info!(
            resolved = enriched.count(Resolution::Resolved),
            failed = enriched.count(Resolution::Failed),
            missing = enriched.count(Resolution::Missing),
            "enrichment finished"
        );

        Ok(enriched)
    }
}

/// One-shot form of [`Enricher::enrich`].
///
/// # Errors
/// See [`Enricher::enrich`].
pub async fn enrich<R, P>(
    batch: Vec<R>,
    provider: Arc<P>,
    config: EnrichConfig,
) -> Result<EnrichedBatch<R>, EnrichError>
where
    R: Enrichable,
    P: LookupProvider<R::Key, R::Entity> + ?Sized + 'static,
{
    Enricher::new(provider, config).enrich(batch).await
}
