//! Concurrent fan-out: one lookup task per distinct key.
//!
//! Every key yields exactly one [`LookupOutcome`] on the returned channel, in
//! completion order. Tasks are admitted through a semaphore so at most
//! `max_in_flight` provider calls run at once, however large the batch.

use std::any::Any;
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use domain::LookupProvider;

use crate::LookupFailure;

/// The result of resolving one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome<K, E> {
    pub key: K,
    pub result: Result<E, LookupFailure>,
}

/// Spawn one lookup per key and return the completion channel.
///
/// The channel is buffered to the number of keys, so a task finishing after
/// the receiver stopped listening never blocks; its send fails and the
/// outcome is discarded. An empty key list returns a channel that is already
/// closed.
pub fn fan_out<K, E, P>(
    keys: Vec<K>,
    provider: Arc<P>,
    max_in_flight: usize,
) -> mpsc::Receiver<LookupOutcome<K, E>>
where
    K: Debug + Send + Sync + 'static,
    E: Send + 'static,
    P: LookupProvider<K, E> + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel(keys.len().max(1));
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));

    for key in keys {
        let tx = tx.clone();
        let provider = Arc::clone(&provider);
        let permits = Arc::clone(&permits);

        tokio::spawn(async move {
            // The semaphore is never closed, so acquiring only ever waits.
            let _permit = permits.acquire_owned().await.ok();
            let result = resolve(provider.as_ref(), &key).await;

            if let Err(err) = &result {
                warn!(key = ?key, error = %err, "lookup failed; leaving reference unresolved");
            }

            if let Err(mpsc::error::SendError(late)) = tx.send(LookupOutcome { key, result }).await {
                debug!(key = ?late.key, "guard stopped draining; discarding late outcome");
            }
        });
    }

    rx
}

/// Run a single provider call with any panic captured as a failure, whether
/// it is raised while building the lookup future or while polling it.
async fn resolve<K, E, P>(provider: &P, key: &K) -> Result<E, LookupFailure>
where
    K: Send + Sync + 'static,
    P: LookupProvider<K, E> + ?Sized,
{
    let lookup = async move { provider.get_by_id(key).await };
    match AssertUnwindSafe(lookup).catch_unwind().await {
        Ok(result) => result.map_err(LookupFailure::from),
        Err(payload) => Err(LookupFailure::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    use domain::mock::MockLookup;
    use domain::DomainError;

    /// Panics while constructing the lookup for key 2, before any future exists.
    struct PanicsOnCall;

    impl LookupProvider<i64, u8> for PanicsOnCall {
        fn get_by_id<'a, 'b, 'f>(
            &'a self,
            key: &'b i64,
        ) -> Pin<Box<dyn Future<Output = Result<u8, DomainError>> + Send + 'f>>
        where
            'a: 'f,
            'b: 'f,
            Self: 'f,
        {
            if *key == 2 {
                panic!("connection pool poisoned");
            }
            Box::pin(async { Ok(1) })
        }
    }

    async fn collect_all<K, E>(mut rx: mpsc::Receiver<LookupOutcome<K, E>>) -> Vec<LookupOutcome<K, E>> {
        let mut out = Vec::new();
        while let Some(outcome) = rx.recv().await {
            out.push(outcome);
        }
        out
    }

    #[tokio::test]
    async fn one_outcome_per_key() {
        let mock = Arc::new(
            MockLookup::new()
                .returning(1_i64, "a")
                .returning(2, "b")
                .returning(3, "c"),
        );

        let outcomes = collect_all(fan_out(vec![1, 2, 3], Arc::clone(&mock), 8)).await;

        let mut keys: Vec<i64> = outcomes.iter().map(|o| o.key).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn empty_key_list_closes_immediately() {
        let mock = Arc::new(MockLookup::<i64, ()>::new());
        let outcomes = collect_all(fan_out(Vec::new(), Arc::clone(&mock), 4)).await;
        assert!(outcomes.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn failure_does_not_affect_siblings() {
        let mock = Arc::new(
            MockLookup::new()
                .returning(1_i64, 10_u32)
                .failing(2, DomainError::Internal("boom".into())),
        );

        let outcomes = collect_all(fan_out(vec![1, 2], mock, 2)).await;
        let ok = outcomes.iter().find(|o| o.key == 1).expect("outcome for 1");
        let bad = outcomes.iter().find(|o| o.key == 2).expect("outcome for 2");

        assert_eq!(ok.result, Ok(10));
        assert_eq!(
            bad.result,
            Err(LookupFailure::Provider(DomainError::Internal("boom".into())))
        );
    }

    #[tokio::test]
    async fn panic_is_captured_as_an_outcome() {
        let mock = Arc::new(
            MockLookup::new()
                .returning(1_i64, 1_u8)
                .panicking(2, "provider exploded"),
        );

        let outcomes = collect_all(fan_out(vec![1, 2], mock, 2)).await;
        assert_eq!(outcomes.len(), 2);

        let panicked = outcomes.iter().find(|o| o.key == 2).expect("outcome for 2");
        assert_eq!(
            panicked.result,
            Err(LookupFailure::Panicked("provider exploded".into()))
        );
    }

    #[tokio::test]
    async fn panic_before_the_future_exists_is_captured() {
        let outcomes = collect_all(fan_out(vec![1_i64, 2], Arc::new(PanicsOnCall), 2)).await;
        assert_eq!(outcomes.len(), 2);

        let ok = outcomes.iter().find(|o| o.key == 1).expect("outcome for 1");
        let panicked = outcomes.iter().find(|o| o.key == 2).expect("outcome for 2");
        assert_eq!(ok.result, Ok(1));
        assert_eq!(
            panicked.result,
            Err(LookupFailure::Panicked("connection pool poisoned".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_arrive_in_completion_order() {
        let mock = Arc::new(
            MockLookup::new()
                .delayed(1_i64, Duration::from_millis(300), ())
                .delayed(2, Duration::from_millis(100), ())
                .delayed(3, Duration::from_millis(200), ()),
        );

        let outcomes = collect_all(fan_out(vec![1, 2, 3], mock, 3)).await;
        let keys: Vec<i64> = outcomes.iter().map(|o| o.key).collect();
        assert_eq!(keys, vec![2, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_lookups_are_capped() {
        let mock = Arc::new(
            MockLookup::new()
                .delayed(1_i64, Duration::from_millis(100), ())
                .delayed(2, Duration::from_millis(100), ())
                .delayed(3, Duration::from_millis(100), ())
                .delayed(4, Duration::from_millis(100), ()),
        );

        let started = tokio::time::Instant::now();
        let outcomes = collect_all(fan_out(vec![1, 2, 3, 4], Arc::clone(&mock), 2)).await;

        // Two waves of two lookups each.
        assert_eq!(outcomes.len(), 4);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(mock.call_count(), 4);
    }
}
