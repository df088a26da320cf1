//! `MockLookup` — a scriptable test double for `LookupProvider`.
//!
//! Each key can be told to return, fail, answer late, or panic. Every call is
//! recorded so tests can assert how often (and for which keys) the provider
//! was hit.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::{DomainError, LookupProvider};

/// Behaviour injected into `MockLookup` for a single key.
#[derive(Debug, Clone)]
pub enum MockBehaviour<E> {
    /// Return a specific value immediately.
    Return(E),
    /// Return a specific value after sleeping.
    Delayed(Duration, E),
    /// Fail with the given error.
    Fail(DomainError),
    /// Fail after sleeping.
    DelayedFail(Duration, DomainError),
    /// Panic inside the lookup.
    Panic(String),
}

/// A mock provider that records every key it is asked for.
///
/// Keys without a scripted behaviour fail with [`DomainError::NotFound`].
#[derive(Debug, Clone)]
pub struct MockLookup<K, E> {
    behaviours: HashMap<K, MockBehaviour<E>>,
    /// All keys seen by this provider (in call order).
    pub calls: Arc<Mutex<Vec<K>>>,
}

impl<K, E> Default for MockLookup<K, E> {
    fn default() -> Self {
        Self {
            behaviours: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<K, E> MockLookup<K, E>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `key` with an arbitrary behaviour.
    pub fn with(mut self, key: K, behaviour: MockBehaviour<E>) -> Self {
        self.behaviours.insert(key, behaviour);
        self
    }

    /// Script `key` to resolve immediately to `value`.
    pub fn returning(self, key: K, value: E) -> Self {
        self.with(key, MockBehaviour::Return(value))
    }

    /// Script `key` to resolve to `value` after `delay`.
    pub fn delayed(self, key: K, delay: Duration, value: E) -> Self {
        self.with(key, MockBehaviour::Delayed(delay, value))
    }

    /// Script `key` to fail with `error`.
    pub fn failing(self, key: K, error: DomainError) -> Self {
        self.with(key, MockBehaviour::Fail(error))
    }

    /// Script `key` to panic with `msg`.
    pub fn panicking(self, key: K, msg: impl Into<String>) -> Self {
        self.with(key, MockBehaviour::Panic(msg.into()))
    }

    /// Total number of lookups performed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of lookups performed for `key`.
    pub fn calls_for(&self, key: &K) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|k| *k == key)
            .count()
    }
}

#[async_trait]
impl<K, E> LookupProvider<K, E> for MockLookup<K, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    async fn get_by_id(&self, key: &K) -> Result<E, DomainError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());

        match self.behaviours.get(key).cloned() {
            Some(MockBehaviour::Return(value)) => Ok(value),
            Some(MockBehaviour::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Some(MockBehaviour::Fail(err)) => Err(err),
            Some(MockBehaviour::DelayedFail(delay, err)) => {
                tokio::time::sleep(delay).await;
                Err(err)
            }
            Some(MockBehaviour::Panic(msg)) => panic!("{msg}"),
            None => Err(DomainError::NotFound),
        }
    }
}
