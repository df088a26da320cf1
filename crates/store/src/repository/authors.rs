//! Author lookups.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use domain::{Author, AuthorId, DomainError, LookupProvider};

/// Authors keyed by id, with optional simulated latency and outages per id.
#[derive(Debug, Default)]
pub struct InMemoryAuthorRepository {
    rows: RwLock<HashMap<AuthorId, Author>>,
    latency: HashMap<AuthorId, Duration>,
    unavailable: HashSet<AuthorId>,
}

impl InMemoryAuthorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(authors: impl IntoIterator<Item = Author>) -> Self {
        let stamp = Utc::now().to_rfc3339();
        let rows = authors
            .into_iter()
            .map(|mut author| {
                if author.created_at.is_empty() {
                    author.created_at.clone_from(&stamp);
                    author.updated_at.clone_from(&stamp);
                }
                (author.id, author)
            })
            .collect();
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    /// Make every lookup of `id` take `delay`.
    pub fn with_latency(mut self, id: AuthorId, delay: Duration) -> Self {
        self.latency.insert(id, delay);
        self
    }

    /// Make every lookup of `id` fail as if the backing store were down.
    pub fn with_outage(mut self, id: AuthorId) -> Self {
        self.unavailable.insert(id);
        self
    }

    pub async fn insert(&self, author: Author) {
        self.rows.write().await.insert(author.id, author);
    }
}

#[async_trait]
impl LookupProvider<AuthorId, Author> for InMemoryAuthorRepository {
    async fn get_by_id(&self, id: &AuthorId) -> Result<Author, DomainError> {
        if let Some(delay) = self.latency.get(id) {
            debug!(id, ?delay, "simulating slow author lookup");
            tokio::time::sleep(*delay).await;
        }
        if self.unavailable.contains(id) {
            return Err(DomainError::Internal(format!("author store unavailable for id {id}")));
        }

        self.rows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }
}
