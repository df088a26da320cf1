//! Collaborator contracts.
//!
//! The engine is generic over these; concrete implementations live in the
//! `store` crate (or in tests).

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;

use crate::{Article, DomainError};

/// A primary record that references one foreign entity by key.
pub trait Enrichable {
    /// Identifier of the referenced entity. Many records may share one.
    type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;
    /// The resolved entity written back onto the record.
    type Entity: Clone + Send + 'static;

    /// The key this record wants resolved.
    fn reference_key(&self) -> Self::Key;

    /// Write the resolved entity onto the record.
    fn attach(&mut self, entity: Self::Entity);
}

/// Single-key resolver consumed by the enrichment engine.
///
/// Implementations may perform I/O and may be slow or fail. The engine never
/// retries a call.
#[async_trait]
pub trait LookupProvider<K, E>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Resolve `key` to its entity.
    async fn get_by_id(&self, key: &K) -> Result<E, DomainError>;
}

/// Persistence contract for articles.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Return up to `num` articles after `cursor` plus the cursor of the
    /// next page. An empty cursor starts from the beginning.
    async fn fetch(&self, cursor: &str, num: usize) -> Result<(Vec<Article>, String), DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Article, DomainError>;

    async fn get_by_title(&self, title: &str) -> Result<Article, DomainError>;

    async fn update(&self, article: &Article) -> Result<(), DomainError>;

    /// Persist a new article and return its assigned id.
    async fn store(&self, article: &Article) -> Result<i64, DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}
