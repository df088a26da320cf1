//! Core domain models for the article service.
//!
//! An [`Article`] is the primary record; it references its [`Author`] by id.
//! Until enrichment runs, only `author.id` is meaningful and the rest of the
//! author is left at its default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::Enrichable;

/// Primary key of an author.
pub type AuthorId = i64;

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// The foreign entity articles are enriched with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Author {
    /// An author stub that only carries its id, as loaded alongside an article.
    pub fn reference(id: AuthorId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Convenience constructor for testing and seeding.
    pub fn named(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// `true` while only the id is known.
    pub fn is_unresolved(&self) -> bool {
        self.name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A stored article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Build an unsaved article (id 0) that references `author_id`.
    pub fn new(title: impl Into<String>, content: impl Into<String>, author_id: AuthorId) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            content: content.into(),
            author: Author::reference(author_id),
            updated_at: now,
            created_at: now,
        }
    }
}

impl Enrichable for Article {
    type Key = AuthorId;
    type Entity = Author;

    fn reference_key(&self) -> AuthorId {
        self.author.id
    }

    fn attach(&mut self, author: Author) {
        self.author = author;
    }
}
