//! `store` crate — in-memory persistence.
//!
//! Implements the repository contracts from the `domain` crate over plain
//! maps behind async locks. No business logic lives here.

pub mod repository;
pub mod seed;

pub use repository::articles::InMemoryArticleRepository;
pub use repository::authors::InMemoryAuthorRepository;
