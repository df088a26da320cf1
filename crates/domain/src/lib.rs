//! `domain` crate — article/author models, the error taxonomy, and the
//! collaborator traits the enrichment engine is written against.
//!
//! Everything that talks to storage (or pretends to) implements one of the
//! traits in [`traits`]. The engine crate only ever sees those traits.

pub mod error;
pub mod models;
pub mod traits;
pub mod mock;

pub use error::DomainError;
pub use models::{Article, Author, AuthorId};
pub use traits::{ArticleRepository, Enrichable, LookupProvider};
