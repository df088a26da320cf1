//! Repository implementations — one type per table.
//!
//! Every operation returns `Result<T, DomainError>`; a missing row is
//! `DomainError::NotFound`.

pub mod articles;
pub mod authors;
