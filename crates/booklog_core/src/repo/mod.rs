//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the book data-access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - WHERE conditions are always parameterized (`condition::Condition`).
//! - Repository APIs report absence as `None`, not as an error.

pub mod book_repo;
pub mod condition;
