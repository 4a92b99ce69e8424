//! Book domain model and projection types.
//!
//! # Responsibility
//! - Define the canonical `Book` record and its insert payload.
//! - Describe which columns a search projects (`FieldSelection`) and the
//!   shape of projected results (`BookRow`).
//!
//! # Invariants
//! - `book_pk` is assigned by the storage engine, never by callers.
//! - No field is validated for business meaning at this layer.

pub mod book;
pub mod field;
pub mod row;
