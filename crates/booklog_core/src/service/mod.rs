//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Hand callers full `Book` records instead of projected rows.

pub mod book_service;
