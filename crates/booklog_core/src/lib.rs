//! Core data access for the booklog book store.
//! This crate owns the `Book` schema and every query issued against it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::book::{Book, BookId, NewBook};
pub use model::field::{BookField, FieldParseError, FieldSelection, ALL_FIELDS_MARKER};
pub use model::row::{BookRow, FieldValue, RowConversionError};
pub use repo::book_repo::{
    BookRepository, RepoError, RepoResult, SearchHits, SearchMode, SqliteBookRepository,
};
pub use repo::condition::Condition;
pub use service::book_service::{AddOutcome, BookService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
