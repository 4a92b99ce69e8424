//! Book database bootstrap.
//!
//! # Responsibility
//! - Hand out SQLite connections whose `Book` schema is current.
//! - Report which schema step failed when a database cannot be brought up.
//!
//! # Invariants
//! - The applied schema step is stored in `PRAGMA user_version`.
//! - `SqliteBookRepository` refuses connections that skipped this module.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading a book database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer booklog and may use unknown columns.
    SchemaTooNew { found: u32, supported: u32 },
    /// A schema step failed; nothing from the pending batch was kept.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "book database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "book database uses schema {found}, this build understands up to {supported}"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "book schema step {version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
