//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide add/remove/search APIs over the `Book` table.
//! - Keep SQL text and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Every statement binds caller values as parameters.
//! - Absence is `Ok(None)`, never an error.
//! - `search_general` in `SearchMode::All` never yields an empty list.
//! - Each mutating call commits on its own (SQLite auto-commit).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::book::{BookId, NewBook};
use crate::model::field::{BookField, FieldParseError, FieldSelection};
use crate::model::row::{BookRow, FieldValue, RowConversionError};
use crate::repo::condition::Condition;
use log::{debug, info};
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_TABLE: &str = "Book";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Caller field input could not be resolved to columns.
    Field(FieldParseError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be decoded into the requested read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Field(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "book repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "book repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "book repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Field(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<FieldParseError> for RepoError {
    fn from(value: FieldParseError) -> Self {
        Self::Field(value)
    }
}

impl From<RowConversionError> for RepoError {
    fn from(value: RowConversionError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// How many rows `search_general` should hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// First fetched row only.
    One,
    /// Every matching row.
    #[default]
    All,
}

/// Non-empty result of `search_general`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHits {
    One(BookRow),
    Many(Vec<BookRow>),
}

impl SearchHits {
    pub fn into_rows(self) -> Vec<BookRow> {
        match self {
            Self::One(row) => vec![row],
            Self::Many(rows) => rows,
        }
    }

    pub fn into_first(self) -> Option<BookRow> {
        self.into_rows().into_iter().next()
    }
}

/// Repository interface for book operations.
///
/// Implementors provide insert, the two generic executors and last-id
/// resolution; the keyed operations are expressed through them.
pub trait BookRepository {
    /// Inserts one row and returns its database-assigned key.
    ///
    /// No duplicate check: identical payloads create distinct rows.
    fn add_book(&self, book: &NewBook) -> RepoResult<BookId>;

    /// Deletes every row matching `condition` and returns how many went away.
    fn remove_general(&self, condition: &Condition) -> RepoResult<usize>;

    /// Runs a SELECT over `condition` projected to `fields`.
    ///
    /// Returns `None` when nothing matches.
    fn search_general(
        &self,
        condition: &Condition,
        fields: &FieldSelection,
        mode: SearchMode,
    ) -> RepoResult<Option<SearchHits>>;

    /// Key of the most recently inserted book.
    ///
    /// Prefers the id of the immediately preceding insert through this
    /// repository; otherwise falls back to the largest key in the table.
    fn last_id(&self) -> RepoResult<Option<BookId>>;

    fn remove_by_id(&self, book_id: BookId) -> RepoResult<usize> {
        self.remove_general(&Condition::where_book_id(book_id))
    }

    /// Deletes every row matching the exact triple, not just one.
    fn remove_by_title_author(
        &self,
        title: &str,
        author_name: &str,
        author_surname: &str,
    ) -> RepoResult<usize> {
        self.remove_general(&Condition::where_title_author(
            title,
            author_name,
            author_surname,
        ))
    }

    /// Returns `fields` of the last inserted book, or `None` for an empty table.
    fn get_last(&self, fields: &FieldSelection) -> RepoResult<Option<BookRow>> {
        match self.last_id()? {
            Some(book_id) => self.search_by_id(book_id, fields),
            None => Ok(None),
        }
    }

    fn is_in_database(
        &self,
        title: &str,
        author_name: &str,
        author_surname: &str,
    ) -> RepoResult<bool> {
        Ok(self
            .search_by_title_author(title, author_name, author_surname, &FieldSelection::all())?
            .is_some())
    }

    /// Key of a matching row; which one is unspecified when the triple is
    /// not unique.
    fn search_id_by_title_author(
        &self,
        title: &str,
        author_name: &str,
        author_surname: &str,
    ) -> RepoResult<Option<BookId>> {
        let row = self.search_by_title_author(
            title,
            author_name,
            author_surname,
            &FieldSelection::single(BookField::BookPk),
        )?;
        Ok(row.and_then(|row| row.book_id()))
    }

    fn search_by_title_author(
        &self,
        title: &str,
        author_name: &str,
        author_surname: &str,
        fields: &FieldSelection,
    ) -> RepoResult<Option<BookRow>> {
        let condition = Condition::where_title_author(title, author_name, author_surname);
        self.search_one(&condition, fields)
    }

    fn search_by_id(&self, book_id: BookId, fields: &FieldSelection) -> RepoResult<Option<BookRow>> {
        self.search_one(&Condition::where_book_id(book_id), fields)
    }

    fn search_one(
        &self,
        condition: &Condition,
        fields: &FieldSelection,
    ) -> RepoResult<Option<BookRow>> {
        Ok(self
            .search_general(condition, fields, SearchMode::One)?
            .and_then(SearchHits::into_first))
    }
}

/// SQLite-backed book repository.
///
/// Remembers the key of its own latest insert until the next statement it
/// executes, the way a database cursor reports its last row id.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
    last_insert_id: Cell<Option<BookId>>,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` for a foreign schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_book_connection_ready(conn)?;
        Ok(Self {
            conn,
            last_insert_id: Cell::new(None),
        })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn add_book(&self, book: &NewBook) -> RepoResult<BookId> {
        self.last_insert_id.set(None);
        self.conn.execute(
            "INSERT INTO Book (
                title,
                author_name,
                author_surname,
                pages,
                genre,
                owned,
                tags
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                book.title.as_str(),
                book.author_name.as_str(),
                book.author_surname.as_str(),
                book.pages,
                book.genre.as_str(),
                book.owned,
                book.tags.as_deref(),
            ],
        )?;

        let book_id = self.conn.last_insert_rowid();
        self.last_insert_id.set(Some(book_id));
        info!("event=book_add module=repo status=ok book_pk={book_id}");
        Ok(book_id)
    }

    fn remove_general(&self, condition: &Condition) -> RepoResult<usize> {
        self.last_insert_id.set(None);
        let sql = format!("DELETE FROM Book{};", condition.where_sql());
        let removed = self
            .conn
            .execute(&sql, params_from_iter(condition.params()))?;

        info!(
            "event=book_remove module=repo status=ok filtered={} removed={}",
            !condition.is_empty(),
            removed
        );
        Ok(removed)
    }

    fn search_general(
        &self,
        condition: &Condition,
        fields: &FieldSelection,
        mode: SearchMode,
    ) -> RepoResult<Option<SearchHits>> {
        self.last_insert_id.set(None);
        let columns = fields.columns();
        let sql = format!(
            "SELECT {} FROM Book{};",
            fields.projection(),
            condition.where_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(condition.params()))?;

        let hits = match mode {
            SearchMode::One => match rows.next()? {
                Some(row) => Some(SearchHits::One(parse_book_row(row, columns)?)),
                None => None,
            },
            SearchMode::All => {
                let mut found = Vec::new();
                while let Some(row) = rows.next()? {
                    found.push(parse_book_row(row, columns)?);
                }
                if found.is_empty() {
                    None
                } else {
                    Some(SearchHits::Many(found))
                }
            }
        };

        debug!(
            "event=book_search module=repo status=ok mode={:?} columns={} hits={}",
            mode,
            columns.len(),
            hits.as_ref().map_or(0, |hits| match hits {
                SearchHits::One(_) => 1,
                SearchHits::Many(rows) => rows.len(),
            })
        );
        Ok(hits)
    }

    fn last_id(&self) -> RepoResult<Option<BookId>> {
        if let Some(book_id) = self.last_insert_id.take() {
            return Ok(Some(book_id));
        }

        let max_id = self
            .conn
            .query_row("SELECT MAX(book_pk) FROM Book;", [], |row| {
                row.get::<_, Option<BookId>>(0)
            })?;
        Ok(max_id)
    }
}

fn parse_book_row(row: &Row<'_>, columns: &[BookField]) -> RepoResult<BookRow> {
    let mut values = Vec::with_capacity(columns.len());
    for (index, field) in columns.iter().copied().enumerate() {
        let value = match row.get_ref(index)? {
            ValueRef::Null => FieldValue::Null,
            ValueRef::Integer(value) if field == BookField::Owned => match value {
                0 => FieldValue::Bool(false),
                1 => FieldValue::Bool(true),
                other => {
                    return Err(RepoError::InvalidData(format!(
                        "invalid owned value `{other}` in Book.owned"
                    )));
                }
            },
            ValueRef::Integer(value) => FieldValue::Integer(value),
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    RepoError::InvalidData(format!("non UTF-8 text in Book.{field}"))
                })?;
                FieldValue::Text(text.to_string())
            }
            ValueRef::Real(_) | ValueRef::Blob(_) => {
                return Err(RepoError::InvalidData(format!(
                    "unsupported value type in Book.{field}"
                )));
            }
        };
        values.push((field, value));
    }
    Ok(BookRow::new(values))
}

fn ensure_book_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, BOOK_TABLE)? {
        return Err(RepoError::MissingRequiredTable(BOOK_TABLE));
    }

    for field in BookField::ALL {
        let column = field.column_name();
        if !table_has_column(conn, BOOK_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: BOOK_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
