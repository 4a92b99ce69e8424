//! Book use-case service.
//!
//! # Responsibility
//! - Provide book-level entry points for CLI and other callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository contracts.
//! - Service layer remains storage-agnostic.

use crate::model::book::{Book, BookId, NewBook};
use crate::model::field::FieldSelection;
use crate::model::row::BookRow;
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult, SearchHits, SearchMode};
use crate::repo::condition::Condition;
use log::info;

/// Result of `BookService::add_book_if_absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was inserted with this key.
    Added(BookId),
    /// A row with the same title and author already existed.
    AlreadyPresent(BookId),
}

impl AddOutcome {
    pub fn book_id(self) -> BookId {
        match self {
            Self::Added(book_id) | Self::AlreadyPresent(book_id) => book_id,
        }
    }
}

/// Use-case service wrapper for book operations.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository for projected queries.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Inserts a book without any duplicate check.
    pub fn add_book(&self, book: &NewBook) -> RepoResult<BookId> {
        self.repo.add_book(book)
    }

    /// Inserts a book unless one with the same title and author exists.
    pub fn add_book_if_absent(&self, book: &NewBook) -> RepoResult<AddOutcome> {
        if let Some(existing) = self.repo.search_id_by_title_author(
            &book.title,
            &book.author_name,
            &book.author_surname,
        )? {
            info!(
                "event=book_add module=service status=skipped reason=duplicate book_pk={existing}"
            );
            return Ok(AddOutcome::AlreadyPresent(existing));
        }

        Ok(AddOutcome::Added(self.repo.add_book(book)?))
    }

    /// Most recently inserted book, if any.
    pub fn last_book(&self) -> RepoResult<Option<Book>> {
        let row = self.repo.get_last(&FieldSelection::all())?;
        to_book(row)
    }

    /// Last inserted book projected to text field input (`"All"`,
    /// `"title, pages"`, ...).
    ///
    /// # Errors
    /// - `RepoError::Field` for unknown or empty field input; no statement
    ///   runs in that case.
    pub fn last_projected(&self, fields: &str) -> RepoResult<Option<BookRow>> {
        let fields = FieldSelection::parse(fields)?;
        self.repo.get_last(&fields)
    }

    /// Book with `book_id` projected to text field input.
    pub fn book_projected(&self, book_id: BookId, fields: &str) -> RepoResult<Option<BookRow>> {
        let fields = FieldSelection::parse(fields)?;
        self.repo.search_by_id(book_id, &fields)
    }

    pub fn get_book(&self, book_id: BookId) -> RepoResult<Option<Book>> {
        let row = self.repo.search_by_id(book_id, &FieldSelection::all())?;
        to_book(row)
    }

    pub fn find_book(
        &self,
        title: &str,
        author_name: &str,
        author_surname: &str,
    ) -> RepoResult<Option<Book>> {
        let row = self.repo.search_by_title_author(
            title,
            author_name,
            author_surname,
            &FieldSelection::all(),
        )?;
        to_book(row)
    }

    /// Every stored book; an empty table yields an empty list.
    pub fn list_books(&self) -> RepoResult<Vec<Book>> {
        let hits = self.repo.search_general(
            &Condition::none(),
            &FieldSelection::all(),
            SearchMode::All,
        )?;

        hits.map(SearchHits::into_rows)
            .unwrap_or_default()
            .iter()
            .map(|row| row.to_book().map_err(RepoError::from))
            .collect()
    }

    /// Removes every book matching the title and author; returns the count.
    pub fn remove_book(
        &self,
        title: &str,
        author_name: &str,
        author_surname: &str,
    ) -> RepoResult<usize> {
        self.repo
            .remove_by_title_author(title, author_name, author_surname)
    }
}

fn to_book(row: Option<BookRow>) -> RepoResult<Option<Book>> {
    match row {
        Some(row) => Ok(Some(row.to_book()?)),
        None => Ok(None),
    }
}
