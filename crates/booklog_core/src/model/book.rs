//! Book record model.

use serde::{Deserialize, Serialize};

/// Primary key assigned by SQLite on insert.
pub type BookId = i64;

/// Insert payload: every stored column except the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author_name: String,
    pub author_surname: String,
    pub pages: i64,
    pub genre: String,
    /// Stored as NULL when unknown.
    pub owned: Option<bool>,
    /// Free-form tag text, stored verbatim.
    pub tags: Option<String>,
}

impl NewBook {
    /// Creates a payload with `owned` and `tags` left unset.
    pub fn new(
        title: impl Into<String>,
        author_name: impl Into<String>,
        author_surname: impl Into<String>,
        pages: i64,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author_name: author_name.into(),
            author_surname: author_surname.into(),
            pages,
            genre: genre.into(),
            owned: None,
            tags: None,
        }
    }

    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = Some(owned);
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

/// One persisted row of the `Book` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_pk: BookId,
    pub title: String,
    pub author_name: String,
    pub author_surname: String,
    pub pages: i64,
    pub genre: String,
    pub owned: Option<bool>,
    pub tags: Option<String>,
}

impl Book {
    /// Returns the non-key fields as an insert payload.
    ///
    /// Re-inserting the result creates a new, distinct row.
    pub fn to_new_book(&self) -> NewBook {
        NewBook {
            title: self.title.clone(),
            author_name: self.author_name.clone(),
            author_surname: self.author_surname.clone(),
            pages: self.pages,
            genre: self.genre.clone(),
            owned: self.owned,
            tags: self.tags.clone(),
        }
    }
}
