//! Parameterized WHERE conditions for book searches and deletes.
//!
//! # Invariants
//! - Caller values never appear in SQL text; they travel as bound `?`
//!   parameters in the same order as the placeholders.

use crate::model::book::BookId;
use rusqlite::types::Value;

/// A WHERE predicate plus the values bound to its placeholders.
///
/// An empty predicate matches every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    predicate: String,
    params: Vec<Value>,
}

impl Condition {
    /// Matches every row.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a custom condition.
    ///
    /// `predicate` is the text after `WHERE` and must use positional `?`
    /// placeholders, one per entry of `params`.
    pub fn new(predicate: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            predicate: predicate.into().trim().to_string(),
            params,
        }
    }

    pub fn where_book_id(book_id: BookId) -> Self {
        Self::new("book_pk = ?", vec![Value::Integer(book_id)])
    }

    pub fn where_title_author(title: &str, author_name: &str, author_surname: &str) -> Self {
        Self::new(
            "title = ? AND author_name = ? AND author_surname = ?",
            vec![
                Value::Text(title.to_string()),
                Value::Text(author_name.to_string()),
                Value::Text(author_surname.to_string()),
            ],
        )
    }

    pub fn is_empty(&self) -> bool {
        self.predicate.is_empty()
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// SQL suffix to append after `FROM Book`: empty, or ` WHERE <predicate>`.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicate)
        }
    }
}
