//! Projected search results.
//!
//! A `BookRow` keeps exactly the columns a search asked for, in the order it
//! asked for them. Only a row carrying every column converts into a `Book`.

use crate::model::book::{Book, BookId};
use crate::model::field::BookField;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One projected column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }
}

/// Why a projected row cannot become a full `Book`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowConversionError {
    MissingField(BookField),
    UnexpectedValue {
        field: BookField,
        found: &'static str,
    },
}

impl Display for RowConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "row does not include `{field}`"),
            Self::UnexpectedValue { field, found } => {
                write!(f, "unexpected {found} value in `{field}`")
            }
        }
    }
}

impl Error for RowConversionError {}

/// Ordered `(column, value)` pairs returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookRow {
    values: Vec<(BookField, FieldValue)>,
}

impl BookRow {
    pub fn new(values: Vec<(BookField, FieldValue)>) -> Self {
        Self { values }
    }

    /// Value of the first occurrence of `field`, if it was projected.
    pub fn get(&self, field: BookField) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = BookField> + '_ {
        self.values.iter().map(|(field, _)| *field)
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.values.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Primary key, when the row projects `book_pk`.
    pub fn book_id(&self) -> Option<BookId> {
        self.get(BookField::BookPk).and_then(FieldValue::as_i64)
    }

    /// Converts a fully projected row into a `Book`.
    pub fn to_book(&self) -> Result<Book, RowConversionError> {
        Ok(Book {
            book_pk: self.required_integer(BookField::BookPk)?,
            title: self.required_text(BookField::Title)?,
            author_name: self.required_text(BookField::AuthorName)?,
            author_surname: self.required_text(BookField::AuthorSurname)?,
            pages: self.required_integer(BookField::Pages)?,
            genre: self.required_text(BookField::Genre)?,
            owned: match self.require(BookField::Owned)? {
                FieldValue::Null => None,
                FieldValue::Bool(value) => Some(*value),
                other => return Err(unexpected(BookField::Owned, other)),
            },
            tags: match self.require(BookField::Tags)? {
                FieldValue::Null => None,
                FieldValue::Text(value) => Some(value.clone()),
                other => return Err(unexpected(BookField::Tags, other)),
            },
        })
    }

    fn require(&self, field: BookField) -> Result<&FieldValue, RowConversionError> {
        self.get(field)
            .ok_or(RowConversionError::MissingField(field))
    }

    fn required_integer(&self, field: BookField) -> Result<i64, RowConversionError> {
        let value = self.require(field)?;
        value.as_i64().ok_or_else(|| unexpected(field, value))
    }

    fn required_text(&self, field: BookField) -> Result<String, RowConversionError> {
        let value = self.require(field)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected(field, value))
    }
}

fn unexpected(field: BookField, value: &FieldValue) -> RowConversionError {
    RowConversionError::UnexpectedValue {
        field,
        found: value.kind(),
    }
}

impl Serialize for BookRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.column_name(), value)?;
        }
        map.end()
    }
}
