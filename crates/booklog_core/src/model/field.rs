//! Column identifiers and projection selection for book searches.
//!
//! # Responsibility
//! - Map `Book` columns to stable SQL column names.
//! - Normalize caller field input (`"All"`, one name, or a list of names)
//!   into a comma-joined SELECT projection.
//!
//! # Invariants
//! - A `FieldSelection` never holds an empty column list, nor the same column
//!   twice.
//! - Column names in projections come only from `BookField`, never from raw
//!   caller text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Marker accepted in text input for "every column".
pub const ALL_FIELDS_MARKER: &str = "All";

static FIELD_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,]+").expect("valid field separator regex"));

/// One column of the `Book` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookField {
    BookPk,
    Title,
    AuthorName,
    AuthorSurname,
    Pages,
    Genre,
    Owned,
    Tags,
}

impl BookField {
    /// Every column in table order.
    pub const ALL: [BookField; 8] = [
        BookField::BookPk,
        BookField::Title,
        BookField::AuthorName,
        BookField::AuthorSurname,
        BookField::Pages,
        BookField::Genre,
        BookField::Owned,
        BookField::Tags,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Self::BookPk => "book_pk",
            Self::Title => "title",
            Self::AuthorName => "author_name",
            Self::AuthorSurname => "author_surname",
            Self::Pages => "pages",
            Self::Genre => "genre",
            Self::Owned => "owned",
            Self::Tags => "tags",
        }
    }
}

impl Display for BookField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for BookField {
    type Err = FieldParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BookField::ALL
            .into_iter()
            .find(|field| field.column_name() == value)
            .ok_or_else(|| FieldParseError::UnknownField(value.to_string()))
    }
}

/// Failure to turn caller field input into a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    /// Input named no column at all.
    Empty,
    /// Input named a column that `Book` does not have.
    UnknownField(String),
}

impl Display for FieldParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "field input names no column"),
            Self::UnknownField(name) => write!(
                f,
                "unknown book field `{name}`; expected `{ALL_FIELDS_MARKER}` or one of book_pk|title|author_name|author_surname|pages|genre|owned|tags"
            ),
        }
    }
}

impl Error for FieldParseError {}

/// Columns a search should return.
///
/// Serialized as the `"All"` marker or a list of column names; deserializes
/// from either a string (parsed like [`FieldSelection::parse`]) or a list of
/// column names. Any other JSON type is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldInput", into = "FieldInput")]
pub struct FieldSelection {
    // None means every column.
    fields: Option<Vec<BookField>>,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self { fields: None }
    }

    pub fn single(field: BookField) -> Self {
        Self {
            fields: Some(vec![field]),
        }
    }

    /// Selects the given columns in the given order.
    ///
    /// A column named more than once is kept at its first position only.
    ///
    /// # Errors
    /// - `FieldParseError::Empty` when `fields` yields nothing.
    pub fn only(fields: impl IntoIterator<Item = BookField>) -> Result<Self, FieldParseError> {
        let mut seen = HashSet::new();
        let fields: Vec<BookField> = fields
            .into_iter()
            .filter(|field| seen.insert(*field))
            .collect();
        if fields.is_empty() {
            return Err(FieldParseError::Empty);
        }
        Ok(Self {
            fields: Some(fields),
        })
    }

    /// Parses text field input.
    ///
    /// Accepts the `"All"` marker, or one or more column names separated by
    /// commas and/or whitespace (`"title"`, `"title, pages"`, `"owned tags"`).
    pub fn parse(input: &str) -> Result<Self, FieldParseError> {
        let trimmed = input.trim();
        if trimmed == ALL_FIELDS_MARKER {
            return Ok(Self::all());
        }

        let fields = FIELD_SEPARATOR_RE
            .split(trimmed)
            .filter(|token| !token.is_empty())
            .map(BookField::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::only(fields)
    }

    pub fn is_all(&self) -> bool {
        self.fields.is_none()
    }

    /// Selected columns in projection order.
    pub fn columns(&self) -> &[BookField] {
        match &self.fields {
            Some(fields) => fields,
            None => &BookField::ALL,
        }
    }

    /// Comma-joined column list for a SELECT statement.
    pub fn projection(&self) -> String {
        self.columns()
            .iter()
            .map(|field| field.column_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl From<BookField> for FieldSelection {
    fn from(value: BookField) -> Self {
        Self::single(value)
    }
}

impl FromStr for FieldSelection {
    type Err = FieldParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum FieldInput {
    Text(String),
    List(Vec<String>),
}

impl TryFrom<FieldInput> for FieldSelection {
    type Error = FieldParseError;

    fn try_from(value: FieldInput) -> Result<Self, Self::Error> {
        match value {
            FieldInput::Text(text) => Self::parse(&text),
            FieldInput::List(names) => Self::only(
                names
                    .iter()
                    .map(|name| BookField::from_str(name.trim()))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        }
    }
}

impl From<FieldSelection> for FieldInput {
    fn from(value: FieldSelection) -> Self {
        match value.fields {
            None => FieldInput::Text(ALL_FIELDS_MARKER.to_string()),
            Some(fields) => FieldInput::List(
                fields
                    .into_iter()
                    .map(|field| field.column_name().to_string())
                    .collect(),
            ),
        }
    }
}
