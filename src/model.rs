// Core structs: ProductRecord, Dataset, QueryOutcome
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// One row of the dealer price sheet.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub dealer_id: String,
    /// Full product name as listed by the dealer. Rows without one never match.
    pub name: Option<String>,
    pub brand: String,
    pub cat: String,
    pub price: f64,
    /// Remaining sheet columns, carried through untouched.
    pub extras: Vec<(String, String)>,
}

/// An immutable snapshot of the price sheet. Reloads produce a whole new
/// `Dataset`; nothing mutates one in place.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ProductRecord>,
    /// Header names of the passthrough columns, in sheet order.
    pub extra_columns: Vec<String>,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How a query is matched against product names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The whole query must appear in the name, case-insensitively.
    Phrase,
    /// Any whitespace-separated word of the query is enough.
    AnyWord,
}

/// Result of a floor price query. `NoMatches` is a legitimate outcome,
/// kept apart from errors so callers can render "no results" instead.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Matches(Vec<ProductRecord>),
    NoMatches,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query is blank")]
    Blank,
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read price sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("price sheet has no header row")]
    EmptySheet,
    #[error("price sheet is missing required column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("username already exists")]
    UsernameTaken,
}

/// A user account row, minus anything secret.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub created_at: DateTime<Utc>,
}
