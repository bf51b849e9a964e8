use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Identifies the listing an extraction error came from. Name and url are
/// filled in as soon as the heading has been read, so later failures carry
/// them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingContext {
    pub source: String,
    pub index: usize,
    pub name: Option<String>,
    pub url: Option<String>,
}

impl fmt::Display for ListingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source, self.index)?;
        if let Some(name) = &self.name {
            write!(f, " \"{}\"", name)?;
        }
        if let Some(url) = &self.url {
            write!(f, " <{}>", url)?;
        }
        Ok(())
    }
}

/// A required field could not be extracted; the listing is skipped.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{context}: missing required {field}")]
    MissingField {
        field: &'static str,
        context: ListingContext,
    },
    #[error("{context}: malformed {field}: {detail}")]
    MalformedField {
        field: &'static str,
        detail: String,
        context: ListingContext,
    },
}

impl ExtractionError {
    pub fn context(&self) -> &ListingContext {
        match self {
            Self::MissingField { context, .. } | Self::MalformedField { context, .. } => context,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field, .. } | Self::MalformedField { field, .. } => field,
        }
    }
}

/// Free-text time range that could not be parsed. Recovered inside
/// `parser::hours::normalize`.
#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("expected exactly two times around the separator in '{0}'")]
    Separator(String),
    #[error("offset of {0} hours is out of range")]
    Offset(i64),
    #[error("unparseable clock time '{input}': {source}")]
    Clock {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Post-processing preconditions. Fatal: filtering never runs without a
/// usable allow-list.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no zipcode allow-list configured (set zipcodes_path or pass --zipcodes)")]
    NoAllowList,
    #[error("column '{column}' not found in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },
    #[error("zipcode allow-list column '{column}' is empty")]
    EmptyAllowList { column: String },
    #[error("invalid zipcode '{value}' in allow-list column '{column}'")]
    InvalidZipcode { column: String, value: String },
    #[error("reading allow-list: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Triples input did not have the expected shape.
#[derive(Debug, Error)]
pub enum TripleError {
    #[error("{} has no header row", .path.display())]
    MissingHeader { path: PathBuf },
    #[error("{} has {found} columns, expected exactly 3", .path.display())]
    WrongColumnCount { path: PathBuf, found: usize },
}
