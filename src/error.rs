//! Error types for the statement converter.

use crate::types::Marker;
use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing, fetching rates, or rewriting.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing MT940 format.
    #[error("MT940 parsing error at line {line}: {message}")]
    Mt940ParseError { line: usize, message: String },

    /// Invalid date format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// General parsing error.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The exchange-rate service gave no usable rate.
    #[error("Rate lookup failed for {from}->{to} on {date}: {reason}")]
    RateLookup {
        date: NaiveDate,
        from: String,
        to: String,
        reason: String,
    },

    /// Transaction entry lines and parsed records are out of step.
    #[error("Transaction cursor mismatch at line {line}: {message}")]
    CursorMismatch { line: usize, message: String },

    /// A single statement line could not be converted.
    #[error("Cannot convert line {line} ({marker}): {source}")]
    LineConversion {
        line: usize,
        marker: Marker,
        #[source]
        source: Box<Error>,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach the statement line and marker that was being converted.
    pub fn at_line(self, line: usize, marker: Marker) -> Self {
        Error::LineConversion {
            line,
            marker,
            source: Box::new(self),
        }
    }
}
