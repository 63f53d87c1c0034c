//! Error types for the membership change pipeline.
//!
//! - [`CsvError`] - the input file could not be read or parsed
//! - [`SchemaError`] - the file parsed but lacks expected columns
//! - [`ValidationError`] - a business rule was violated
//! - [`ConnectionError`] - authentication or connectivity failures
//! - [`ReportError`] - report export failures
//! - [`PipelineError`] - top-level transform errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading the input file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file contents.
    #[error("Failed to decode file: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::ParseError(err.to_string())
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// The file is readable but does not have the expected layout.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// One or more required columns are absent from the header row.
    #[error("Import file not correctly formatted. Missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Business rule that a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// 36-character grouped identifier.
    Identifier,
    /// `YYYY-MM-DDT00:00:00.000` reference date.
    Timestamp,
    /// Mandatory field left blank.
    RequiredField,
}

impl Rule {
    fn message(&self) -> &'static str {
        match self {
            Rule::Identifier => {
                "One of your IDs failed regex validation. Make sure to follow this format \
                 (36 chars) and use A-Z or 0-9 characters: XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX."
            }
            Rule::Timestamp => {
                "One of your timestamps failed regex validation. Make sure to follow the format \
                 below (23 chars) and always use a time value of T00:00:00.000:\n\
                 YYYY-MM-DDT00:00:00.000."
            }
            Rule::RequiredField => {
                "One of your records is missing a required field. Please correct your input.\n\n\
                 Mandatory fields:\n\npeopleMembershipId\npaymentScheduleId\nreferenceDate"
            }
        }
    }
}

/// A business rule violation, located in the source file when possible.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub rule: Rule,
    /// Offending value, if the rule applies to a single value.
    pub value: Option<String>,
    /// 1-based row number, header counted as row 1.
    pub row: Option<usize>,
    /// Full contents of the offending row.
    pub contents: Option<String>,
}

impl ValidationError {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            value: None,
            row: None,
            contents: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn at_row(mut self, row: usize, contents: impl Into<String>) -> Self {
        self.row = Some(row);
        self.contents = Some(contents.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rule.message())?;
        if let Some(value) = &self.value {
            write!(f, "\n\nRejected value: '{}'", value)?;
        }
        match (self.row, &self.contents) {
            (Some(row), Some(contents)) => {
                write!(f, "\n\nConflicting record (row {}):\n\n{}.", row, contents)
            }
            (Some(row), None) => write!(f, "\n\nConflicting record (row {}).", row),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Connection Errors
// =============================================================================

/// Errors talking to the Gym Manager API outside of the upload loop.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Username or password left blank.
    #[error("Either username or password empty.")]
    MissingCredentials,

    /// The API answered `success: false` to the login call.
    #[error("Code: {code}, Message: {message}")]
    Rejected { code: String, message: String },

    /// The connectivity self-test did not answer 200.
    #[error("Connection Failed with error {status}: {body}")]
    TestFailed { status: u16, body: String },

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Response body did not have the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The bearer token cannot be sent as a header.
    #[error("Invalid authorization token: {0}")]
    InvalidToken(String),
}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ConnectionError::RequestFailed(err.to_string())
    }
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while exporting or re-reading a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to write or read the report file.
    #[error("Report IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("Report CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Request body could not be serialized.
    #[error("Report JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Serialized report was not valid UTF-8.
    #[error("Report encoding error: {0}")]
    EncodingError(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level transform errors.
///
/// This is the error type returned by [`crate::transform::pipeline::transform_csv`].
/// File and schema problems are kept apart from rule violations so a caller
/// can tell "wrong file" from "wrong data".
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("Unexpected input: {0}")]
    Csv(#[from] CsvError),

    /// Missing columns.
    #[error("Unexpected input: {0}")]
    Schema(#[from] SchemaError),

    /// Business rule violation.
    #[error("Validation failed\n\n{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for validation checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for API session operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
