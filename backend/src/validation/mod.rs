//! Business rule validation for membership change records.
//!
//! # Rules
//!
//! - Identifiers (membership, payment schedule, promotion, article) are
//!   36 characters in 8-4-4-4-12 groups of `0-9` / `A-Z`.
//! - Reference dates are midnight timestamps: `YYYY-MM-DDT00:00:00.000`.
//! - `peopleMembershipId`, `paymentScheduleId` and `referenceDate` are
//!   mandatory on every record.
//!
//! Every check fails with a [`ValidationError`]; record-level checks attach
//! the row number and full row contents.
//!
//! # Example
//!
//! ```rust,ignore
//! use gymsync::validation::{is_valid_identifier, is_valid_reference_date};
//!
//! assert!(is_valid_identifier("A1111111-1111-1111-1111-111111111111"));
//! assert!(!is_valid_reference_date("2024-01-01"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Rule, ValidationError, ValidationResult};
use crate::models::Record;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Z]{8}-[0-9A-Z]{4}-[0-9A-Z]{4}-[0-9A-Z]{4}-[0-9A-Z]{12}$")
        .expect("identifier pattern compiles")
});

static REFERENCE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T00:00:00\.000$").expect("timestamp pattern compiles")
});

/// Quick check against the identifier format.
pub fn is_valid_identifier(id: &str) -> bool {
    IDENTIFIER.is_match(id)
}

/// Quick check against the reference date format.
pub fn is_valid_reference_date(timestamp: &str) -> bool {
    REFERENCE_DATE.is_match(timestamp)
}

/// Validate a single identifier.
pub fn validate_identifier(id: &str) -> ValidationResult<()> {
    if is_valid_identifier(id) {
        Ok(())
    } else {
        Err(ValidationError::new(Rule::Identifier).with_value(id))
    }
}

/// Validate a single reference date.
pub fn validate_reference_date(timestamp: &str) -> ValidationResult<()> {
    if is_valid_reference_date(timestamp) {
        Ok(())
    } else {
        Err(ValidationError::new(Rule::Timestamp).with_value(timestamp))
    }
}

/// Validate an identifier that belongs to `record`.
pub fn validate_record_identifier(id: &str, record: &Record) -> ValidationResult<()> {
    validate_identifier(id).map_err(|e| e.at_row(record.row, record.describe()))
}

/// Fail on the first record with a blank mandatory field.
pub fn validate_required_fields(records: &[Record]) -> ValidationResult<()> {
    match records.iter().find(|r| r.missing_required().is_some()) {
        Some(record) => Err(ValidationError::new(Rule::RequiredField)
            .at_row(record.row, record.describe())),
        None => Ok(()),
    }
}

/// Validate the ids and reference date of one record.
///
/// Article ids are not checked here; the row transformer checks them
/// whether or not validation is enabled.
pub fn validate_record(record: &Record) -> ValidationResult<()> {
    if let Some(id) = &record.people_membership_id {
        validate_record_identifier(id, record)?;
    }
    if let Some(id) = &record.payment_schedule_id {
        validate_record_identifier(id, record)?;
    }
    if let Some(id) = &record.promotion_id {
        validate_record_identifier(id, record)?;
    }
    match &record.reference_date {
        Some(date) => {
            validate_reference_date(date).map_err(|e| e.at_row(record.row, record.describe()))
        }
        None => Err(ValidationError::new(Rule::RequiredField).at_row(record.row, record.describe())),
    }
}
