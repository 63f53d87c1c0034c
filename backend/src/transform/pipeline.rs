//! High-level transform API: input file to ordered request descriptors.
//!
//! Steps, all-or-nothing:
//! 1. Parse the file (encoding detection, `;` by default, trimmed cells)
//! 2. Check the header for the required columns
//! 3. Check mandatory fields across the whole batch
//! 4. Validate and transform each row in order
//!
//! The first failure aborts; no partial batch is ever returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use gymsync::transform::pipeline::{transform_csv, TransformOptions};
//! use std::path::Path;
//!
//! let batch = transform_csv(Path::new("changes.csv"), &TransformOptions::default())?;
//! println!("{}", batch.summary);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::row::RowTransformer;
use crate::config::ApiConfig;
use crate::error::{PipelineError, PipelineResult, SchemaError};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{
    Record, RequestDescriptor, ARTICLE_COLUMNS, PAYMENT_SCHEDULE_ID, PEOPLE_MEMBERSHIP_ID,
    PROMOTION_ID, REFERENCE_DATE, REQUIRED_COLUMNS,
};
use crate::parser::{parse_bytes, parse_file, ParseResult, DEFAULT_DELIMITER};
use crate::validation::{validate_record, validate_required_fields};

/// Options for the transform pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Skip identifier, timestamp and mandatory field checks.
    /// Article ids are checked regardless.
    pub skip_validation: bool,

    /// Field separator
    pub delimiter: char,

    /// API root the request URLs are built from
    pub api_base: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            skip_validation: false,
            delimiter: DEFAULT_DELIMITER,
            api_base: ApiConfig::default().base_url,
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// A transformed batch, ready to upload.
#[derive(Debug, Clone, Serialize)]
pub struct TransformedBatch {
    /// One descriptor per input row, in row order
    pub requests: Vec<RequestDescriptor>,
    /// False when validation was bypassed
    pub validated: bool,
    /// Human-readable outcome of the transform
    pub summary: String,
    pub csv_info: CsvInfo,
}

impl TransformedBatch {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Transform a membership change file.
pub fn transform_csv(path: &Path, options: &TransformOptions) -> PipelineResult<TransformedBatch> {
    log_info(format!("📖 Reading {}", path.display()));
    let parsed = parse_file(path, options.delimiter)?;
    transform_parsed(parsed, options)
}

/// Same as [`transform_csv`] for raw file contents.
pub fn transform_bytes(bytes: &[u8], options: &TransformOptions) -> PipelineResult<TransformedBatch> {
    let parsed = parse_bytes(bytes, options.delimiter)?;
    transform_parsed(parsed, options)
}

/// Transform already-built records.
///
/// Returns the descriptors only; summary and CSV metadata need a file.
pub fn transform_records(
    records: &[Record],
    options: &TransformOptions,
) -> PipelineResult<Vec<RequestDescriptor>> {
    if !options.skip_validation {
        validate_required_fields(records)?;
    }

    let transformer = RowTransformer::new(ApiConfig::new(options.api_base.as_str()).memberships_url());
    let mut requests = Vec::with_capacity(records.len());

    for record in records {
        if !options.skip_validation {
            validate_record(record)?;
        }
        requests.push(transformer.transform(record)?);
    }

    Ok(requests)
}

fn transform_parsed(parsed: ParseResult, options: &TransformOptions) -> PipelineResult<TransformedBatch> {
    log_success(format!(
        "Encoding: {}, separator: '{}', {} rows",
        parsed.encoding,
        parsed.delimiter,
        parsed.rows.len()
    ));

    let records = to_records(&parsed)?;

    if options.skip_validation {
        log_warning("Validation skipped; article ids are still checked");
    } else {
        log_info("✔️  Validating records...");
    }

    let requests = transform_records(&records, options)?;
    let validated = !options.skip_validation;
    let summary = summarize(requests.len(), validated);

    if validated {
        log_success(&summary);
    } else {
        log_warning(&summary);
    }

    Ok(TransformedBatch {
        requests,
        validated,
        summary,
        csv_info: CsvInfo {
            encoding: parsed.encoding,
            delimiter: parsed.delimiter,
            headers: parsed.headers,
            row_count: parsed.rows.len(),
        },
    })
}

/// Map parsed rows onto [`Record`]s.
///
/// Required columns must exist; optional ones read as blank when absent.
pub fn to_records(parsed: &ParseResult) -> Result<Vec<Record>, SchemaError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| parsed.column(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    for column in ARTICLE_COLUMNS.iter().chain([PROMOTION_ID].iter()) {
        if parsed.column(column).is_none() {
            log_info_indent(format!("Optional column '{}' not present", column), 1);
        }
    }

    let records = parsed
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let cell = |name: &str| {
                parsed
                    .column(name)
                    .and_then(|i| row.get(i))
                    .filter(|v| !v.is_empty())
                    .cloned()
            };

            Record {
                // header is row 1
                row: index + 2,
                people_membership_id: cell(PEOPLE_MEMBERSHIP_ID),
                payment_schedule_id: cell(PAYMENT_SCHEDULE_ID),
                reference_date: cell(REFERENCE_DATE),
                promotion_id: cell(PROMOTION_ID),
                article_ids: ARTICLE_COLUMNS.map(cell),
            }
        })
        .collect();

    Ok(records)
}

fn summarize(count: usize, validated: bool) -> String {
    if validated {
        format!("{} records validated and ready to upload.", count)
    } else {
        format!(
            "{} records ready to upload. Warning: Records are not validated.",
            count
        )
    }
}
