//! # Gymsync - bulk membership changes for Gym Manager
//!
//! Gymsync reads a `;`-separated file of membership changes, validates it,
//! turns every row into a Gym Manager API call and posts the calls one by
//! one, producing a per-record report.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────┐   ┌──────────┐
//! │ CSV File │──▶│  Parser  │──▶│  Transform  │──▶│  Upload  │──▶│  Report  │
//! │ (;-sep.) │   │(auto-enc)│   │ (validated) │   │ (serial) │   │  (csv)   │
//! └──────────┘   └──────────┘   └─────────────┘   └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gymsync::{transform_csv, GymManagerClient, ApiConfig, Uploader, ReportBuilder, TransformOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let batch = transform_csv("changes.csv".as_ref(), &TransformOptions::default())?;
//!     let session = GymManagerClient::new(ApiConfig::from_env())?
//!         .authenticate("user", "secret")
//!         .await?;
//!     let report = Uploader::new(&session)
//!         .upload_batch(&batch, &mut |p: gymsync::Progress| println!("{:.0}%", p.fraction * 100.0))
//!         .await;
//!     println!("{}", ReportBuilder::new(&report).export()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Records, request descriptors, outcomes, report
//! - [`parser`] - CSV parsing with encoding detection
//! - [`validation`] - Business rules
//! - [`transform`] - Row transformer and batch pipeline
//! - [`client`] - Authentication and API session
//! - [`upload`] - Sequential uploader with progress
//! - [`report`] - Summary and export
//! - [`config`] - API endpoints
//! - [`logs`] - Log broadcasting

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Input
pub mod parser;
pub mod validation;
pub mod transform;

// Output
pub mod client;
pub mod report;
pub mod upload;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConnectionError, CsvError, PipelineError, ReportError, Rule, SchemaError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Article, Record, Report, RequestBody, RequestDescriptor, UploadOutcome};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid_identifier, is_valid_reference_date, validate_identifier, validate_record,
    validate_reference_date, validate_required_fields,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    transform_bytes, transform_csv, transform_records, CsvInfo, TransformOptions, TransformedBatch,
};
pub use transform::RowTransformer;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use client::{GymManagerClient, Session};
pub use config::ApiConfig;
pub use report::{read_export, ExportRow, ReportBuilder};
pub use upload::{NoProgress, Progress, ProgressSink, Uploader};
