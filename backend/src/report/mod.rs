//! Upload report: console summary and `;`-separated export.
//!
//! Export layout, one row per outcome:
//!
//! ```text
//! ppl_mshp_id;status_code;message;post_url;body
//! A111...;200;OK;https://.../PeopleMembershipChange/...;{}
//! ```
//!
//! The body column holds the compact JSON that was sent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::logs::log_success;
use crate::models::Report;

/// Default export file name.
pub const DEFAULT_REPORT_FILE: &str = "report.csv";

/// Minutes of manual work one record stands for.
const MINUTES_SAVED_PER_RECORD: usize = 5;

/// One exported report row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    pub ppl_mshp_id: String,
    pub status_code: u16,
    pub message: String,
    pub post_url: String,
    pub body: String,
}

pub struct ReportBuilder<'a> {
    report: &'a Report,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Human-readable summary pointing at the exported file.
    pub fn summary(&self, export_path: &Path) -> String {
        let count = self.report.len();
        let mut lines = vec![
            format!("All {} records processed.", count),
            format!(
                "Report was saved to {}. Please check for errors.",
                export_path.display()
            ),
            format!(
                "Posting these records took {:?} seconds.",
                self.report.duration_seconds
            ),
            format!("Time saved is {} minutes.", count * MINUTES_SAVED_PER_RECORD),
        ];

        let failed = self.report.failures().count();
        if failed > 0 {
            lines.push(format!("{} records were not accepted by the API.", failed));
        }
        if !self.report.validated {
            lines.push("Warning: Records were not validated before upload.".to_string());
        }

        lines.join("\n")
    }

    /// Rows of the export, in outcome order.
    pub fn rows(&self) -> ReportResult<Vec<ExportRow>> {
        self.report
            .outcomes
            .iter()
            .map(|o| -> ReportResult<ExportRow> {
                Ok(ExportRow {
                    ppl_mshp_id: o.membership_id.clone(),
                    status_code: o.status_code,
                    message: o.message.clone(),
                    post_url: o.target_url.clone(),
                    body: o.body.to_json()?,
                })
            })
            .collect()
    }

    /// `;`-separated export with header, `\n` line endings.
    ///
    /// Deterministic: unchanged outcomes always give identical text.
    pub fn export(&self) -> ReportResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let rows = self.rows()?;
        if rows.is_empty() {
            writer.write_record(["ppl_mshp_id", "status_code", "message", "post_url", "body"])?;
        }
        for row in rows {
            writer.serialize(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| ReportError::EncodingError(e.to_string()))
    }

    /// Write the export to `path`.
    pub fn save(&self, path: &Path) -> ReportResult<PathBuf> {
        let content = self.export()?;
        fs::write(path, content)?;
        log_success(format!("💾 Report written to {}", path.display()));
        Ok(path.to_path_buf())
    }
}

/// Parse an exported report back into rows.
pub fn read_export(content: &str) -> ReportResult<Vec<ExportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(content.as_bytes());

    reader
        .deserialize()
        .collect::<Result<Vec<ExportRow>, _>>()
        .map_err(ReportError::from)
}

/// Read an exported report file.
pub fn read_export_file(path: &Path) -> ReportResult<Vec<ExportRow>> {
    let content = fs::read_to_string(path)?;
    read_export(&content)
}
