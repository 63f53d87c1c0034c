//! Sequential upload of membership changes.
//!
//! Requests go out one at a time, in input order, over a single [`Session`].
//! After each request the outcome is recorded and the progress sink is
//! called in-line. Failed rows (non-2xx or no response) are recorded and
//! the loop moves on; there are no retries.

use std::time::Instant;

use crate::client::Session;
use crate::logs::{log_info, log_success, log_warning};
use crate::models::{Report, RequestDescriptor, UploadOutcome};
use crate::transform::pipeline::TransformedBatch;

/// Upload progress after one completed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Share of requests done, in `(0, 1]`
    pub fraction: f64,
    /// Zero-based index of the request just completed
    pub step: usize,
    /// Number of requests in the batch
    pub total: usize,
}

/// Receives [`Progress`] after every request, on the uploading task.
///
/// Implemented for any `FnMut(Progress)`.
pub trait ProgressSink {
    fn on_progress(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Sink that ignores progress.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: Progress) {}
}

pub struct Uploader<'a> {
    session: &'a Session,
}

impl<'a> Uploader<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Upload a transformed batch; the report remembers whether it was validated.
    pub async fn upload_batch<P: ProgressSink>(&self, batch: &TransformedBatch, sink: &mut P) -> Report {
        let mut report = self.upload(&batch.requests, sink).await;
        report.validated = batch.validated;
        report
    }

    /// Execute every request in order and collect one outcome per request.
    pub async fn upload<P: ProgressSink>(&self, requests: &[RequestDescriptor], sink: &mut P) -> Report {
        let total = requests.len();
        let mut outcomes = Vec::with_capacity(total);

        log_info(format!("🚀 Uploading {} records as {}...", total, self.session.username()));
        let started = Instant::now();

        for (step, request) in requests.iter().enumerate() {
            outcomes.push(self.execute(request).await);

            sink.on_progress(Progress {
                fraction: (step + 1) as f64 / total as f64,
                step,
                total,
            });
        }

        let duration_seconds = round_seconds(started.elapsed().as_secs_f64());
        let report = Report {
            outcomes,
            duration_seconds,
            validated: true,
        };

        let failed = report.failures().count();
        if failed > 0 {
            log_warning(format!("{} of {} records were not accepted", failed, total));
        } else {
            log_success(format!("All {} records accepted", total));
        }

        report
    }

    async fn execute(&self, request: &RequestDescriptor) -> UploadOutcome {
        let (status_code, message) = match self.session.post_change(request).await {
            Ok(response) => (response.status, response.message),
            Err(e) => (0, format!("Request failed: {}", e)),
        };

        UploadOutcome {
            membership_id: request.membership_id.clone(),
            status_code,
            message,
            target_url: request.target_url.clone(),
            body: request.body.clone(),
        }
    }
}

fn round_seconds(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
