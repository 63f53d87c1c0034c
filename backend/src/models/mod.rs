//! Domain models for the membership change pipeline.
//!
//! - [`Record`] - one input row
//! - [`RequestDescriptor`] - one outbound API call derived from a record
//! - [`RequestBody`] / [`Article`] - JSON payload of a membership change
//! - [`UploadOutcome`] - result of executing one descriptor
//! - [`Report`] - all outcomes of one upload session

use serde::{Deserialize, Serialize};

// =============================================================================
// Column names
// =============================================================================

pub const PEOPLE_MEMBERSHIP_ID: &str = "peopleMembershipId";
pub const PAYMENT_SCHEDULE_ID: &str = "paymentScheduleId";
pub const REFERENCE_DATE: &str = "referenceDate";
pub const PROMOTION_ID: &str = "promotionId";

/// Article columns, in the order they land in the request body.
pub const ARTICLE_COLUMNS: [&str; 5] = [
    "article_id_1",
    "article_id_2",
    "article_id_3",
    "article_id_4",
    "article_id_5",
];

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 3] = [PEOPLE_MEMBERSHIP_ID, PAYMENT_SCHEDULE_ID, REFERENCE_DATE];

/// Metadata value the API expects on every article.
pub const ARTICLE_METADATA: &str = "string";

// =============================================================================
// Record
// =============================================================================

/// One membership change as read from the input file.
///
/// Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// 1-based row number in the source file (header is row 1).
    pub row: usize,
    pub people_membership_id: Option<String>,
    pub payment_schedule_id: Option<String>,
    pub reference_date: Option<String>,
    pub promotion_id: Option<String>,
    pub article_ids: [Option<String>; 5],
}

impl Record {
    /// Present article ids in column order.
    pub fn articles(&self) -> impl Iterator<Item = &str> {
        self.article_ids.iter().filter_map(|id| id.as_deref())
    }

    /// Name of the first required field left blank, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        [
            (PEOPLE_MEMBERSHIP_ID, &self.people_membership_id),
            (PAYMENT_SCHEDULE_ID, &self.payment_schedule_id),
            (REFERENCE_DATE, &self.reference_date),
        ]
        .into_iter()
        .find(|(_, value)| value.is_none())
        .map(|(name, _)| name)
    }

    /// Render every column of the row, one `name: value` per line.
    pub fn describe(&self) -> String {
        let fixed = [
            (PEOPLE_MEMBERSHIP_ID, &self.people_membership_id),
            (PAYMENT_SCHEDULE_ID, &self.payment_schedule_id),
            (REFERENCE_DATE, &self.reference_date),
            (PROMOTION_ID, &self.promotion_id),
        ];
        let articles = ARTICLE_COLUMNS.iter().copied().zip(self.article_ids.iter());

        fixed
            .into_iter()
            .chain(articles)
            .map(|(name, value)| format!("{}: {}", name, value.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Request
// =============================================================================

/// One article attached to a membership change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub metadata: String,
}

impl Article {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: ARTICLE_METADATA.to_string(),
        }
    }
}

/// JSON payload of a membership change.
///
/// Serializes to `{}` when there are no articles; the `articles` key is
/// omitted rather than sent as an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<Article>>,
}

impl RequestBody {
    pub fn from_articles(articles: Vec<Article>) -> Self {
        if articles.is_empty() {
            Self::default()
        } else {
            Self {
                articles: Some(articles),
            }
        }
    }

    /// Compact JSON text, as sent on the wire.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A fully formed membership change call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// Echoes `peopleMembershipId`; used to correlate outcomes.
    pub membership_id: String,
    pub target_url: String,
    pub body: RequestBody,
}

// =============================================================================
// Outcome and report
// =============================================================================

/// Result of executing one [`RequestDescriptor`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub membership_id: String,
    /// HTTP status, or `0` when no response was received.
    pub status_code: u16,
    pub message: String,
    pub target_url: String,
    pub body: RequestBody,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// All outcomes of one upload session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Outcomes in input order.
    pub outcomes: Vec<UploadOutcome>,
    /// Wall-clock time across the batch, rounded to two decimals.
    pub duration_seconds: f64,
    /// False when the batch was transformed with validation bypassed.
    pub validated: bool,
}

impl Report {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
