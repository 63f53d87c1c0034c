//! One record to one membership change request.

use crate::error::ValidationResult;
use crate::models::{Article, Record, RequestBody, RequestDescriptor};
use crate::validation::validate_record_identifier;

/// Builds [`RequestDescriptor`]s against a fixed memberships base path.
#[derive(Debug, Clone)]
pub struct RowTransformer {
    base_path: String,
}

impl RowTransformer {
    /// `base_path` is the `.../PeopleMemberships` root, without trailing slash.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    /// Transform one record.
    ///
    /// Article ids are always checked, even for unvalidated batches.
    pub fn transform(&self, record: &Record) -> ValidationResult<RequestDescriptor> {
        let articles = record
            .articles()
            .map(|id| validate_record_identifier(id, record).map(|_| Article::new(id)))
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(RequestDescriptor {
            membership_id: field(&record.people_membership_id).to_string(),
            target_url: self.target_url(record),
            body: RequestBody::from_articles(articles),
        })
    }

    fn target_url(&self, record: &Record) -> String {
        let mut url = format!(
            "{}/PeopleMembershipChange/{}/{}?referenceDate={}",
            self.base_path,
            field(&record.people_membership_id),
            field(&record.payment_schedule_id),
            field(&record.reference_date),
        );
        if let Some(promotion) = &record.promotion_id {
            url.push_str("&promotionId=");
            url.push_str(promotion);
        }
        url
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rule;
    use serde_json::json;

    const BASE: &str = "https://api.test/v1/PeopleMemberships";
    const ARTICLE: &str = "A1111111-1111-1111-1111-111111111111";

    fn record() -> Record {
        Record {
            row: 2,
            people_membership_id: Some("P0000000-0000-0000-0000-000000000000".into()),
            payment_schedule_id: Some("S0000000-0000-0000-0000-000000000000".into()),
            reference_date: Some("2024-01-01T00:00:00.000".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_without_promotion() {
        let request = RowTransformer::new(BASE).transform(&record()).unwrap();
        assert_eq!(
            request.target_url,
            "https://api.test/v1/PeopleMemberships/PeopleMembershipChange/\
             P0000000-0000-0000-0000-000000000000/S0000000-0000-0000-0000-000000000000\
             ?referenceDate=2024-01-01T00:00:00.000"
        );
        assert_eq!(request.membership_id, "P0000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_url_with_promotion() {
        let mut r = record();
        r.promotion_id = Some("Q0000000-0000-0000-0000-000000000000".into());

        let request = RowTransformer::new(BASE).transform(&r).unwrap();
        assert!(request
            .target_url
            .ends_with("?referenceDate=2024-01-01T00:00:00.000&promotionId=Q0000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_single_article_body() {
        let mut r = record();
        r.article_ids[0] = Some(ARTICLE.into());

        let request = RowTransformer::new(BASE).transform(&r).unwrap();
        assert_eq!(
            serde_json::to_value(&request.body).unwrap(),
            json!({ "articles": [{ "id": ARTICLE, "metadata": "string" }] })
        );
    }

    #[test]
    fn test_no_articles_gives_empty_body() {
        let request = RowTransformer::new(BASE).transform(&record()).unwrap();
        assert_eq!(request.body.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_sparse_articles_keep_column_order() {
        let mut r = record();
        r.article_ids[3] = Some("D4444444-4444-4444-4444-444444444444".into());
        r.article_ids[1] = Some("B2222222-2222-2222-2222-222222222222".into());

        let request = RowTransformer::new(BASE).transform(&r).unwrap();
        let ids: Vec<_> = request
            .body
            .articles
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "B2222222-2222-2222-2222-222222222222",
                "D4444444-4444-4444-4444-444444444444"
            ]
        );
    }

    #[test]
    fn test_bad_article_id_rejected() {
        let mut r = record();
        r.row = 5;
        r.article_ids[2] = Some("not-an-id".into());

        let err = RowTransformer::new(BASE).transform(&r).unwrap_err();
        assert_eq!(err.rule, Rule::Identifier);
        assert_eq!(err.row, Some(5));
        assert_eq!(err.value.as_deref(), Some("not-an-id"));
    }
}
