//! End-to-end flows against a mocked Gym Manager API.

use std::fs;

use gymsync::report::read_export_file;
use gymsync::{
    transform_csv, ApiConfig, ConnectionError, GymManagerClient, NoProgress, PipelineError,
    Progress, ReportBuilder, RequestBody, RequestDescriptor, Rule, Session, TransformOptions,
    Uploader,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "peopleMembershipId;paymentScheduleId;referenceDate;promotionId;\
                      article_id_1;article_id_2;article_id_3;article_id_4;article_id_5";

const MEMBER_1: &str = "A1111111-1111-1111-1111-111111111111";
const MEMBER_2: &str = "A2222222-2222-2222-2222-222222222222";
const SCHEDULE: &str = "S0000000-0000-0000-0000-000000000000";
const ARTICLE: &str = "B1111111-1111-1111-1111-111111111111";
const DATE: &str = "2024-01-01T00:00:00.000";
const TOKEN: &str = "token-123";

fn write_csv(dir: &TempDir, rows: &[String]) -> std::path::PathBuf {
    let mut content = HEADER.to_string();
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    let path = dir.path().join("changes.csv");
    fs::write(&path, content).unwrap();
    path
}

fn config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(format!("{}/api/v1", server.uri()))
}

fn options(config: &ApiConfig) -> TransformOptions {
    TransformOptions {
        api_base: config.base_url.clone(),
        ..Default::default()
    }
}

fn change_path(member: &str) -> String {
    format!(
        "/api/v1/PeopleMemberships/PeopleMembershipChange/{}/{}",
        member, SCHEDULE
    )
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/Authorize/AuthenticateJson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "success": true, "code": 0, "message": "OK" },
            "data": token
        })))
        .mount(server)
        .await;
}

async fn login(server: &MockServer) -> Session {
    mount_login(server, TOKEN).await;
    GymManagerClient::new(config(server))
        .unwrap()
        .authenticate("coach", "secret")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_invalid_row_aborts_before_any_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        &[
            format!("{};{};{};;;;;;", MEMBER_1, SCHEDULE, DATE),
            format!("{};{};;;;;;;", MEMBER_2, SCHEDULE),
            format!("{};{};{};;;;;;", MEMBER_1, SCHEDULE, DATE),
        ],
    );

    let err = transform_csv(&input, &options(&config(&server))).unwrap_err();

    match err {
        PipelineError::Validation(e) => {
            assert_eq!(e.rule, Rule::RequiredField);
            assert_eq!(e.row, Some(3));
            assert!(e.to_string().contains("Conflicting record (row 3)"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_row_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let session = login(&server).await;

    Mock::given(method("POST"))
        .and(path(change_path(MEMBER_1)))
        .and(query_param("referenceDate", DATE))
        .and(header("Authorization", TOKEN))
        .and(body_json(json!({ "articles": [{ "id": ARTICLE, "metadata": "string" }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "success": true, "message": "Membership changed" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(change_path(MEMBER_2)))
        .and(header("Authorization", TOKEN))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": { "success": false, "message": "Payment schedule not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        &[
            format!("{};{};{};;{};;;;", MEMBER_1, SCHEDULE, DATE, ARTICLE),
            format!("{};{};{};;;;;;", MEMBER_2, SCHEDULE, DATE),
        ],
    );
    let batch = transform_csv(&input, &options(session.config())).unwrap();

    let mut progress = Vec::new();
    let report = Uploader::new(&session)
        .upload_batch(&batch, &mut |p: Progress| progress.push(p))
        .await;

    assert_eq!(report.len(), 2);
    assert!(report.validated);
    assert_eq!(report.outcomes[0].membership_id, MEMBER_1);
    assert_eq!(report.outcomes[0].status_code, 200);
    assert_eq!(report.outcomes[0].message, "Membership changed");
    assert_eq!(report.outcomes[1].membership_id, MEMBER_2);
    assert_eq!(report.outcomes[1].status_code, 500);
    assert_eq!(report.outcomes[1].message, "Payment schedule not found");

    assert_eq!(
        progress,
        vec![
            Progress { fraction: 0.5, step: 0, total: 2 },
            Progress { fraction: 1.0, step: 1, total: 2 },
        ]
    );
}

#[tokio::test]
async fn test_unreachable_row_is_recorded() {
    let server = MockServer::start().await;
    let session = login(&server).await;

    Mock::given(method("POST"))
        .and(path(change_path(MEMBER_2)))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .expect(1)
        .mount(&server)
        .await;

    let requests = vec![
        RequestDescriptor {
            membership_id: MEMBER_1.into(),
            target_url: "http://127.0.0.1:9/unreachable".into(),
            body: RequestBody::default(),
        },
        RequestDescriptor {
            membership_id: MEMBER_2.into(),
            target_url: format!("{}{}?referenceDate={}", server.uri(), change_path(MEMBER_2), DATE),
            body: RequestBody::default(),
        },
    ];

    let report = Uploader::new(&session).upload(&requests, &mut NoProgress).await;

    assert_eq!(report.outcomes[0].status_code, 0);
    assert!(report.outcomes[0].message.starts_with("Request failed"));
    assert_eq!(report.outcomes[1].status_code, 200);
    assert_eq!(report.outcomes[1].message, "plain text");
}

#[tokio::test]
async fn test_login_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/Authorize/AuthenticateJson"))
        .and(body_json(json!({
            "username": "coach",
            "password": "secret",
            "apiLicense": "",
            "macAddress": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "success": true, "code": 0, "message": "OK" },
            "data": TOKEN
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = GymManagerClient::new(config(&server))
        .unwrap()
        .authenticate("coach", "secret")
        .await
        .unwrap();
    assert_eq!(session.username(), "coach");
}

#[tokio::test]
async fn test_rejected_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/Authorize/AuthenticateJson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "success": false, "code": 401, "message": "Invalid credentials" },
            "data": null
        })))
        .mount(&server)
        .await;

    let err = GymManagerClient::new(config(&server))
        .unwrap()
        .authenticate("coach", "wrong")
        .await
        .err()
        .unwrap();

    match err {
        ConnectionError::Rejected { code, message } => {
            assert_eq!(code, "401");
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_test() {
    let server = MockServer::start().await;
    let session = login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Clubs"))
        .and(query_param("onlyActive", "true"))
        .and(header("Authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert_eq!(
        session.connection_test().await.unwrap(),
        "Connection was successful!"
    );
}

#[tokio::test]
async fn test_connection_test_failure() {
    let server = MockServer::start().await;
    let session = login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Clubs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    match session.connection_test().await {
        Err(ConnectionError::TestFailed { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected failed connection test, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_login(&first, "first-token").await;
    mount_login(&second, "second-token").await;

    for (server, token) in [(&first, "first-token"), (&second, "second-token")] {
        Mock::given(method("GET"))
            .and(path("/api/v1/Clubs"))
            .and(header("Authorization", token))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(server)
            .await;
    }

    let a = GymManagerClient::new(config(&first))
        .unwrap()
        .authenticate("a", "pw")
        .await
        .unwrap();
    let b = GymManagerClient::new(config(&second))
        .unwrap()
        .authenticate("b", "pw")
        .await
        .unwrap();

    a.connection_test().await.unwrap();
    b.connection_test().await.unwrap();
}

#[tokio::test]
async fn test_report_file_round_trip() {
    let server = MockServer::start().await;
    let session = login(&server).await;

    Mock::given(method("POST"))
        .and(path(change_path(MEMBER_1)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "message": "OK" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(change_path(MEMBER_2)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": { "message": "Reference date; in the past" }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        &[
            format!("{};{};{};;{};;;;", MEMBER_1, SCHEDULE, DATE, ARTICLE),
            format!("{};{};{};;;;;;", MEMBER_2, SCHEDULE, DATE),
        ],
    );
    let batch = transform_csv(&input, &options(session.config())).unwrap();
    let report = Uploader::new(&session).upload_batch(&batch, &mut NoProgress).await;

    let report_path = dir.path().join("report.csv");
    let builder = ReportBuilder::new(&report);
    builder.save(&report_path).unwrap();

    let rows = read_export_file(&report_path).unwrap();
    assert_eq!(rows.len(), report.len());
    for (row, outcome) in rows.iter().zip(&report.outcomes) {
        assert_eq!(row.ppl_mshp_id, outcome.membership_id);
        assert_eq!(row.status_code, outcome.status_code);
    }
    assert_eq!(rows[1].message, "Reference date; in the past");

    assert_eq!(
        fs::read_to_string(&report_path).unwrap(),
        builder.export().unwrap()
    );
    assert!(builder
        .summary(&report_path)
        .contains("Time saved is 10 minutes."));
}
