//! Gym Manager API client.
//!
//! [`GymManagerClient::authenticate`] trades credentials for a [`Session`].
//! A session holds the authorization header and is the only way to reach
//! authenticated endpoints, so independent sessions can coexist.
//!
//! ```rust,ignore
//! use gymsync::client::GymManagerClient;
//! use gymsync::config::ApiConfig;
//!
//! let client = GymManagerClient::new(ApiConfig::from_env())?;
//! let session = client.authenticate("user", "secret").await?;
//! println!("{}", session.connection_test().await?);
//! ```

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ConnectionError, ConnectionResult};
use crate::logs::{log_error, log_info, log_success};
use crate::models::RequestDescriptor;

/// Longest slice of a raw response body kept in messages.
const MAX_BODY_CHARS: usize = 500;

/// Login payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
    api_license: &'a str,
    mac_address: &'a str,
}

/// `status` block shared by every API response
#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    code: Value,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    status: ApiStatus,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: ApiStatus,
}

/// Raw result of one membership change call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeResponse {
    pub status: u16,
    /// `status.message` from the body, else the raw body text
    pub message: String,
}

/// Unauthenticated entry point.
#[derive(Clone)]
pub struct GymManagerClient {
    http: Client,
    config: ApiConfig,
}

impl GymManagerClient {
    pub fn new(config: ApiConfig) -> ConnectionResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Log in and return an authenticated session.
    pub async fn authenticate(&self, username: &str, password: &str) -> ConnectionResult<Session> {
        if username.is_empty() || password.is_empty() {
            return Err(ConnectionError::MissingCredentials);
        }

        log_info(format!("🔐 Logging in as {}...", username));

        let payload = AuthRequest {
            username,
            password,
            api_license: "",
            mac_address: "",
        };

        let response = self
            .http
            .post(self.config.authenticate_url())
            .headers(json_headers())
            .json(&payload)
            .send()
            .await?;

        let body = response.text().await?;
        let auth: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| ConnectionError::InvalidResponse(format!("{}: {}", e, truncate(&body))))?;

        if !auth.status.success {
            let err = ConnectionError::Rejected {
                code: value_text(&auth.status.code),
                message: auth.status.message.unwrap_or_default(),
            };
            log_error(format!("Failed to log in: {}", err));
            return Err(err);
        }

        let token = value_text(&auth.data);
        if token.is_empty() {
            return Err(ConnectionError::InvalidResponse(
                "login succeeded without a token".to_string(),
            ));
        }

        let mut headers = json_headers();
        let authorization =
            HeaderValue::from_str(&token).map_err(|e| ConnectionError::InvalidToken(e.to_string()))?;
        headers.insert(AUTHORIZATION, authorization);

        log_success(format!("Login succeeded: User {} logged in.", username));

        Ok(Session {
            http: self.http.clone(),
            config: self.config.clone(),
            headers,
            username: username.to_string(),
        })
    }
}

/// Authenticated API session.
///
/// Headers are fixed at login and read-only afterwards.
#[derive(Clone)]
pub struct Session {
    http: Client,
    config: ApiConfig,
    headers: HeaderMap,
    username: String,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Lightweight connectivity check against the club listing.
    pub async fn connection_test(&self) -> ConnectionResult<String> {
        let response = self
            .http
            .get(self.config.clubs_url())
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            let result = "Connection was successful!".to_string();
            log_success(format!("Connection test: {}", result));
            Ok(result)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ConnectionError::TestFailed {
                status: status.as_u16(),
                body: truncate(&body),
            })
        }
    }

    /// POST one membership change.
    ///
    /// Any HTTP status is a response; only transport failures are errors.
    pub async fn post_change(&self, request: &RequestDescriptor) -> Result<ChangeResponse, reqwest::Error> {
        let response = self
            .http
            .post(&request.target_url)
            .headers(self.headers.clone())
            .json(&request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ChangeResponse {
            status,
            message: extract_message(&body),
        })
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// `status.message` of an API response body, or the body itself.
pub fn extract_message(body: &str) -> String {
    serde_json::from_str::<StatusEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.status.message)
        .unwrap_or_else(|| truncate(body))
}

/// Strings stay as-is, everything else uses its JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate(text: &str) -> String {
    text.trim().chars().take(MAX_BODY_CHARS).collect()
}
