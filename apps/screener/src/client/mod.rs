//! API Client — the single point of entry for all backend HTTP in Screener.
//!
//! No other module issues requests directly; everything the console does on
//! the wire goes through [`ApiClient`]. Mutating requests carry the
//! `X-CSRFToken` header, sourced from the configured token or from the
//! `csrftoken` cookie captured in the client's jar.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ApiError;

pub mod email_templates;
pub mod job_descriptions;
pub mod resumes;
pub mod scheduling;

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// HTTP client for the resume-review backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
    jar: Arc<Jar>,
    csrf_override: Option<String>,
}

impl ApiClient {
    /// `base_url` is the backend origin, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str, csrf_token: Option<String>) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::Validation(format!("Invalid base URL '{base_url}': {e}")))?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ApiClient {
            http,
            base,
            jar,
            csrf_override: csrf_token,
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Joins an absolute API path onto the configured origin.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Current CSRF token, if one is known. The explicit config value wins;
    /// otherwise the cookie jar is consulted.
    pub fn csrf_token(&self) -> Option<String> {
        if let Some(token) = &self.csrf_override {
            return Some(token.clone());
        }
        let header = self.jar.cookies(&self.base)?;
        let raw = header.to_str().ok()?;
        let prefix = format!("{CSRF_COOKIE}=");
        raw.split(';')
            .map(str::trim)
            .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
            .map(str::to_string)
    }

    /// Returns a CSRF token, priming the cookie jar with one page load if
    /// none has been captured yet. Any GET against the backend sets the
    /// cookie.
    pub(crate) async fn ensure_csrf(&self) -> Result<String, ApiError> {
        if let Some(token) = self.csrf_token() {
            return Ok(token);
        }
        debug!("No CSRF token cached, priming cookie jar");
        let response = self.http.get(self.base.clone()).send().await?;
        let _ = response.bytes().await;
        self.csrf_token().ok_or_else(|| {
            ApiError::Validation(
                "No CSRF token available; set CSRF_TOKEN or check the backend cookie".to_string(),
            )
        })
    }

    /// Builds a request with the CSRF header attached. All mutating calls
    /// funnel through here.
    pub(crate) async fn mutating(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self.ensure_csrf().await?;
        Ok(self
            .http
            .request(method, self.endpoint(path))
            .header(CSRF_HEADER, token))
    }
}

/// `{"error": "..."}` body the backend sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Checks the status and decodes the body. On a non-2xx answer the error
/// message is recovered from the JSON envelope when there is one, else the
/// raw body is carried through.
pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(ApiError::Decode)
}

/// `{success, message?, error?}` envelope used by delete/save endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    /// Collapses the envelope: success carries its message through, failure
    /// becomes an [`ApiError::Rejected`].
    pub fn into_result(self) -> Result<Option<String>, ApiError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(ApiError::Rejected(
                self.error.unwrap_or_else(|| "Request failed".to_string()),
            ))
        }
    }
}
