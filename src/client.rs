//! Briefing API client — HTTP boundary the interaction core consumes.
//!
//! Every transport failure is classified into an [`ApiError`] before it
//! crosses into the lifecycle controller; no raw `reqwest` error leaks
//! upward. The 120 s deadline is enforced client-side per request,
//! irrespective of server behavior. Cancellation is cooperative:
//! dropping the returned future abandons the in-flight call (the server
//! may keep working, we just stop listening).

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ViewerConfig;
use crate::models::{Patient, PatientBriefing};

// ═══════════════════════════════════════════════════════════
// Error taxonomy
// ═══════════════════════════════════════════════════════════

/// Structured error body returned by the backend on non-2xx.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

/// Classified failure of a briefing API call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Connection-level failure (refused, DNS, reset mid-flight).
    #[error("Connection failed: {0}")]
    Network(String),
    /// Client-side deadline elapsed before the server answered.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// Non-2xx with a parseable `{code, message, details?}` body.
    #[error("{message}")]
    Server {
        status: u16,
        code: String,
        message: String,
        details: Option<Value>,
    },
    /// Non-2xx with an unparseable body; carries the HTTP status text.
    #[error("{status_text}")]
    Unknown { status: u16, status_text: String },
}

impl ApiError {
    /// Message shown to the user next to the Retry button.
    ///
    /// Timeouts get the distinct "may need more time" wording; other
    /// errors show the server-provided message or a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } => {
                "Request timed out. The AI may need more time — please retry.".to_string()
            }
            Self::Server { message, .. } if !message.is_empty() => message.clone(),
            Self::Unknown { status_text, .. } if !status_text.is_empty() => status_text.clone(),
            _ => "Failed to generate briefing".to_string(),
        }
    }

    /// Was this a client-side deadline (as opposed to a server answer)?
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ═══════════════════════════════════════════════════════════
// BriefingApi trait
// ═══════════════════════════════════════════════════════════

/// The API surface the viewer consumes.
///
/// The lifecycle controller is generic over this trait; tests substitute
/// a scripted implementation instead of a live server.
pub trait BriefingApi {
    /// `POST /api/v1/patients/{id}/briefing`
    fn generate_briefing(
        &self,
        patient_id: i64,
    ) -> impl Future<Output = Result<PatientBriefing, ApiError>> + Send;

    /// `GET /api/v1/patients`
    fn get_patients(&self) -> impl Future<Output = Result<Vec<Patient>, ApiError>> + Send;

    /// `GET /api/v1/patients/{id}`
    fn get_patient(&self, patient_id: i64)
        -> impl Future<Output = Result<Patient, ApiError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// HttpBriefingClient
// ═══════════════════════════════════════════════════════════

/// reqwest-backed [`BriefingApi`] implementation.
pub struct HttpBriefingClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpBriefingClient {
    /// Create a client against `base_url` with a per-request deadline.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Create a client from the viewer configuration.
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            &config.base_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a reqwest transport error into the taxonomy. Deadline first:
    /// a connect attempt that outlives the deadline reports as Timeout.
    fn classify(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if e.is_connect() {
            ApiError::Network(format!("cannot reach {}", self.base_url))
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Turn a non-2xx response into a classified error. A parseable
    /// `{code, message}` body becomes `Server`; anything else becomes
    /// `Unknown` with the HTTP status text.
    async fn error_from_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown Error");
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorDetail>(&body) {
            Ok(detail) => ApiError::Server {
                status: status.as_u16(),
                code: detail.code,
                message: detail.message,
                details: detail.details,
            },
            Err(_) => ApiError::Unknown {
                status: status.as_u16(),
                status_text: status_text.to_string(),
            },
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Self::parse_response(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Network(format!("invalid response body: {e}")))
    }
}

impl BriefingApi for HttpBriefingClient {
    async fn generate_briefing(&self, patient_id: i64) -> Result<PatientBriefing, ApiError> {
        tracing::debug!(patient_id, "requesting briefing generation");
        self.post_json(&format!("/api/v1/patients/{patient_id}/briefing"))
            .await
    }

    async fn get_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.get_json("/api/v1/patients").await
    }

    async fn get_patient(&self, patient_id: i64) -> Result<Patient, ApiError> {
        self.get_json(&format!("/api/v1/patients/{patient_id}")).await
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
