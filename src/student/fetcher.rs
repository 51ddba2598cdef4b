//! Record fetcher for the upstream student API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;

use super::models::{StudentEnvelope, StudentPayload, StudentRecord};
use crate::config::UpstreamConfig;

const AUTH_TOKEN_HEADER: &str = "x-auth-token";
const SERVICE_HEADER: &str = "internal-service";

/// Network-level failures; both count as transport errors for the caller.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("response body has no student record")]
    MissingRecord,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("student {0} not found upstream")]
    NotFound(u64),
    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: String },
    #[error("upstream transport failure: {0}")]
    Transport(#[from] TransportFailure),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(TransportFailure::Http(err))
    }
}

/// Anything that can produce a student record by id.
#[async_trait]
pub trait StudentSource: Send + Sync {
    async fn fetch(&self, id: u64) -> Result<StudentRecord, FetchError>;
}

/// HTTP client for `GET {base_url}/students/{id}`.
///
/// One request per call, no retries and no caching.
#[derive(Clone)]
pub struct StudentFetcher {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl StudentFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("student-report-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn student_url(&self, id: u64) -> String {
        format!("{}/students/{}", self.base_url, id)
    }
}

#[async_trait]
impl StudentSource for StudentFetcher {
    async fn fetch(&self, id: u64) -> Result<StudentRecord, FetchError> {
        log::info!("Fetching student data for ID: {}", id);

        let response = self
            .client
            .get(self.student_url(id))
            .header(AUTH_TOKEN_HEADER, &self.auth_token)
            .header(SERVICE_HEADER, "true")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach upstream for student {}: {}", id, e);
                FetchError::from(e)
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            log::info!("Upstream has no student with ID: {}", id);
            return Err(FetchError::NotFound(id));
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            if body_reports_not_found(&body) {
                log::info!(
                    "Upstream reported student {} as not found (status {})",
                    id,
                    status.as_u16()
                );
                return Err(FetchError::NotFound(id));
            }
            log::error!(
                "Non-200 response from upstream for student {}: status {}",
                id,
                status.as_u16()
            );
            log::debug!("Upstream response body: {}", body);
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let record = decode_payload(id, &bytes)?;
        log::info!("Successfully fetched data for student: {}", record.id);
        Ok(record)
    }
}

/// True when an error body is an envelope whose text reports a miss.
fn body_reports_not_found(body: &str) -> bool {
    serde_json::from_str::<StudentEnvelope>(body)
        .map(|envelope| envelope.reports_not_found())
        .unwrap_or(false)
}

/// Decode a 200 response body into a record.
pub fn decode_payload(id: u64, body: &[u8]) -> Result<StudentRecord, FetchError> {
    let payload: StudentPayload =
        serde_json::from_slice(body).map_err(TransportFailure::Body)?;

    match payload {
        StudentPayload::Bare(record) => Ok(record),
        StudentPayload::Wrapped(envelope) => {
            if envelope.reports_not_found() {
                return Err(FetchError::NotFound(id));
            }
            envelope
                .student
                .ok_or(FetchError::Transport(TransportFailure::MissingRecord))
        }
    }
}
