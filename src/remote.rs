//! HTTP client for the remote cohort-generation service.
//!
//! The service accepts a multipart upload (base CSV + disease name + source
//! URL) on `/process` and answers with a file identifier to fetch from
//! `/download/{file_id}`. The client sits behind the [`GeneratorClient`]
//! trait so the submission flow can be driven in tests by
//! [`MockGeneratorClient`] without a network.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use thiserror::Error;

use crate::workflow::SelectedFile;

#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("Cannot reach the processing service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    /// Non-success response carrying a server-provided `detail` string.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// Non-success response with no usable detail.
    #[error("Processing service returned status {0}")]
    ServerStatus(u16),

    #[error("Malformed response from processing service: {0}")]
    ResponseParsing(String),

    #[error("Could not assemble upload payload: {0}")]
    Payload(String),
}

/// Success body from `POST /process`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcessSuccess {
    pub file_id: String,
    pub message: String,
}

/// Failure body from `POST /process` — `detail` is optional.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Seam between the submission flow and the wire.
pub trait GeneratorClient: Send + Sync {
    fn process(
        &self,
        file: &SelectedFile,
        disease_name: &str,
        source_url: &str,
    ) -> Result<ProcessSuccess, RemoteError>;
}

/// Production client speaking to the service over HTTP.
pub struct HttpGeneratorClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpGeneratorClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client for the configured service URL with the default timeout.
    ///
    /// Generation can take a while on long reference pages, hence the
    /// generous 5-minute ceiling.
    pub fn from_config() -> Self {
        Self::new(&crate::config::api_base_url(), 300)
    }
}

impl GeneratorClient for HttpGeneratorClient {
    fn process(
        &self,
        file: &SelectedFile,
        disease_name: &str,
        source_url: &str,
    ) -> Result<ProcessSuccess, RemoteError> {
        let url = format!("{}/process", self.base_url);

        let part = reqwest::blocking::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| RemoteError::Payload(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("disease_name", disease_name.to_string())
            .text("url", source_url.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RemoteError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RemoteError::Timeout(self.timeout_secs)
                } else {
                    RemoteError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .filter(|d| !d.trim().is_empty());
            return Err(match detail {
                Some(detail) => RemoteError::Rejected {
                    status: status.as_u16(),
                    detail,
                },
                None => RemoteError::ServerStatus(status.as_u16()),
            });
        }

        response
            .json::<ProcessSuccess>()
            .map_err(|e| RemoteError::ResponseParsing(e.to_string()))
    }
}

/// Mock client for tests — returns a configurable outcome and counts calls.
pub struct MockGeneratorClient {
    outcome: Result<ProcessSuccess, RemoteError>,
    calls: AtomicUsize,
}

impl MockGeneratorClient {
    pub fn succeeding(file_id: &str, message: &str) -> Self {
        Self {
            outcome: Ok(ProcessSuccess {
                file_id: file_id.to_string(),
                message: message.to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: RemoteError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `process` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeneratorClient for MockGeneratorClient {
    fn process(
        &self,
        _file: &SelectedFile,
        _disease_name: &str,
        _source_url: &str,
    ) -> Result<ProcessSuccess, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_file() -> SelectedFile {
        SelectedFile {
            name: "patients.csv".into(),
            bytes: b"disease,age\n".to_vec(),
            media_type: "text/csv".into(),
        }
    }

    #[test]
    fn http_client_trims_trailing_slash() {
        let client = HttpGeneratorClient::new("http://localhost:8000/", 60);
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn mock_success_returns_configured_body() {
        let client = MockGeneratorClient::succeeding("abc123", "Appended 10 rows");
        let result = client
            .process(&csv_file(), "Diabetes", "https://example.org/ref")
            .unwrap();
        assert_eq!(result.file_id, "abc123");
        assert_eq!(result.message, "Appended 10 rows");
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn mock_failure_preserves_detail() {
        let client = MockGeneratorClient::failing(RemoteError::Rejected {
            status: 400,
            detail: "Invalid URL".into(),
        });
        let err = client
            .process(&csv_file(), "Diabetes", "https://example.org/ref")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL");
    }

    #[test]
    fn rejected_error_displays_server_detail_only() {
        let err = RemoteError::Rejected {
            status: 400,
            detail: "Error fetching URL: timeout".into(),
        };
        assert_eq!(err.to_string(), "Error fetching URL: timeout");
    }

    #[test]
    fn status_error_names_the_code() {
        let err = RemoteError::ServerStatus(502);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn error_body_detail_is_optional() {
        let with: ErrorBody = serde_json::from_str(r#"{"detail":"Invalid URL"}"#).unwrap();
        assert_eq!(with.detail.as_deref(), Some("Invalid URL"));
        let without: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(without.detail.is_none());
    }

    #[test]
    fn process_success_deserializes() {
        let body = r#"{"file_id":"abc123","message":"Processing complete! Click 'Download Result' to get your file."}"#;
        let parsed: ProcessSuccess = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.file_id, "abc123");
        assert!(parsed.message.starts_with("Processing complete"));
    }
}
