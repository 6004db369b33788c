//! Client for the dataset splitting service.
//!
//! This module provides a lightweight client for the single endpoint the
//! application talks to. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating `ARFFSPLIT_API_BASE` for safety
//! - Posting the picked file and stratify column as multipart form data
//! - Turning failure responses into a structured [`UploadError`]
//!
//! The primary entry point is [`SplitServiceClient`]. Create an instance via
//! [`SplitServiceClient::new_from_env`] and submit with
//! [`SplitServiceClient::upload`].
//!
//! # Example
//!
//! ```ignore
//! use arffsplit_api::SplitServiceClient;
//!
//! async fn submit(bytes: Vec<u8>) -> anyhow::Result<()> {
//!     let client = SplitServiceClient::new_from_env()?;
//!     let reply = client.upload("KDDTrain+.arff", bytes, "protocol_type").await?;
//!     println!("{} bytes", reply.body.len());
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use arffsplit_types::{ServiceReply, SubmissionFailure};
use reqwest::{Client, RequestBuilder, Url, header, multipart};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Public deployment of the processing service.
pub const DEFAULT_API_BASE: &str = "https://arff-visualizer.onrender.com";
/// Environment variable overriding the service base URL.
pub const API_BASE_ENV: &str = "ARFFSPLIT_API_BASE";
/// Path of the load-and-split endpoint.
pub const LOAD_PATH: &str = "/api/load";
/// Multipart field carrying the raw file bytes.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the stratify column name.
pub const STRATIFY_FIELD: &str = "stratify";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Upper bound for one upload, server cold start included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Failure of a single upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request could not be built, sent or read back.
    #[error("{message}")]
    Transport { message: String },
    /// The service answered with a non-success status.
    #[error("service responded with HTTP {status}{}", service_reason(.error))]
    Service {
        status: u16,
        /// Structured `error` field of the JSON body, when present.
        error: Option<String>,
        /// Optional `detail` field the service adds to parse failures.
        detail: Option<String>,
    },
}

fn service_reason(error: &Option<String>) -> String {
    error.as_deref().map(|e| format!(": {e}")).unwrap_or_default()
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport { message: err.to_string() }
    }
}

impl From<UploadError> for SubmissionFailure {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Transport { message } => SubmissionFailure::Transport(message),
            UploadError::Service { status, error, .. } => SubmissionFailure::Service { status, error },
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the splitting service.
pub struct SplitServiceClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl SplitServiceClient {
    /// Construct a client against `base_url` after validating it.
    ///
    /// Non-localhost hosts must use HTTPS.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("arffsplit/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Construct a client from `ARFFSPLIT_API_BASE`, falling back to the
    /// public deployment.
    pub fn new_from_env() -> Result<Self> {
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        Self::new(&base_url)
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// Post a file to `/api/load` and return the archive bytes.
    ///
    /// The body is `multipart/form-data` with the bytes under `file` (named
    /// after `file_name`) and the column under `stratify`. The boundary and
    /// content type are set by the transport.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>, stratify: &str) -> Result<ServiceReply, UploadError> {
        let size = bytes.len();
        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .part(FILE_FIELD, file_part)
            .text(STRATIFY_FIELD, stratify.to_string());

        debug!(file_name, size, stratify, "submitting dataset");
        let resp = self
            .request(reqwest::Method::POST, LOAD_PATH)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let content_disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = resp.bytes().await?;

        if !status.is_success() {
            let (error, detail) = parse_error_body(&body);
            warn!(status = status.as_u16(), error = ?error, detail = ?detail, "service rejected upload");
            return Err(UploadError::Service {
                status: status.as_u16(),
                error,
                detail,
            });
        }

        Ok(ServiceReply {
            body: body.to_vec(),
            content_disposition,
        })
    }
}

/// Extract the `error` and `detail` strings from a failure body.
///
/// Bodies that are not JSON objects, or whose fields are missing, empty or
/// not strings, yield `None` for that field.
pub fn parse_error_body(body: &[u8]) -> (Option<String>, Option<String>) {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return (None, None);
    };
    let field = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };
    (field("error"), field("detail"))
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid {} URL '{}': {}", API_BASE_ENV, base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", API_BASE_ENV))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://'",
            API_BASE_ENV,
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_allows_https_and_localhost() {
        assert!(validate_base_url(DEFAULT_API_BASE).is_ok());
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:9000").is_ok());
    }

    #[test]
    fn base_url_rejects_plain_http_and_garbage() {
        let err = validate_base_url("http://example.com").unwrap_err();
        assert!(err.to_string().contains("must use https"));
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = SplitServiceClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert!(client.user_agent.starts_with("arffsplit/"));
    }

    #[test]
    fn service_error_text_names_status_and_reason() {
        let err = UploadError::Service {
            status: 422,
            error: Some("bad schema".into()),
            detail: None,
        };
        assert_eq!(err.to_string(), "service responded with HTTP 422: bad schema");

        let err = UploadError::Service {
            status: 502,
            error: None,
            detail: None,
        };
        assert_eq!(err.to_string(), "service responded with HTTP 502");
    }

    #[test]
    fn error_body_reads_error_and_detail() {
        let body = br#"{"error": "bad schema", "detail": "line 4"}"#;
        assert_eq!(
            parse_error_body(body),
            (Some("bad schema".to_string()), Some("line 4".to_string()))
        );
    }

    #[test]
    fn error_body_degrades_on_unexpected_shapes() {
        assert_eq!(parse_error_body(b"<html>502</html>"), (None, None));
        assert_eq!(parse_error_body(br#"["error"]"#), (None, None));
        assert_eq!(parse_error_body(br#"{"error": 42}"#), (None, None));
        assert_eq!(parse_error_body(br#"{"error": "  "}"#), (None, None));
    }

    #[test]
    fn upload_error_maps_to_submission_failure() {
        let failure: SubmissionFailure = UploadError::Service {
            status: 400,
            error: Some("bad schema".into()),
            detail: None,
        }
        .into();
        assert_eq!(
            failure,
            SubmissionFailure::Service {
                status: 400,
                error: Some("bad schema".into())
            }
        );
    }
}
