//! # Reporting Sink Client
//!
//! Publishes Allure result files to an allure-docker-service instance.
//! Publication is two calls:
//!
//! 1. `POST {base}/allure-docker-service/send-results?project_id=..&force_project_creation=true`
//!    with `{"results": [{"file_name", "content_base64"}]}`.
//! 2. `GET {base}/allure-docker-service/generate-report?project_id=..`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::allure::AllureFile;

/// Errors from the reporting sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The configured base URL is not an http(s) URL.
    #[error("invalid reporting sink URL {url}: {details}")]
    InvalidUrl { url: String, details: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The sink answered with a non-2xx status.
    #[error("reporting sink {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
}

/// One encoded result file in a `send-results` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub file_name: String,
    pub content_base64: String,
}

impl From<&AllureFile> for ResultEntry {
    fn from(file: &AllureFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            content_base64: STANDARD.encode(&file.content),
        }
    }
}

#[derive(Serialize)]
struct SendResults {
    results: Vec<ResultEntry>,
}

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for an allure-docker-service instance.
#[derive(Debug, Clone)]
pub struct AllureSink {
    http: reqwest::Client,
    endpoint: String,
}

impl AllureSink {
    /// Build a client for the service rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let parsed = Url::parse(base_url).map_err(|e| SinkError::InvalidUrl {
            url: base_url.to_string(),
            details: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SinkError::InvalidUrl {
                url: base_url.to_string(),
                details: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SinkError::Client)?;
        Ok(Self {
            http,
            endpoint: format!("{}/allure-docker-service", base_url.trim_end_matches('/')),
        })
    }

    /// Service root all calls are made under.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload `files` to `project` and regenerate its report.
    pub async fn publish(&self, project: &str, files: &[AllureFile]) -> Result<(), SinkError> {
        self.send_results(project, files).await?;
        self.generate_report(project).await?;
        tracing::info!(project, files = files.len(), "report published");
        Ok(())
    }

    /// Upload result files, creating the project if needed.
    pub async fn send_results(&self, project: &str, files: &[AllureFile]) -> Result<(), SinkError> {
        let endpoint = format!("{}/send-results", self.endpoint);
        let body = SendResults {
            results: files.iter().map(ResultEntry::from).collect(),
        };
        let request = self
            .http
            .post(&endpoint)
            .query(&[("project_id", project), ("force_project_creation", "true")])
            .json(&body);
        self.send(endpoint, request).await
    }

    /// Ask the service to rebuild the project's report.
    pub async fn generate_report(&self, project: &str) -> Result<(), SinkError> {
        let endpoint = format!("{}/generate-report", self.endpoint);
        let request = self.http.get(&endpoint).query(&[("project_id", project)]);
        self.send(endpoint, request).await
    }

    async fn send(&self, endpoint: String, request: reqwest::RequestBuilder) -> Result<(), SinkError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => return Err(SinkError::Http { endpoint, source }),
        };
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "reporting sink rejected request");
            return Err(SinkError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "reporting sink call ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            AllureSink::new("ftp://allure.example", DEFAULT_TIMEOUT),
            Err(SinkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            AllureSink::new("not a url", DEFAULT_TIMEOUT),
            Err(SinkError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let sink = AllureSink::new("https://allure.example/api/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(sink.endpoint(), "https://allure.example/api/allure-docker-service");
    }

    #[test]
    fn entries_are_base64() {
        let file = AllureFile {
            file_name: "x-result.json".into(),
            content: b"{}".to_vec(),
        };
        let entry = ResultEntry::from(&file);
        assert_eq!(entry.content_base64, "e30=");
    }
}
