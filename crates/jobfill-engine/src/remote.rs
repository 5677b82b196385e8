//! HTTP client for the field-extraction backend.

use crate::config::BackendConfig;
use async_trait::async_trait;
use jobfill_common::protocol::{FieldInstructionSet, ProcessHtmlRequest, ProcessHtmlResponse};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other: {0}")]
    Other(String),
}

/// The extraction service and resume store.
#[async_trait]
pub trait FieldSource: Send + Sync {
    /// Send page markup, receive the fields to fill.
    ///
    /// A logical failure reported by the service comes back as `Ok` with
    /// `error` set; only transport problems are `Err`.
    async fn submit_page(&self, html: &str) -> Result<FieldInstructionSet, SourceError>;

    /// Download the resume to upload.
    async fn fetch_resume(&self) -> Result<Vec<u8>, SourceError>;
}

pub struct HttpFieldSource {
    client: reqwest::Client,
    process_url: String,
    resume_url: String,
}

impl HttpFieldSource {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            process_url: config.process_url(),
            resume_url: config.resume_url(),
        }
    }

    pub fn process_url(&self) -> &str {
        &self.process_url
    }

    pub fn resume_url(&self) -> &str {
        &self.resume_url
    }
}

#[async_trait]
impl FieldSource for HttpFieldSource {
    async fn submit_page(&self, html: &str) -> Result<FieldInstructionSet, SourceError> {
        debug!("Posting {} bytes of HTML to {}", html.len(), self.process_url);
        let response = self
            .client
            .post(&self.process_url)
            .json(&ProcessHtmlRequest {
                html: html.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.process_url.clone(),
            });
        }

        let body = response.bytes().await?;
        let parsed: ProcessHtmlResponse = serde_json::from_slice(&body)?;
        Ok(parsed.into_instruction_set())
    }

    async fn fetch_resume(&self) -> Result<Vec<u8>, SourceError> {
        let response = self.client.get(&self.resume_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.resume_url.clone(),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded resume ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }
}
