//! Clinic registration
//!
//! Sends the current payload to the registration endpoint. The request is
//! one-way: the user-facing flow never learns whether it succeeded. The
//! outcome is still returned so it can be logged and tested.

use crate::config::Config;
use crate::constants::submission::{ACCEPT, CONTENT_TYPE};
use crate::error::{Error, Result};
use crate::resolver::SubmissionPayload;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Response body, parsed as JSON when possible
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// The endpoint answered (any status)
    Delivered { status: u16, body: ResponseBody },
    /// The request never got a response
    TransportFailed { reason: String },
}

/// Client for the clinic registration endpoint
#[derive(Debug, Clone)]
pub struct ClinicSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl ClinicSubmitter {
    /// Create a submitter posting to `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Create a submitter from the `[submission]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.submission.endpoint)
    }

    /// Request body for `payload`; `{}` when there is none
    pub fn encode(payload: Option<&SubmissionPayload>) -> Result<Vec<u8>> {
        let body = match payload {
            Some(payload) => serde_json::to_vec_pretty(payload)?,
            None => serde_json::to_vec_pretty(&serde_json::Map::new())?,
        };
        Ok(body)
    }

    /// POST the payload and report what happened
    ///
    /// Never fails: every error ends up in the outcome and the log.
    pub async fn submit(&self, payload: Option<&SubmissionPayload>) -> SubmissionOutcome {
        match self.send(payload).await {
            Ok((status, body)) => {
                info!(status, response = %body, "clinic submission answered");
                SubmissionOutcome::Delivered { status, body }
            }
            Err(e) => {
                warn!("clinic submission failed: {}", e);
                SubmissionOutcome::TransportFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fire-and-forget submit on the current runtime
    ///
    /// Returns immediately; the handle may be dropped without cancelling
    /// the request.
    pub fn submit_detached(&self, payload: Option<SubmissionPayload>) -> JoinHandle<SubmissionOutcome> {
        let submitter = self.clone();
        tokio::spawn(async move { submitter.submit(payload.as_ref()).await })
    }

    async fn send(&self, payload: Option<&SubmissionPayload>) -> Result<(u16, ResponseBody)> {
        let body = Self::encode(payload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Submission(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Submission(format!("Failed to read response: {}", e)))?;

        Ok((status, ResponseBody::parse(&bytes)))
    }
}
