//! Publishing the occupancy snapshot to the remote store.
//!
//! The remote side is a JSON key-value store (Firebase Realtime Database in
//! production) that replaces the whole node on every PUT, so each publish
//! carries the complete state rather than a delta.

use crate::config::RemoteConfig;
use crate::state::OccupancyState;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from a single publish attempt.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The server answered with something other than 200.
    #[error("remote store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// DNS, connect, TLS or timeout failure.
    #[error("request to remote store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode occupancy state: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PublishError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Encode(_) => None,
        }
    }
}

/// Sink for full-state snapshots.
#[async_trait]
pub trait StatePublisher: Send {
    /// Send the complete state. Called once per accepted reading.
    async fn publish(&mut self, state: &OccupancyState) -> Result<(), PublishError>;
}

/// Publishes with an HTTP PUT of the JSON-encoded state.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
    url: String,
    auth_token: Option<String>,
}

impl HttpPublisher {
    pub fn new(config: &RemoteConfig) -> Result<Self, PublishError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
            auth_token: config.bearer_token().map(str::to_string),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn has_auth(&self) -> bool {
        self.auth_token.is_some()
    }
}

#[async_trait]
impl StatePublisher for HttpPublisher {
    async fn publish(&mut self, state: &OccupancyState) -> Result<(), PublishError> {
        let body = serde_json::to_vec(state)?;

        let mut request = self
            .client
            .put(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %self.url, "remote store responded");

        // Only 200 counts; Firebase answers a successful PUT with exactly that.
        if status == StatusCode::OK {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(PublishError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
