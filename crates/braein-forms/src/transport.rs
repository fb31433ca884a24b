//! Submission transport
//!
//! The controller only needs "send this payload, tell me if it arrived".
//! Wire format, authentication and retries belong to the transport.

use crate::submission::{FormSubmission, SubmissionReceipt};
use async_trait::async_trait;
use braein_common::FormsConfig;
use std::time::Duration;
use thiserror::Error;

/// Delivery failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("payload encoding failed: {0}")]
    Encoding(String),
}

/// Channel that delivers a validated submission
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn send(&self, payload: &FormSubmission) -> Result<SubmissionReceipt, TransportError>;
}

/// Stand-in transport: waits, logs the payload and accepts it
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    latency: Duration,
    failure: Option<String>,
}

impl SimulatedTransport {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failure: None,
        }
    }

    /// Transport that always fails with `reason`
    pub fn failing(latency: Duration, reason: impl Into<String>) -> Self {
        Self {
            latency,
            failure: Some(reason.into()),
        }
    }

    pub fn from_config(config: &FormsConfig) -> Self {
        Self {
            latency: config.simulated_latency(),
            failure: config.simulated_failure.clone(),
        }
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::from_config(&FormsConfig::default())
    }
}

#[async_trait]
impl SubmissionTransport for SimulatedTransport {
    async fn send(&self, payload: &FormSubmission) -> Result<SubmissionReceipt, TransportError> {
        tokio::time::sleep(self.latency).await;

        let body =
            serde_json::to_string(payload).map_err(|e| TransportError::Encoding(e.to_string()))?;
        tracing::info!(payload = %body, "form data to be sent");

        match &self.failure {
            Some(reason) => Err(TransportError::Network(reason.clone())),
            None => Ok(SubmissionReceipt::accepted()),
        }
    }
}
