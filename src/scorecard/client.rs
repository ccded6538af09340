//! Remote endpoint client for submission delivery
//!
//! The endpoint is opaque: one POST per attempt, no retry or backoff of its
//! own. The coordinator interprets HTTP 200 as accepted and anything else,
//! including transport failure, as "still pending".

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Outcome of a delivery attempt that reached the endpoint
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    pub status: u16,
    pub body: String,
}

impl DeliveryResponse {
    /// The endpoint accepts a submission with exactly HTTP 200
    pub fn is_accepted(&self) -> bool {
        self.status == 200
    }
}

/// Contract for posting an encoded score-card to the remote endpoint
///
/// Transport failure is the `Err` arm; a reply of any status is `Ok`.
#[async_trait]
pub trait EndpointClient: Send + Sync {
    async fn post(&self, payload: &Value) -> Result<DeliveryResponse>;
}

/// reqwest-backed client with connection pooling
pub struct HttpEndpointClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpEndpointClient {
    pub fn new(endpoint: String) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("scorecard-cli/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self { endpoint, http_client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    async fn post(&self, payload: &Value) -> Result<DeliveryResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach endpoint {}", self.endpoint))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(DeliveryResponse { status, body })
    }
}
