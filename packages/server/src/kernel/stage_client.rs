//! Pipeline stage handoff client
//!
//! Simple HTTP client for POSTing a handoff payload to the next stage's
//! webhook. At-most-once: a lost or duplicated trigger is an accepted risk,
//! there is no queue behind this and no retry.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::BaseStageTrigger;

pub const DEFAULT_TRIGGER_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for triggering pipeline stages via HTTP
#[derive(Clone)]
pub struct HttpStageTrigger {
    http_client: Arc<reqwest::Client>,
}

impl HttpStageTrigger {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TRIGGER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client: Arc::new(client),
        })
    }
}

#[async_trait]
impl BaseStageTrigger for HttpStageTrigger {
    async fn trigger(&self, url: &str, payload: serde_json::Value) -> Result<()> {
        tracing::debug!(url = %url, "Triggering next pipeline stage");

        let response = self
            .http_client
            .post(url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to send stage trigger to {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            anyhow::bail!("Stage trigger to {} failed ({}): {}", url, status, body);
        }

        Ok(())
    }
}
