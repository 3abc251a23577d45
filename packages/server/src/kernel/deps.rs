//! Server dependencies for stage handlers (using traits for testability)
//!
//! This module provides the central dependency container handed to every
//! stage. All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use omnivore_client::{Article, CreatedHighlight, OmnivoreClient};
use std::sync::Arc;

use crate::config::PipelineSettings;
use crate::kernel::{BaseAI, BaseArticleStore, BaseStageTrigger, RetryPolicy};

// =============================================================================
// OmnivoreClient Adapter (implements BaseArticleStore trait)
// =============================================================================

/// Wrapper around OmnivoreClient that implements BaseArticleStore trait
pub struct OmnivoreAdapter(pub Arc<OmnivoreClient>);

impl OmnivoreAdapter {
    pub fn new(client: Arc<OmnivoreClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseArticleStore for OmnivoreAdapter {
    async fn fetch_article(&self, article_id: &str) -> Result<Article> {
        self.0
            .fetch_article(article_id)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    async fn create_note(&self, article_id: &str, annotation: &str) -> Result<CreatedHighlight> {
        self.0
            .create_note(article_id, annotation)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies shared by all stage handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseArticleStore>,
    pub ai: Arc<dyn BaseAI>,
    pub trigger: Arc<dyn BaseStageTrigger>,
    pub retry_policy: RetryPolicy,
    pub pipeline: PipelineSettings,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseArticleStore>,
        ai: Arc<dyn BaseAI>,
        trigger: Arc<dyn BaseStageTrigger>,
        pipeline: PipelineSettings,
    ) -> Self {
        Self {
            store,
            ai,
            trigger,
            retry_policy: RetryPolicy::default(),
            pipeline,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}
