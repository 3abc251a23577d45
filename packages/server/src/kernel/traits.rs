// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no pipeline logic.
// What to prompt for and when to hand off lives in domains/annotation.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseArticleStore)

use anyhow::Result;
use async_trait::async_trait;
use omnivore_client::{Article, CreatedHighlight};

// =============================================================================
// Article Store Trait (Infrastructure - read-it-later service)
// =============================================================================

#[async_trait]
pub trait BaseArticleStore: Send + Sync {
    /// Fetch an article once. Empty content is a valid answer (not yet indexed).
    async fn fetch_article(&self, article_id: &str) -> Result<Article>;

    /// Attach a NOTE highlight with a freshly generated id.
    async fn create_note(&self, article_id: &str, annotation: &str) -> Result<CreatedHighlight>;
}

// =============================================================================
// AI Trait (Infrastructure - chat completion)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Run `instruction` against `article_content` as a single user message
    /// and return the trimmed text of the first choice.
    async fn complete(&self, instruction: &str, article_content: &str) -> Result<String>;
}

// =============================================================================
// Stage Trigger Trait (Infrastructure - pipeline handoff)
// =============================================================================

/// Fire-and-forget, at-most-once delivery of a handoff payload. Callers get
/// an acknowledgment (2xx) or an error; nothing is retried or queued.
#[async_trait]
pub trait BaseStageTrigger: Send + Sync {
    async fn trigger(&self, url: &str, payload: serde_json::Value) -> Result<()>;
}
