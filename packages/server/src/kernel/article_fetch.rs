//! Article fetch with backoff against read-after-write lag.
//!
//! The store fires its "article created" webhook before the article is
//! always queryable, so an empty body on the first read is expected. The
//! fetch is repeated on a fixed `base * 2^attempt` schedule (1s, 2s, 4s by
//! default). Once retries run out the last answer is returned as-is, even
//! if it is still empty; "not indexed yet" and "no content" look the same.
//!
//! Transport and GraphQL failures are not retried here.

use std::time::Duration;

use anyhow::{Context, Result};
use omnivore_client::Article;
use tokio::time::sleep;

use super::BaseArticleStore;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based). No jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

pub async fn fetch_article_with_retry(
    store: &dyn BaseArticleStore,
    article_id: &str,
    policy: &RetryPolicy,
) -> Result<Article> {
    let mut attempt = 0;

    loop {
        let article = store
            .fetch_article(article_id)
            .await
            .with_context(|| format!("Failed to fetch article {article_id}"))?;

        if article.has_content() {
            if attempt > 0 {
                tracing::info!(article_id, retries = attempt, "Article content available after retry");
            }
            return Ok(article);
        }

        if attempt >= policy.max_retries {
            tracing::warn!(
                article_id,
                attempts = attempt + 1,
                "Article still has no content after all retries"
            );
            return Ok(article);
        }

        let delay = policy.delay_for(attempt);
        tracing::debug!(
            article_id,
            attempt,
            delay_secs = delay.as_secs_f64(),
            "Article content empty, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}
