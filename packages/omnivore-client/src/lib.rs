//! Omnivore GraphQL client.
//!
//! Covers the two operations the annotation pipeline needs: reading an
//! article as markdown and attaching a NOTE highlight to it. Every call is a
//! single attempt; retry policy belongs to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use omnivore_client::{OmnivoreClient, OmnivoreConfig};
//!
//! let client = OmnivoreClient::new(OmnivoreConfig {
//!     api_key: Some("your-api-key".into()),
//!     ..Default::default()
//! })?;
//!
//! let article = client.fetch_article("my-article-slug").await?;
//! let highlight = client.create_note("article-id", "A short summary").await?;
//! println!("{} -> {}", article.title, highlight.short_id);
//! ```

pub mod error;
pub mod escape;
pub mod types;

pub use error::{OmnivoreError, Result};
pub use escape::{escape_string_value, unescape_string_value};
pub use types::{Article, CreatedHighlight, Label, NewHighlight, SHORT_ID_LEN};

use reqwest::header::AUTHORIZATION;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use types::{
    ArticleData, ArticleResult, ArticleVariables, CreateHighlightData, GraphQLRequest,
    GraphQLResponse, HighlightResult,
};

pub const DEFAULT_ENDPOINT: &str = "https://api-prod.omnivore.app/api/graphql";

/// Owner marker sent as `username` on article lookups; the API resolves it
/// to the key's owner.
pub const DEFAULT_USERNAME: &str = "me";

const ARTICLE_QUERY: &str = r#"query Article($username: String!, $slug: String!, $format: String) {
  article(username: $username, slug: $slug, format: $format) {
    ... on ArticleSuccess {
      article { id title content labels { name } }
    }
    ... on ArticleError { errorCodes }
  }
}"#;

/// Connection settings. Passed in explicitly; the client never reads the
/// process environment.
#[derive(Debug, Clone)]
pub struct OmnivoreConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub username: String,
}

impl Default for OmnivoreConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: DEFAULT_USERNAME.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct OmnivoreClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    username: String,
}

impl std::fmt::Debug for OmnivoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmnivoreClient")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl OmnivoreClient {
    /// Fails with [`OmnivoreError::Config`] when no API key is configured.
    pub fn new(config: OmnivoreConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OmnivoreError::Config("Omnivore API key is not set".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: config.endpoint,
            username: config.username,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch an article by slug, rendered as markdown.
    ///
    /// A freshly saved article can come back with empty content until the
    /// store finishes indexing it; that is returned as-is, not as an error.
    pub async fn fetch_article(&self, slug: &str) -> Result<Article> {
        let variables = ArticleVariables {
            username: &self.username,
            slug,
            format: "markdown",
        };

        let data: ArticleData = self
            .execute("Article", ARTICLE_QUERY, Some(variables))
            .await?;

        match data.article {
            ArticleResult::Success { article } => {
                debug!(
                    slug,
                    title = %article.title,
                    content_len = article.content.len(),
                    "Fetched article"
                );
                Ok(article)
            }
            ArticleResult::Error { error_codes } => {
                warn!(slug, codes = ?error_codes, "Article query rejected");
                Err(OmnivoreError::Rejected {
                    operation: "Article",
                    codes: error_codes,
                })
            }
        }
    }

    /// Attach a NOTE highlight with a freshly generated id.
    pub async fn create_note(
        &self,
        article_id: &str,
        annotation: &str,
    ) -> Result<CreatedHighlight> {
        self.create_highlight(&NewHighlight::note(article_id, annotation))
            .await
    }

    pub async fn create_highlight(&self, highlight: &NewHighlight) -> Result<CreatedHighlight> {
        let mutation = create_highlight_mutation(highlight);

        let data: CreateHighlightData = self
            .execute::<(), _>("CreateHighlight", &mutation, None)
            .await?;

        match data.create_highlight {
            HighlightResult::Success { highlight: created } => {
                debug!(
                    article_id = %highlight.article_id,
                    highlight_id = %created.id,
                    "Created highlight"
                );
                Ok(created)
            }
            HighlightResult::Error { error_codes } => {
                warn!(
                    article_id = %highlight.article_id,
                    codes = ?error_codes,
                    "CreateHighlight rejected"
                );
                Err(OmnivoreError::Rejected {
                    operation: "CreateHighlight",
                    codes: error_codes,
                })
            }
        }
    }

    async fn execute<V: Serialize, T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: Option<V>,
    ) -> Result<T> {
        let body = GraphQLRequest {
            query,
            operation_name,
            variables,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(operation = operation_name, error = %e, "Omnivore request failed");
                OmnivoreError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(operation = operation_name, status = %status, error = %message, "Omnivore API error");
            return Err(OmnivoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GraphQLResponse<T> = resp.json().await?;
        unwrap_envelope(operation_name, envelope)
    }
}

fn unwrap_envelope<T>(operation_name: &str, envelope: GraphQLResponse<T>) -> Result<T> {
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        warn!(operation = operation_name, errors = ?messages, "GraphQL errors");
        return Err(OmnivoreError::GraphQL(messages));
    }

    envelope
        .data
        .ok_or_else(|| OmnivoreError::Parse(format!("{operation_name}: response has no data")))
}

/// Build the mutation document with every value inlined as an escaped
/// string literal.
fn create_highlight_mutation(highlight: &NewHighlight) -> String {
    format!(
        r#"mutation CreateHighlight {{
  createHighlight(input: {{
    type: NOTE,
    id: "{id}",
    shortId: "{short_id}",
    articleId: "{article_id}",
    annotation: "{annotation}"
  }}) {{
    ... on CreateHighlightSuccess {{
      highlight {{ id shortId annotation createdAt }}
    }}
    ... on CreateHighlightError {{ errorCodes }}
  }}
}}"#,
        id = escape_string_value(&highlight.id),
        short_id = escape_string_value(&highlight.short_id),
        article_id = escape_string_value(&highlight.article_id),
        annotation = escape_string_value(&highlight.annotation),
    )
}
