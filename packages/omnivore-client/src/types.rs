use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Length of the display key Omnivore derives from a highlight id.
pub const SHORT_ID_LEN: usize = 8;

/// An article as returned by the `Article` query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Markdown body. Empty while the article is still being indexed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Article {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
}

/// A NOTE highlight about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHighlight {
    pub id: String,
    pub short_id: String,
    pub article_id: String,
    /// Raw annotation text; escaped when the mutation is built.
    pub annotation: String,
}

impl NewHighlight {
    /// A note with a fresh v4 id and its 8-character short id.
    pub fn note(article_id: impl Into<String>, annotation: impl Into<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let short_id = id[..SHORT_ID_LEN].to_string();
        Self {
            id,
            short_id,
            article_id: article_id.into(),
            annotation: annotation.into(),
        }
    }
}

/// The highlight echoed back by a successful `createHighlight`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedHighlight {
    pub id: String,
    pub short_id: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// GraphQL envelopes
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphQLRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub operation_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ArticleVariables<'a> {
    pub username: &'a str,
    pub slug: &'a str,
    pub format: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArticleData {
    pub article: ArticleResult,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ArticleResult {
    Success {
        article: Article,
    },
    Error {
        #[serde(rename = "errorCodes")]
        error_codes: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateHighlightData {
    #[serde(rename = "createHighlight")]
    pub create_highlight: HighlightResult,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HighlightResult {
    Success {
        highlight: CreatedHighlight,
    },
    Error {
        #[serde(rename = "errorCodes")]
        error_codes: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_prefix_of_id() {
        for _ in 0..32 {
            let note = NewHighlight::note("article-1", "text");
            assert_eq!(note.short_id.len(), SHORT_ID_LEN);
            assert_eq!(note.short_id, &note.id[..SHORT_ID_LEN]);
            assert!(Uuid::parse_str(&note.id).is_ok());
        }
    }

    #[test]
    fn each_note_gets_a_fresh_id() {
        let a = NewHighlight::note("article-1", "text");
        let b = NewHighlight::note("article-1", "text");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn article_result_success_parses() {
        let data: ArticleData = serde_json::from_str(
            r##"{"article": {"article": {"title": "T", "content": "# Body", "labels": [{"name": "rust"}]}}}"##,
        )
        .unwrap();

        match data.article {
            ArticleResult::Success { article } => {
                assert_eq!(article.title, "T");
                assert!(article.has_content());
                assert_eq!(article.label_names(), vec!["rust"]);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn article_result_error_parses() {
        let data: ArticleData =
            serde_json::from_str(r#"{"article": {"errorCodes": ["NOT_FOUND"]}}"#).unwrap();

        assert!(matches!(
            data.article,
            ArticleResult::Error { ref error_codes } if error_codes.len() == 1 && error_codes[0] == "NOT_FOUND"
        ));
    }

    #[test]
    fn null_content_is_treated_as_empty() {
        let article: Article = serde_json::from_str(r#"{"title": "T", "content": null}"#).unwrap();
        assert!(!article.has_content());
        assert!(article.labels.is_empty());
    }
}
