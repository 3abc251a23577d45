use serde::{Deserialize, Serialize};

/// Article-created event delivered by the article store to the first stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCreatedEvent {
    pub page: PageRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRef {
    pub id: String,
}

/// Body one stage POSTs to the next. Not versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffPayload {
    pub article_id: String,
    /// Article markdown as the sending stage saw it
    #[serde(default)]
    pub article: String,
    /// Annotation produced by the sending stage
    #[serde(default)]
    pub article_annotation: String,
    /// Highlight id created by the sending stage; null when the post failed
    #[serde(default)]
    pub id: Option<String>,
}

/// What a stage starts from, whichever way it was invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct StageInput {
    pub article_id: String,
    /// Content carried over from the previous stage, if any
    pub article: Option<String>,
}

impl From<PageCreatedEvent> for StageInput {
    fn from(event: PageCreatedEvent) -> Self {
        Self {
            article_id: event.page.id,
            article: None,
        }
    }
}

impl From<HandoffPayload> for StageInput {
    fn from(payload: HandoffPayload) -> Self {
        let article = Some(payload.article).filter(|content| !content.trim().is_empty());
        Self {
            article_id: payload.article_id,
            article,
        }
    }
}
