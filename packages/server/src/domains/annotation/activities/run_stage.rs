//! Stage runner shared by all three webhooks.
//!
//! received → article fetched → annotation produced → annotation posted →
//! next stage triggered → responded. Linear; retries only happen inside the
//! article fetch. Nothing is rolled back: if the trigger fails after the
//! highlight was posted, the highlight stays and the pipeline stops there.
//!
//! Fetch and generation failures abort the stage. A failed highlight post or
//! trigger is logged and reported in the outcome, and the stage carries on.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domains::annotation::models::{
    Generation, HandoffPayload, Stage, StageInput, StageOutcome,
};
use crate::kernel::{fetch_article_with_retry, select_best, ServerDeps};

#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to fetch article {article_id}: {reason}")]
    ArticleFetch { article_id: String, reason: String },

    #[error("article {article_id} has no content")]
    EmptyArticle { article_id: String },

    #[error("{stage} generation failed for article {article_id}: {reason}")]
    Generation {
        stage: Stage,
        article_id: String,
        reason: String,
    },
}

pub async fn run_stage(
    deps: &ServerDeps,
    stage: Stage,
    input: StageInput,
) -> std::result::Result<StageOutcome, StageError> {
    let StageInput {
        article_id,
        article,
    } = input;

    info!(stage = %stage, article_id = %article_id, "Stage received");

    let content = match article {
        Some(content) => {
            debug!(stage = %stage, article_id = %article_id, "Using article from handoff");
            content
        }
        None => load_article(deps, &article_id).await?,
    };

    let annotation = produce_annotation(deps, stage, &content)
        .await
        .map_err(|e| {
            warn!(stage = %stage, article_id = %article_id, error = %e, "Annotation generation failed");
            StageError::Generation {
                stage,
                article_id: article_id.clone(),
                reason: format!("{e:#}"),
            }
        })?;

    info!(
        stage = %stage,
        article_id = %article_id,
        annotation_length = annotation.len(),
        "Annotation produced"
    );

    let highlight_id = match deps.store.create_note(&article_id, &annotation).await {
        Ok(highlight) => {
            info!(stage = %stage, article_id = %article_id, highlight_id = %highlight.id, "Annotation posted");
            Some(highlight.id)
        }
        Err(e) => {
            warn!(stage = %stage, article_id = %article_id, error = %e, "Failed to post annotation");
            None
        }
    };

    let next_stage = stage.next();
    let next_stage_triggered = match next_stage {
        Some(next) => {
            let payload = HandoffPayload {
                article_id: article_id.clone(),
                article: content,
                article_annotation: annotation.clone(),
                id: highlight_id.clone(),
            };
            trigger_stage(deps, next, &payload).await
        }
        None => false,
    };

    Ok(StageOutcome {
        stage,
        article_id,
        annotation,
        annotation_posted: highlight_id.is_some(),
        highlight_id,
        next_stage,
        next_stage_triggered,
    })
}

async fn load_article(deps: &ServerDeps, article_id: &str) -> std::result::Result<String, StageError> {
    let article = fetch_article_with_retry(deps.store.as_ref(), article_id, &deps.retry_policy)
        .await
        .map_err(|e| {
            warn!(article_id, error = %e, "Article fetch failed");
            StageError::ArticleFetch {
                article_id: article_id.to_string(),
                reason: format!("{e:#}"),
            }
        })?;

    if !article.has_content() {
        warn!(article_id, "Article has no content, stopping stage");
        return Err(StageError::EmptyArticle {
            article_id: article_id.to_string(),
        });
    }

    debug!(
        article_id,
        title = %article.title,
        labels = ?article.label_names(),
        "Article fetched"
    );
    Ok(article.content)
}

async fn produce_annotation(deps: &ServerDeps, stage: Stage, content: &str) -> Result<String> {
    let instruction = stage.instruction(&deps.pipeline);

    match stage.generation(&deps.pipeline) {
        Generation::BestOfN(n) => select_best(deps.ai.as_ref(), instruction, n, content).await,
        Generation::Single => deps.ai.complete(instruction, content).await,
    }
}

/// Returns whether the next stage acknowledged the handoff.
async fn trigger_stage(deps: &ServerDeps, next: Stage, payload: &HandoffPayload) -> bool {
    let url = next.url(&deps.pipeline.public_base_url);

    let body = match serde_json::to_value(payload) {
        Ok(body) => body,
        Err(e) => {
            warn!(next_stage = %next, error = %e, "Failed to serialize handoff payload");
            return false;
        }
    };

    match deps.trigger.trigger(&url, body).await {
        Ok(()) => {
            info!(next_stage = %next, article_id = %payload.article_id, "Next stage triggered");
            true
        }
        Err(e) => {
            warn!(
                next_stage = %next,
                article_id = %payload.article_id,
                url = %url,
                error = %e,
                "Failed to trigger next stage; pipeline stops here"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{MockAI, MockArticleStore, MockStageTrigger};
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn test_summary_stage_fetches_posts_and_hands_off() {
        let test_deps = TestDependencies::new()
            .mock_store(MockArticleStore::new().with_article("Title", "# Body"))
            .mock_ai(MockAI::new().with_response_for(
                "Mock AI response\nMock AI response\nMock AI response",
                "Refined summary",
            ));
        let deps = test_deps.clone().into_deps();

        let outcome = run_stage(
            &deps,
            Stage::Summary,
            StageInput {
                article_id: "abc123".into(),
                article: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.annotation, "Refined summary");
        assert!(outcome.annotation_posted);
        assert_eq!(outcome.next_stage, Some(Stage::Actions));
        assert!(outcome.next_stage_triggered);

        assert_eq!(test_deps.store.fetch_calls(), vec!["abc123"]);
        assert_eq!(test_deps.ai.call_count(), 4);

        let notes = test_deps.store.note_calls();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].annotation, "Refined summary");

        let triggers = test_deps.trigger.calls();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].url, "http://localhost:8080/webhooks/actions");
        assert_eq!(triggers[0].payload["articleId"], "abc123");
        assert_eq!(triggers[0].payload["article"], "# Body");
        assert_eq!(triggers[0].payload["articleAnnotation"], "Refined summary");
        assert_eq!(
            triggers[0].payload["id"].as_str(),
            outcome.highlight_id.as_deref()
        );
    }

    #[tokio::test]
    async fn test_handoff_content_skips_fetch() {
        let test_deps = TestDependencies::new().mock_ai(MockAI::new().with_response("- [ ] Do it"));
        let deps = test_deps.clone().into_deps();

        let outcome = run_stage(
            &deps,
            Stage::Actions,
            StageInput {
                article_id: "abc123".into(),
                article: Some("# Body".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.annotation, "- [ ] Do it");
        assert!(test_deps.store.fetch_calls().is_empty());
        assert_eq!(test_deps.ai.call_count(), 1);
        assert_eq!(test_deps.ai.calls()[0].content, "# Body");
        assert_eq!(
            test_deps.trigger.calls()[0].url,
            "http://localhost:8080/webhooks/flashcards"
        );
    }

    #[tokio::test]
    async fn test_final_stage_triggers_nothing() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.clone().into_deps();

        let outcome = run_stage(
            &deps,
            Stage::Flashcards,
            StageInput {
                article_id: "abc123".into(),
                article: Some("# Body".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.next_stage, None);
        assert!(!outcome.next_stage_triggered);
        assert!(test_deps.trigger.calls().is_empty());
        assert_eq!(test_deps.store.note_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_post_still_triggers_next_stage() {
        let test_deps = TestDependencies::new()
            .mock_store(MockArticleStore::new().failing_notes("store unavailable"));
        let deps = test_deps.clone().into_deps();

        let outcome = run_stage(
            &deps,
            Stage::Actions,
            StageInput {
                article_id: "abc123".into(),
                article: Some("# Body".into()),
            },
        )
        .await
        .unwrap();

        assert!(!outcome.annotation_posted);
        assert_eq!(outcome.highlight_id, None);
        assert!(outcome.next_stage_triggered);
        assert!(test_deps.trigger.calls()[0].payload["id"].is_null());
    }

    #[tokio::test]
    async fn test_failed_trigger_keeps_posted_annotation() {
        let test_deps =
            TestDependencies::new().mock_trigger(MockStageTrigger::new().failing("connection refused"));
        let deps = test_deps.clone().into_deps();

        let outcome = run_stage(
            &deps,
            Stage::Actions,
            StageInput {
                article_id: "abc123".into(),
                article: Some("# Body".into()),
            },
        )
        .await
        .unwrap();

        assert!(outcome.annotation_posted);
        assert!(!outcome.next_stage_triggered);
        assert_eq!(test_deps.trigger.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_before_generation() {
        let test_deps = TestDependencies::new()
            .mock_store(MockArticleStore::new().with_fetch_error("unauthorized"));
        let deps = test_deps.clone().into_deps();

        let err = run_stage(
            &deps,
            Stage::Summary,
            StageInput {
                article_id: "abc123".into(),
                article: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StageError::ArticleFetch { .. }));
        assert!(err.to_string().contains("unauthorized"));
        assert_eq!(test_deps.ai.call_count(), 0);
        assert!(test_deps.store.note_calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_article_after_retries_aborts() {
        let store = MockArticleStore::new()
            .with_article("T", "")
            .with_article("T", "")
            .with_article("T", "")
            .with_article("T", "");
        let test_deps = TestDependencies::new().mock_store(store);
        let deps = test_deps.clone().into_deps();

        let err = run_stage(
            &deps,
            Stage::Summary,
            StageInput {
                article_id: "abc123".into(),
                article: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StageError::EmptyArticle { .. }));
        assert_eq!(test_deps.store.fetch_calls().len(), 4);
        assert_eq!(test_deps.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_error_aborts_before_post() {
        let test_deps = TestDependencies::new().mock_ai(MockAI::new().with_error("quota exceeded"));
        let deps = test_deps.clone().into_deps();

        let err = run_stage(
            &deps,
            Stage::Actions,
            StageInput {
                article_id: "abc123".into(),
                article: Some("# Body".into()),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StageError::Generation { stage: Stage::Actions, .. }));
        assert!(test_deps.store.note_calls().is_empty());
        assert!(test_deps.trigger.calls().is_empty());
    }
}
