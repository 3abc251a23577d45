//! Stage webhooks.
//!
//! Summary is called by the article store on page creation and answers with
//! the outcome of its own run. Actions and flashcards are called by the
//! stage before them: they validate the handoff, answer `202 Accepted`, and
//! run in a detached task. A caller therefore only ever waits for the
//! acknowledgment, never for the stages downstream of it.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::domains::annotation::{
    run_stage, HandoffPayload, PageCreatedEvent, Stage, StageAccepted, StageError, StageInput,
};
use crate::server::app::AppState;

pub async fn summary_webhook(
    Extension(state): Extension<AppState>,
    payload: Result<Json<PageCreatedEvent>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(event)) => handle_stage(&state, Stage::Summary, event.into()).await,
        Err(rejection) => reject(Stage::Summary, rejection),
    }
}

pub async fn actions_webhook(
    Extension(state): Extension<AppState>,
    payload: Result<Json<HandoffPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(handoff)) => accept_stage(&state, Stage::Actions, handoff.into()),
        Err(rejection) => reject(Stage::Actions, rejection),
    }
}

pub async fn flashcards_webhook(
    Extension(state): Extension<AppState>,
    payload: Result<Json<HandoffPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(handoff)) => accept_stage(&state, Stage::Flashcards, handoff.into()),
        Err(rejection) => reject(Stage::Flashcards, rejection),
    }
}

async fn handle_stage(state: &AppState, stage: Stage, input: StageInput) -> Response {
    if let Some(response) = missing_article_id(stage, &input) {
        return response;
    }

    match run_stage(&state.server_deps, stage, input).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!(stage = %stage, error = %e, "Stage failed");
            (status_for(&e), e.to_string()).into_response()
        }
    }
}

/// Start the stage in the background and acknowledge the handoff.
///
/// The task is not tied to the request: the caller hanging up or timing out
/// does not cancel it. Failures are only logged.
fn accept_stage(state: &AppState, stage: Stage, input: StageInput) -> Response {
    if let Some(response) = missing_article_id(stage, &input) {
        return response;
    }

    let accepted = StageAccepted {
        stage,
        article_id: input.article_id.clone(),
    };
    let deps = state.server_deps.clone();

    tokio::spawn(async move {
        let article_id = input.article_id.clone();
        match run_stage(&deps, stage, input).await {
            Ok(outcome) => info!(
                stage = %stage,
                article_id = %article_id,
                annotation_posted = outcome.annotation_posted,
                next_stage_triggered = outcome.next_stage_triggered,
                "Background stage finished"
            ),
            Err(e) => error!(
                stage = %stage,
                article_id = %article_id,
                status = status_for(&e).as_u16(),
                error = %e,
                "Background stage failed"
            ),
        }
    });

    info!(stage = %stage, article_id = %accepted.article_id, "Handoff accepted");
    (StatusCode::ACCEPTED, Json(accepted)).into_response()
}

fn missing_article_id(stage: Stage, input: &StageInput) -> Option<Response> {
    if input.article_id.trim().is_empty() {
        warn!(stage = %stage, "Webhook payload has no article id");
        return Some((StatusCode::UNPROCESSABLE_ENTITY, "missing article id").into_response());
    }
    None
}

/// Upstream failures map to 502; an article that never got content is 422.
pub fn status_for(error: &StageError) -> StatusCode {
    match error {
        StageError::ArticleFetch { .. } | StageError::Generation { .. } => StatusCode::BAD_GATEWAY,
        StageError::EmptyArticle { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn reject(stage: Stage, rejection: JsonRejection) -> Response {
    warn!(stage = %stage, error = %rejection.body_text(), "Malformed webhook payload");
    (StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()).into_response()
}
