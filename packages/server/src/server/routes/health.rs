use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::domains::annotation::Stage;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    stages: Vec<Stage>,
}

/// Liveness only. Upstream services are not checked: a stage that cannot reach
/// them reports that on its own response.
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            stages: Stage::ALL.to_vec(),
        }),
    )
}
