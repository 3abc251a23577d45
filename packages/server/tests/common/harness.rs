//! Router harness: drives the axum app in-process with `oneshot`, plus
//! helpers for stages that finish in the background.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use annotation_core::kernel::{BaseAI, BaseStageTrigger, TestDependencies};
use annotation_core::server::build_app;
use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the app on top of mocked dependencies.
pub fn test_app(deps: &TestDependencies) -> Router {
    build_app(deps.clone().into_deps(), TEST_TIMEOUT)
}

pub async fn post_json(app: &Router, path: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Stage trigger that delivers the handoff to a router in the same process,
/// so a single request runs the whole chain.
#[derive(Clone, Default)]
pub struct LoopbackTrigger {
    router: Arc<Mutex<Option<Router>>>,
    base_url: String,
    delivered: Arc<Mutex<Vec<(String, StatusCode)>>>,
}

impl LoopbackTrigger {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Attach the router built from the deps that hold this trigger.
    pub fn attach(&self, router: Router) {
        *self.router.lock().unwrap() = Some(router);
    }

    /// Paths delivered so far with the status each stage answered
    pub fn delivered(&self) -> Vec<(String, StatusCode)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseStageTrigger for LoopbackTrigger {
    async fn trigger(&self, url: &str, payload: serde_json::Value) -> Result<()> {
        let path = url
            .strip_prefix(&self.base_url)
            .ok_or_else(|| anyhow::anyhow!("unexpected stage url {url}"))?
            .to_string();
        let router = self
            .router
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("router not attached"))?;

        let (status, body) = post_json(&router, &path, &payload.to_string()).await;
        self.delivered.lock().unwrap().push((path, status));

        if !status.is_success() {
            anyhow::bail!("stage answered {status}: {body}");
        }
        Ok(())
    }
}

/// Poll `condition` every 10ms until it holds or `limit` runs out.
pub async fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Completion provider that takes `delay` to answer the listed instructions
/// and answers everything else at once.
pub struct SlowAI {
    delay: Duration,
    slow_for: Vec<&'static str>,
}

impl SlowAI {
    pub fn new(delay: Duration, slow_for: Vec<&'static str>) -> Self {
        Self { delay, slow_for }
    }
}

#[async_trait]
impl BaseAI for SlowAI {
    async fn complete(&self, instruction: &str, _article_content: &str) -> Result<String> {
        if self.slow_for.iter().any(|slow| *slow == instruction) {
            tokio::time::sleep(self.delay).await;
        }
        Ok("Slow AI response".to_string())
    }
}
