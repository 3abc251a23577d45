//! The chain served on a real socket with the production HTTP trigger.

mod common;

use std::sync::Arc;
use std::time::Duration;

use annotation_core::config::PipelineSettings;
use annotation_core::domains::annotation::prompts::{ACTIONS_INSTRUCTION, FLASHCARDS_INSTRUCTION};
use annotation_core::kernel::test_dependencies::MockArticleStore;
use annotation_core::kernel::{HttpStageTrigger, RetryPolicy, ServerDeps};
use annotation_core::server::build_app;
use serde_json::Value;

use crate::common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_downstream_stages_do_not_block_or_get_cancelled() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let store = Arc::new(MockArticleStore::new().with_article("Rust", "# Ownership"));
    // Downstream generation takes longer than the trigger waits
    let ai = SlowAI::new(
        Duration::from_secs(2),
        vec![ACTIONS_INSTRUCTION, FLASHCARDS_INSTRUCTION],
    );
    let deps = ServerDeps::new(
        store.clone(),
        Arc::new(ai),
        Arc::new(HttpStageTrigger::with_timeout(Duration::from_secs(1)).unwrap()),
        PipelineSettings {
            public_base_url: base_url.clone(),
            ..PipelineSettings::default()
        },
    )
    .with_retry_policy(RetryPolicy {
        base_delay: Duration::ZERO,
        ..RetryPolicy::default()
    });

    let app = build_app(deps, TEST_TIMEOUT);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::Client::new()
        .post(format!("{base_url}/webhooks/summary"))
        .json(&serde_json::json!({"page": {"id": "page-1"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let outcome: Value = response.json().await.unwrap();
    assert_eq!(outcome["nextStageTriggered"], true);

    // actions (2s) then flashcards (2s), both past the 1s trigger timeout
    assert!(wait_until(Duration::from_secs(10), || store.note_calls().len() == 3).await);

    let article_ids: Vec<String> = store
        .note_calls()
        .into_iter()
        .map(|note| note.article_id)
        .collect();
    assert_eq!(article_ids, vec!["page-1", "page-1", "page-1"]);
}
