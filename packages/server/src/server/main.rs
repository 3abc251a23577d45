// Main entry point for the annotation webhook server

use std::sync::Arc;

use anyhow::{Context, Result};
use annotation_core::kernel::{HttpStageTrigger, OmnivoreAdapter, OpenAICompletion, ServerDeps};
use annotation_core::{server::build_app, Config};
use omnivore_client::OmnivoreClient;
use openai_client::OpenAIClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,annotation_core=debug,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting article annotation server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        model = %config.completion.model,
        summary_samples = config.pipeline.summary_samples,
        public_base_url = %config.pipeline.public_base_url,
        "Configuration loaded"
    );

    // Article store
    let omnivore = OmnivoreClient::new(config.omnivore.clone())
        .context("Failed to create article store client")?;
    tracing::info!(endpoint = %omnivore.endpoint(), "Article store client ready");

    // Completion provider
    let mut openai = OpenAIClient::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.openai_base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    tracing::info!(base_url = %openai.base_url(), "Completion client ready");

    let server_deps = ServerDeps::new(
        Arc::new(OmnivoreAdapter::new(Arc::new(omnivore))),
        Arc::new(OpenAICompletion::new(openai, config.completion.clone())),
        Arc::new(HttpStageTrigger::new().context("Failed to create stage trigger client")?),
        config.pipeline.clone(),
    );

    // Build application
    let app = build_app(server_deps, config.request_timeout);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
