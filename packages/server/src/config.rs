use anyhow::{Context, Result};
use dotenvy::dotenv;
use omnivore_client::{OmnivoreConfig, DEFAULT_ENDPOINT, DEFAULT_USERNAME};
use std::env;
use std::time::Duration;

use crate::kernel::ai::{CompletionConfig, ModelSettings, DEFAULT_MODEL};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SUMMARY_SAMPLES: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Stage wiring shared by every handler
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Where this service is reachable by itself; next-stage URLs hang off it.
    pub public_base_url: String,
    /// Completions sampled for the summary before refinement
    pub summary_samples: usize,
    /// Base instruction for the final (flashcards) stage. `None` uses the built-in one.
    pub final_stage_instruction: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            summary_samples: DEFAULT_SUMMARY_SAMPLES,
            final_stage_instruction: None,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub request_timeout: Duration,
    pub omnivore: OmnivoreConfig,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub completion: CompletionConfig,
    pub pipeline: PipelineSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let summary_samples = var("SUMMARY_SAMPLES")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("SUMMARY_SAMPLES must be a positive number")?
            .unwrap_or(DEFAULT_SUMMARY_SAMPLES);
        anyhow::ensure!(summary_samples > 0, "SUMMARY_SAMPLES must be at least 1");

        Ok(Self {
            port: var("PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("PORT must be a valid number")?
                .unwrap_or(DEFAULT_PORT),
            request_timeout: Duration::from_secs(
                var("REQUEST_TIMEOUT_SECS")
                    .map(|v| v.parse::<u64>())
                    .transpose()
                    .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            // Presence is enforced by OmnivoreClient::new
            omnivore: OmnivoreConfig {
                api_key: var("OMNIVORE_API_KEY"),
                endpoint: var("OMNIVORE_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                username: var("OMNIVORE_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            },
            openai_api_key: var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: var("OPENAI_BASE_URL"),
            completion: CompletionConfig {
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                settings: var("OPENAI_SETTINGS")
                    .map(|blob| ModelSettings::from_json(&blob))
                    .transpose()
                    .context("OPENAI_SETTINGS is invalid")?
                    .unwrap_or_default(),
            },
            pipeline: PipelineSettings {
                public_base_url: var("PUBLIC_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
                summary_samples,
                final_stage_instruction: var("FINAL_STAGE_INSTRUCTION"),
            },
        })
    }
}
