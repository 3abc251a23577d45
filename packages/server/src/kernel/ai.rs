// AI implementation using the OpenAI chat completions API
//
// This is the infrastructure implementation of BaseAI.
// Instructions (what to ask for) live in domains/annotation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use serde::Deserialize;
use thiserror::Error;

use super::BaseAI;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Missing call arguments. Raised before any provider request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionInputError {
    #[error("instruction must not be empty")]
    EmptyInstruction,
    #[error("article content must not be empty")]
    EmptyContent,
}

pub fn validate_completion_input(
    instruction: &str,
    article_content: &str,
) -> std::result::Result<(), CompletionInputError> {
    if instruction.trim().is_empty() {
        return Err(CompletionInputError::EmptyInstruction);
    }
    if article_content.trim().is_empty() {
        return Err(CompletionInputError::EmptyContent);
    }
    Ok(())
}

/// Sampling parameters, supplied as a JSON blob (`OPENAI_SETTINGS`).
///
/// Unknown keys are ignored so the blob can carry provider extras.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            top_p: None,
            presence_penalty: None,
            frequency_penalty: None,
        }
    }
}

impl ModelSettings {
    pub fn from_json(blob: &str) -> Result<Self> {
        serde_json::from_str(blob).context("Model settings must be a JSON object")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub model: String,
    pub settings: ModelSettings,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            settings: ModelSettings::default(),
        }
    }
}

/// The single user message sent for every completion.
pub fn build_user_message(instruction: &str, article_content: &str) -> String {
    format!(
        "{}\n\n---\n\nArticle:\n\n{}",
        instruction.trim(),
        article_content.trim()
    )
}

/// OpenAI implementation of BaseAI
#[derive(Clone)]
pub struct OpenAICompletion {
    client: OpenAIClient,
    config: CompletionConfig,
}

impl OpenAICompletion {
    pub fn new(client: OpenAIClient, config: CompletionConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, instruction: &str, article_content: &str) -> ChatRequest {
        let settings = &self.config.settings;
        ChatRequest {
            temperature: Some(settings.temperature),
            max_tokens: settings.max_tokens,
            top_p: settings.top_p,
            presence_penalty: settings.presence_penalty,
            frequency_penalty: settings.frequency_penalty,
            ..ChatRequest::new(&self.config.model)
        }
        .message(Message::user(build_user_message(
            instruction,
            article_content,
        )))
    }
}

#[async_trait]
impl BaseAI for OpenAICompletion {
    async fn complete(&self, instruction: &str, article_content: &str) -> Result<String> {
        validate_completion_input(instruction, article_content)?;

        let request = self.build_request(instruction, article_content);

        tracing::debug!(
            model = %self.config.model,
            instruction_length = instruction.len(),
            content_length = article_content.len(),
            "Calling OpenAI API"
        );

        let response = self.client.chat_completion(request).await.map_err(|e| {
            tracing::error!(error = %e, model = %self.config.model, "OpenAI API call failed");
            anyhow::anyhow!(e)
        })?;

        let text = response.content.trim().to_string();

        tracing::info!(
            response_length = text.len(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            model = %self.config.model,
            "OpenAI API response received"
        );

        Ok(text)
    }
}
