// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.
// Every mock records its calls so tests can assert on what was sent.

use anyhow::Result;
use async_trait::async_trait;
use omnivore_client::{Article, CreatedHighlight, Label, NewHighlight};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseAI, BaseArticleStore, BaseStageTrigger, RetryPolicy, ServerDeps};
use crate::config::PipelineSettings;

// =============================================================================
// Mock Article Store
// =============================================================================

/// Arguments captured from a create_note call
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCall {
    pub article_id: String,
    pub annotation: String,
}

pub struct MockArticleStore {
    articles: Arc<Mutex<Vec<std::result::Result<Article, String>>>>,
    fetch_calls: Arc<Mutex<Vec<String>>>,
    note_calls: Arc<Mutex<Vec<NoteCall>>>,
    note_error: Arc<Mutex<Option<String>>>,
}

impl MockArticleStore {
    pub fn new() -> Self {
        Self {
            articles: Arc::new(Mutex::new(Vec::new())),
            fetch_calls: Arc::new(Mutex::new(Vec::new())),
            note_calls: Arc::new(Mutex::new(Vec::new())),
            note_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue an article for the next fetch
    pub fn with_article(self, title: &str, content: &str) -> Self {
        self.articles.lock().unwrap().push(Ok(Article {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            labels: vec![Label {
                name: "mock".to_string(),
            }],
        }));
        self
    }

    /// Queue a failed fetch
    pub fn with_fetch_error(self, message: &str) -> Self {
        self.articles.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Make every create_note call fail
    pub fn failing_notes(self, message: &str) -> Self {
        *self.note_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Get all article ids that were fetched
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    /// Get all notes that were submitted (including failed ones)
    pub fn note_calls(&self) -> Vec<NoteCall> {
        self.note_calls.lock().unwrap().clone()
    }
}

impl Default for MockArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseArticleStore for MockArticleStore {
    async fn fetch_article(&self, article_id: &str) -> Result<Article> {
        self.fetch_calls.lock().unwrap().push(article_id.to_string());

        let mut articles = self.articles.lock().unwrap();
        if articles.is_empty() {
            return Ok(Article {
                id: Some(article_id.to_string()),
                title: "Mock Article".to_string(),
                content: "# Mock Article\n\nThis is mock article content.".to_string(),
                labels: Vec::new(),
            });
        }
        articles.remove(0).map_err(|message| anyhow::anyhow!(message))
    }

    async fn create_note(&self, article_id: &str, annotation: &str) -> Result<CreatedHighlight> {
        self.note_calls.lock().unwrap().push(NoteCall {
            article_id: article_id.to_string(),
            annotation: annotation.to_string(),
        });

        if let Some(message) = self.note_error.lock().unwrap().clone() {
            anyhow::bail!(message);
        }

        let note = NewHighlight::note(article_id, annotation);
        Ok(CreatedHighlight {
            id: note.id,
            short_id: note.short_id,
            annotation: Some(note.annotation),
            created_at: None,
        })
    }
}

// =============================================================================
// Mock AI (chat completion)
// =============================================================================

/// Arguments captured from a complete call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCall {
    pub instruction: String,
    pub content: String,
}

pub struct MockAI {
    responses: Arc<Mutex<Vec<std::result::Result<String, String>>>>,
    responses_by_content: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            responses_by_content: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(Ok(response.into()));
        self
    }

    /// Queue a failed completion
    pub fn with_error(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Always answer `response` when the article content equals `content`.
    /// Checked before the queue.
    pub fn with_response_for(self, content: &str, response: impl Into<String>) -> Self {
        self.responses_by_content
            .lock()
            .unwrap()
            .insert(content.to_string(), response.into());
        self
    }

    /// Get all calls made to the AI
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Check if an instruction containing the given text was sent
    pub fn was_called_with(&self, text: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.instruction.contains(text))
    }

    /// Get the number of times the AI was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, instruction: &str, article_content: &str) -> Result<String> {
        self.calls.lock().unwrap().push(CompletionCall {
            instruction: instruction.to_string(),
            content: article_content.to_string(),
        });

        if let Some(response) = self.responses_by_content.lock().unwrap().get(article_content) {
            return Ok(response.clone());
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok("Mock AI response".to_string());
        }
        responses.remove(0).map_err(|message| anyhow::anyhow!(message))
    }
}

// =============================================================================
// Mock Stage Trigger
// =============================================================================

/// Arguments captured from a trigger call
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerCall {
    pub url: String,
    pub payload: serde_json::Value,
}

pub struct MockStageTrigger {
    calls: Arc<Mutex<Vec<TriggerCall>>>,
    error: Option<String>,
}

impl MockStageTrigger {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    /// Make every trigger fail after recording it
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<TriggerCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockStageTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseStageTrigger for MockStageTrigger {
    async fn trigger(&self, url: &str, payload: serde_json::Value) -> Result<()> {
        self.calls.lock().unwrap().push(TriggerCall {
            url: url.to_string(),
            payload,
        });

        match &self.error {
            Some(message) => anyhow::bail!("{}", message),
            None => Ok(()),
        }
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<MockArticleStore>,
    pub ai: Arc<MockAI>,
    pub trigger: Arc<MockStageTrigger>,
    pub pipeline: PipelineSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MockArticleStore::new()),
            ai: Arc::new(MockAI::new()),
            trigger: Arc::new(MockStageTrigger::new()),
            pipeline: PipelineSettings::default(),
        }
    }

    /// Set a mock article store
    pub fn mock_store(mut self, store: MockArticleStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    /// Set a mock stage trigger
    pub fn mock_trigger(mut self, trigger: MockStageTrigger) -> Self {
        self.trigger = Arc::new(trigger);
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineSettings) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Convert into ServerDeps. Backoff delays are zeroed so retries do not
    /// slow tests down.
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::new(self.store, self.ai, self.trigger, self.pipeline).with_retry_policy(
            RetryPolicy {
                base_delay: Duration::ZERO,
                ..RetryPolicy::default()
            },
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
