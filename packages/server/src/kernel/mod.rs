//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod article_fetch;
pub mod best_of_n;
pub mod deps;
pub mod stage_client;
pub mod test_dependencies;
pub mod traits;

pub use ai::{CompletionConfig, CompletionInputError, ModelSettings, OpenAICompletion};
pub use article_fetch::{fetch_article_with_retry, RetryPolicy};
pub use best_of_n::{select_best, SelectionError};
pub use deps::{OmnivoreAdapter, ServerDeps};
pub use stage_client::HttpStageTrigger;
pub use test_dependencies::TestDependencies;
pub use traits::*;
