//! Best-of-N completion selection.
//!
//! Sample the same prompt `n` times, then let the model pick and polish the
//! strongest candidate. Used for subjective output (summaries) where there is
//! no scoring function to rank candidates with.

use anyhow::Result;
use futures::future::join_all;
use thiserror::Error;
use tracing::info;

use super::ai::{validate_completion_input, CompletionInputError};
use super::BaseAI;

/// Instruction for the refinement pass. The candidates are the article
/// content of that call.
pub const REFINE_INSTRUCTION: &str = "Below are several candidate responses to the same task, one after another. \
Select the single best candidate and refine it for clarity and so it fits the requested format. \
Return only the refined response: no headings, no preamble, and no mention that candidates were compared or refined.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("sample count must be at least 1, got {0}")]
    InvalidSampleCount(usize),
    #[error(transparent)]
    Input(#[from] CompletionInputError),
}

/// Refinement instruction that keeps the original task in view.
pub fn refine_instruction(task: &str) -> String {
    format!("{REFINE_INSTRUCTION}\n\nThe task was:\n{}", task.trim())
}

/// Issue `n` identical completions concurrently, then one refinement call.
///
/// Inputs are validated before anything is sent. Every sample is awaited; if
/// any of them fails the selection fails once all have finished.
pub async fn select_best(
    ai: &dyn BaseAI,
    instruction: &str,
    n: usize,
    article_content: &str,
) -> Result<String> {
    if n == 0 {
        return Err(SelectionError::InvalidSampleCount(n).into());
    }
    validate_completion_input(instruction, article_content).map_err(SelectionError::from)?;

    let samples = join_all((0..n).map(|_| ai.complete(instruction, article_content))).await;
    let candidates = samples.into_iter().collect::<Result<Vec<String>>>()?;

    info!(samples = candidates.len(), "Collected candidates, refining");

    ai.complete(&refine_instruction(instruction), &candidates.join("\n"))
        .await
}
