use serde::{Deserialize, Serialize};

use crate::config::PipelineSettings;
use crate::domains::annotation::prompts::{
    ACTIONS_INSTRUCTION, FLASHCARDS_INSTRUCTION, SUMMARY_INSTRUCTION,
};

/// One step of the linear annotation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Summary,
    Actions,
    Flashcards,
}

/// How a stage turns the article into annotation text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Sample n completions and refine the best
    BestOfN(usize),
    Single,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Summary, Stage::Actions, Stage::Flashcards];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Summary => "summary",
            Stage::Actions => "actions",
            Stage::Flashcards => "flashcards",
        }
    }

    /// Route the stage's webhook is mounted on
    pub fn path(self) -> &'static str {
        match self {
            Stage::Summary => "/webhooks/summary",
            Stage::Actions => "/webhooks/actions",
            Stage::Flashcards => "/webhooks/flashcards",
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Summary => Some(Stage::Actions),
            Stage::Actions => Some(Stage::Flashcards),
            Stage::Flashcards => None,
        }
    }

    pub fn url(self, public_base_url: &str) -> String {
        format!("{}{}", public_base_url.trim_end_matches('/'), self.path())
    }

    pub fn instruction(self, settings: &PipelineSettings) -> &str {
        match self {
            Stage::Summary => SUMMARY_INSTRUCTION,
            Stage::Actions => ACTIONS_INSTRUCTION,
            Stage::Flashcards => settings
                .final_stage_instruction
                .as_deref()
                .unwrap_or(FLASHCARDS_INSTRUCTION),
        }
    }

    pub fn generation(self, settings: &PipelineSettings) -> Generation {
        match self {
            Stage::Summary => Generation::BestOfN(settings.summary_samples),
            Stage::Actions | Stage::Flashcards => Generation::Single,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_chain_in_order_and_end() {
        assert_eq!(Stage::Summary.next(), Some(Stage::Actions));
        assert_eq!(Stage::Actions.next(), Some(Stage::Flashcards));
        assert_eq!(Stage::Flashcards.next(), None);
    }

    #[test]
    fn url_joins_base_and_path() {
        assert_eq!(
            Stage::Actions.url("https://hooks.example.com/"),
            "https://hooks.example.com/webhooks/actions"
        );
    }

    #[test]
    fn final_instruction_is_configurable() {
        let mut settings = PipelineSettings::default();
        assert_eq!(Stage::Flashcards.instruction(&settings), FLASHCARDS_INSTRUCTION);

        settings.final_stage_instruction = Some("Write quiz questions.".into());
        assert_eq!(Stage::Flashcards.instruction(&settings), "Write quiz questions.");
        assert_eq!(Stage::Summary.instruction(&settings), SUMMARY_INSTRUCTION);
    }

    #[test]
    fn only_summary_uses_best_of_n() {
        let settings = PipelineSettings::default();
        assert_eq!(Stage::Summary.generation(&settings), Generation::BestOfN(3));
        assert_eq!(Stage::Actions.generation(&settings), Generation::Single);
        assert_eq!(Stage::Flashcards.generation(&settings), Generation::Single);
    }
}
