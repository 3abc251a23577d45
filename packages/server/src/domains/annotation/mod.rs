pub mod activities;
pub mod models;
pub mod prompts;

pub use activities::{run_stage, StageError};
pub use models::{
    HandoffPayload, PageCreatedEvent, Stage, StageAccepted, StageInput, StageOutcome,
};
