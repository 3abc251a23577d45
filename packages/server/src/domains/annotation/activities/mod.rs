pub mod run_stage;

pub use run_stage::{run_stage, StageError};
