pub mod outcome;
pub mod payloads;
pub mod stage;

pub use outcome::{StageAccepted, StageOutcome};
pub use payloads::{HandoffPayload, PageCreatedEvent, PageRef, StageInput};
pub use stage::{Generation, Stage};
