use serde::Serialize;

use super::Stage;

/// JSON body returned by the summary webhook once its run is over. No
/// stability guarantee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    pub stage: Stage,
    pub article_id: String,
    pub annotation: String,
    pub highlight_id: Option<String>,
    pub annotation_posted: bool,
    /// `None` for the final stage, which has nothing to trigger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<Stage>,
    pub next_stage_triggered: bool,
}

/// Acknowledgment from a handoff stage. The run itself continues in the
/// background after this is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAccepted {
    pub stage: Stage,
    pub article_id: String,
}
