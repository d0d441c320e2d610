use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksParams {
    #[schemars(description = "true for completed tasks only, false for open tasks only; omit for both")]
    pub completed: Option<bool>,

    #[schemars(description = "Include deactivated tasks (default: false)")]
    pub include_inactive: Option<bool>,

    #[schemars(description = "Maximum number of tasks to return, newest first")]
    pub limit: Option<usize>,
}
