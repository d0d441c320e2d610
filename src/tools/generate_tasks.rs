//! MCP `generate_tasks` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `generate_tasks` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateTasksParams {
    #[schemars(description = "What the user is working towards, in plain words")]
    pub goals: String,

    #[schemars(description = "Category of tasks to suggest (default: general)")]
    pub category: Option<String>,

    #[schemars(description = "Recurrence of the suggested tasks (default: daily)")]
    pub frequency: Option<String>,

    #[schemars(description = "Number of tasks to suggest (default from config, at most 10)")]
    pub count: Option<usize>,
}
