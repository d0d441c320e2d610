use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddGoalParams {
    #[schemars(description = "Goal title")]
    pub title: String,

    #[schemars(description = "Numeric target for the goal, e.g. an amount to save")]
    pub target: Option<f64>,

    #[schemars(description = "Goal category (default: financial)")]
    pub category: Option<String>,

    #[schemars(description = "Priority: 'low', 'medium' (default), or 'high'")]
    pub priority: Option<String>,

    #[schemars(description = "Optional description")]
    pub description: Option<String>,
}
