use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateGoalProgressParams {
    #[schemars(description = "ID of the goal. Either goal_id or title is required.")]
    pub goal_id: Option<String>,

    #[schemars(description = "Goal title, used when goal_id is omitted")]
    pub title: Option<String>,

    #[schemars(description = "New progress 0.0-1.0. Progress cannot decrease; 1.0 completes the goal.")]
    pub progress: f64,
}
