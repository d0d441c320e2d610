//! MCP `create_task` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `create_task` MCP tool. The awarded XP is derived from
/// these, never set directly.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "Short task title")]
    pub title: String,

    #[schemars(description = "Optional longer description")]
    pub description: Option<String>,

    #[schemars(description = "Difficulty: 'easy', 'medium' (default), 'hard', or 'expert'")]
    pub difficulty: Option<String>,

    #[schemars(
        description = "Category: general, work, career, fitness, health, learning, personal, financial, social, relationships, creative"
    )]
    pub category: Option<String>,

    #[schemars(description = "Base XP before the difficulty range is applied")]
    pub xp: Option<i64>,

    #[schemars(description = "How strongly the task serves a goal, 0.0-1.0")]
    pub goal_alignment: Option<f64>,

    #[schemars(description = "Recurrence: 'once' (default), 'daily', 'weekly', or 'monthly'")]
    pub frequency: Option<String>,

    #[schemars(description = "Skill raised by one on each completion, e.g. 'strength' or 'problem_solving'")]
    pub skill_reward: Option<String>,
}
