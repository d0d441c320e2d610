use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CheckProgressParams {
    #[schemars(description = "Goal title (case-insensitive, newest match wins)")]
    pub title: String,
}
