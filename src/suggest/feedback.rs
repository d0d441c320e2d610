//! Suggestion feedback and the preference patterns learned from it.

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::prompt::ModelTier;
use crate::config::LlmConfig;
use crate::error::{Result, TrackerError};
use crate::progression::{Category, Difficulty};
use crate::tracker::activity::write_activity;
use crate::tracker::timestamp;

/// Pattern type raised by well-rated completed tasks.
pub const DIFFICULTY_PREFERENCE: &str = "difficulty_preference";
/// Patterns above this success rate are fed back into prompts.
pub const PATTERN_PROMPT_THRESHOLD: f64 = 0.7;
const PATTERN_START_RATE: f64 = 0.5;
const PATTERN_STEP: f64 = 0.1;
const PATTERNS_PER_PROMPT: usize = 3;

/// The suggested task being rated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatedTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFeedback {
    #[serde(default)]
    pub user_goals: Option<String>,
    pub task: RatedTask,
    /// 1 to 5.
    pub rating: u8,
    pub completed: bool,
    /// Seconds spent on the task.
    #[serde(default)]
    pub completion_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnedPattern {
    pub pattern_type: String,
    pub pattern_value: String,
    pub success_rate: f64,
    pub usage_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackOutcome {
    pub id: i64,
    /// The pattern raised by this feedback, if any.
    pub pattern: Option<LearnedPattern>,
}

/// Store a rating. A completed task rated 4 or 5 strengthens the difficulty
/// preference for its category.
pub fn record_feedback(conn: &mut Connection, feedback: &TaskFeedback) -> Result<FeedbackOutcome> {
    if !(1..=5).contains(&feedback.rating) {
        return Err(TrackerError::invalid(format!(
            "rating must be between 1 and 5, got {}",
            feedback.rating
        )));
    }
    if feedback.task.title.trim().is_empty() {
        return Err(TrackerError::invalid("task title must not be empty"));
    }

    let now = timestamp(Utc::now());
    let category = feedback.task.category.as_str();
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO task_feedback \
         (user_goals, generated_task, task_category, user_rating, completion_status, completion_time, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            feedback.user_goals,
            serde_json::to_string(&feedback.task)?,
            category,
            feedback.rating,
            feedback.completed,
            feedback.completion_time,
            now,
        ],
    )?;
    let id = tx.last_insert_rowid();

    let pattern = if feedback.rating >= 4 && feedback.completed {
        let difficulty = feedback.task.difficulty.as_str();
        tx.execute(
            "INSERT INTO task_patterns (pattern_type, pattern_value, task_category, success_rate, usage_count, last_updated) \
             VALUES (?1, ?2, ?3, ?4, 1, ?5) \
             ON CONFLICT(pattern_type, pattern_value, task_category) DO UPDATE SET \
               success_rate = MIN(1.0, success_rate + ?6), \
               usage_count = usage_count + 1, \
               last_updated = excluded.last_updated",
            params![
                DIFFICULTY_PREFERENCE,
                difficulty,
                category,
                (PATTERN_START_RATE + PATTERN_STEP).min(1.0),
                now,
                PATTERN_STEP,
            ],
        )?;
        let pattern = tx.query_row(
            "SELECT pattern_type, pattern_value, success_rate, usage_count FROM task_patterns \
             WHERE pattern_type = ?1 AND pattern_value = ?2 AND task_category = ?3",
            params![DIFFICULTY_PREFERENCE, difficulty, category],
            |row| {
                Ok(LearnedPattern {
                    pattern_type: row.get(0)?,
                    pattern_value: row.get(1)?,
                    success_rate: row.get(2)?,
                    usage_count: row.get(3)?,
                })
            },
        )?;
        Some(pattern)
    } else {
        None
    };

    write_activity(
        &tx,
        "feedback",
        "suggestion",
        &id.to_string(),
        Some(&serde_json::json!({ "rating": feedback.rating, "category": category })),
    )?;
    tx.commit()?;

    tracing::info!(feedback_id = id, rating = feedback.rating, category, "feedback recorded");
    Ok(FeedbackOutcome { id, pattern })
}

/// Strongest learned patterns for a category, best first.
pub fn learned_patterns(conn: &Connection, category: Category) -> Result<Vec<LearnedPattern>> {
    let mut stmt = conn.prepare(
        "SELECT pattern_type, pattern_value, success_rate, usage_count FROM task_patterns \
         WHERE task_category = ?1 AND success_rate > ?2 \
         ORDER BY success_rate DESC, usage_count DESC LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(
            params![category.as_str(), PATTERN_PROMPT_THRESHOLD, PATTERNS_PER_PROMPT as i64],
            |row| {
                Ok(LearnedPattern {
                    pattern_type: row.get(0)?,
                    pattern_value: row.get(1)?,
                    success_rate: row.get(2)?,
                    usage_count: row.get(3)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub completion_rate: f64,
    pub avg_rating: f64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub available_models: BTreeMap<String, String>,
    pub category_performance: BTreeMap<String, CategoryPerformance>,
    pub total_feedback_entries: i64,
}

pub fn model_stats(conn: &Connection, config: &LlmConfig) -> Result<ModelStats> {
    let available_models = [
        ModelTier::Fast,
        ModelTier::Balanced,
        ModelTier::Creative,
        ModelTier::Analytical,
    ]
    .into_iter()
    .map(|tier| {
        let name = serde_json::to_value(tier)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        (name, tier.model_name(config).to_string())
    })
    .collect();

    let mut stmt = conn.prepare(
        "SELECT task_category, AVG(CAST(completion_status AS REAL)), AVG(user_rating), COUNT(*) \
         FROM task_feedback GROUP BY task_category",
    )?;
    let category_performance: BTreeMap<String, CategoryPerformance> = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                CategoryPerformance {
                    completion_rate: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                    avg_rating: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                    total: row.get(3)?,
                },
            ))
        })?
        .collect::<rusqlite::Result<_>>()?;

    Ok(ModelStats {
        total_feedback_entries: category_performance.values().map(|c| c.total).sum(),
        available_models,
        category_performance,
    })
}
