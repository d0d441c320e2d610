//! Goal CRUD, manual progress, and task-driven progress.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::activity::write_activity;
use super::types::{Goal, GoalUpdate, NewGoal};
use super::{timestamp, truncate_chars};
use crate::error::{Result, TrackerError};
use crate::progression::goals::{advance_goal, GoalMatch, GoalState, TaskSignal};
use crate::progression::{Category, Priority};

pub const MAX_TITLE_CHARS: usize = 120;

const GOAL_COLUMNS: &str = "id, title, description, category, priority, target, progress, \
    completed, completed_at, active, created_at, updated_at";

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let category: String = row.get(3)?;
    let priority: String = row.get(4)?;
    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: Category::parse_lenient(&category),
        priority: Priority::parse_lenient(&priority),
        target: row.get(5)?,
        progress: row.get(6)?,
        completed: row.get(7)?,
        completed_at: row.get(8)?,
        active: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TrackerError::invalid("title must not be empty"));
    }
    Ok(truncate_chars(title, MAX_TITLE_CHARS))
}

fn check_target(target: Option<f64>) -> Result<Option<f64>> {
    match target {
        Some(t) if !t.is_finite() || t < 0.0 => {
            Err(TrackerError::invalid(format!("target must be a non-negative number, got {t}")))
        }
        other => Ok(other),
    }
}

fn save_goal(conn: &Connection, goal: &Goal) -> Result<()> {
    conn.execute(
        "UPDATE goals SET title = ?1, description = ?2, category = ?3, priority = ?4, target = ?5, \
         progress = ?6, completed = ?7, completed_at = ?8, active = ?9, updated_at = ?10 WHERE id = ?11",
        params![
            goal.title,
            goal.description,
            goal.category.as_str(),
            goal.priority.as_str(),
            goal.target,
            goal.progress,
            goal.completed,
            goal.completed_at,
            goal.active,
            goal.updated_at,
            goal.id,
        ],
    )?;
    Ok(())
}

pub fn create_goal(conn: &mut Connection, new: &NewGoal) -> Result<Goal> {
    let now = timestamp(Utc::now());
    let goal = Goal {
        id: uuid::Uuid::now_v7().to_string(),
        title: clean_title(&new.title)?,
        description: new
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        category: new.category.unwrap_or(Category::Personal),
        priority: new.priority.unwrap_or_default(),
        target: check_target(new.target)?,
        progress: 0.0,
        completed: false,
        completed_at: None,
        active: true,
        created_at: now.clone(),
        updated_at: now,
    };

    let tx = conn.transaction()?;
    tx.execute(
        &format!("INSERT INTO goals ({GOAL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
        params![
            goal.id,
            goal.title,
            goal.description,
            goal.category.as_str(),
            goal.priority.as_str(),
            goal.target,
            goal.progress,
            goal.completed,
            goal.completed_at,
            goal.active,
            goal.created_at,
            goal.updated_at,
        ],
    )?;
    write_activity(&tx, "create", "goal", &goal.id, None)?;
    tx.commit()?;

    tracing::info!(goal_id = %goal.id, category = %goal.category, "goal created");
    Ok(goal)
}

pub fn get_goal(conn: &Connection, id: &str) -> Result<Goal> {
    conn.query_row(
        &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
        params![id],
        row_to_goal,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found("goal", id))
}

/// Active goals, highest priority first, newest first within a priority.
pub fn list_goals(conn: &Connection) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE active = 1 ORDER BY created_at DESC, id DESC"
    ))?;
    let mut goals = stmt
        .query_map([], row_to_goal)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    // stable sort keeps the newest-first order within each priority
    goals.sort_by_key(|g| std::cmp::Reverse(g.priority.rank()));
    Ok(goals)
}

/// Newest active goal whose title matches, ignoring case and surrounding whitespace.
pub fn find_goal_by_title(conn: &Connection, title: &str) -> Result<Goal> {
    let wanted = title.trim();
    conn.query_row(
        &format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE active = 1 AND lower(title) = lower(?1) \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        ),
        params![wanted],
        row_to_goal,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found("goal", wanted))
}

pub fn update_goal(conn: &mut Connection, id: &str, update: &GoalUpdate) -> Result<Goal> {
    let tx = conn.transaction()?;
    let mut goal = get_goal(&tx, id)?;

    if let Some(title) = &update.title {
        goal.title = clean_title(title)?;
    }
    if let Some(description) = &update.description {
        let description = description.trim();
        goal.description = (!description.is_empty()).then(|| description.to_string());
    }
    if let Some(category) = update.category {
        goal.category = category;
    }
    if let Some(priority) = update.priority {
        goal.priority = priority;
    }
    if update.target.is_some() {
        goal.target = check_target(update.target)?;
    }
    if let Some(active) = update.active {
        goal.active = active;
    }
    goal.updated_at = timestamp(Utc::now());

    save_goal(&tx, &goal)?;
    write_activity(&tx, "update", "goal", &goal.id, None)?;
    tx.commit()?;
    Ok(goal)
}

pub fn deactivate_goal(conn: &mut Connection, id: &str) -> Result<Goal> {
    let tx = conn.transaction()?;
    let mut goal = get_goal(&tx, id)?;
    goal.active = false;
    goal.updated_at = timestamp(Utc::now());
    save_goal(&tx, &goal)?;
    write_activity(&tx, "deactivate", "goal", &goal.id, None)?;
    tx.commit()?;
    Ok(goal)
}

/// Set a goal's progress directly.
///
/// The value is clamped into `[0, 1]`. Progress never moves backwards; a lower
/// value is rejected. Reaching 1.0 completes the goal.
pub fn set_goal_progress(conn: &mut Connection, id: &str, value: f64) -> Result<Goal> {
    if value.is_nan() {
        return Err(TrackerError::invalid("progress must be a number"));
    }
    let value = value.clamp(0.0, 1.0);

    let tx = conn.transaction()?;
    let mut goal = get_goal(&tx, id)?;
    if value < goal.progress {
        return Err(TrackerError::invalid(format!(
            "progress cannot decrease (current {:.3}, requested {value:.3})",
            goal.progress
        )));
    }

    let now = timestamp(Utc::now());
    goal.progress = value;
    if value >= 1.0 && !goal.completed {
        goal.completed = true;
        goal.completed_at = Some(now.clone());
        tracing::info!(goal_id = %goal.id, "goal completed");
    }
    goal.updated_at = now;

    save_goal(&tx, &goal)?;
    write_activity(
        &tx,
        "progress",
        "goal",
        &goal.id,
        Some(&serde_json::json!({ "progress": goal.progress, "completed": goal.completed })),
    )?;
    tx.commit()?;
    Ok(goal)
}

/// How one goal moved when a task was completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgressUpdate {
    pub goal_id: String,
    pub title: String,
    pub matched: GoalMatch,
    pub delta: f64,
    pub progress: f64,
    pub completed: bool,
}

/// Advance every open, active goal the task relates to. Runs inside the caller's transaction.
pub(crate) fn apply_task_to_goals(
    conn: &Connection,
    task: &TaskSignal<'_>,
    now: DateTime<Utc>,
) -> Result<Vec<GoalProgressUpdate>> {
    let goals = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE active = 1 AND completed = 0 ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map([], row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };

    let stamp = timestamp(now);
    let mut updates = Vec::new();
    for mut goal in goals {
        let state = GoalState {
            title: &goal.title,
            category: goal.category,
            progress: goal.progress,
            completed: goal.completed,
        };
        let Some(step) = advance_goal(task, &state) else {
            continue;
        };

        goal.progress = step.progress;
        if step.completed_now {
            goal.completed = true;
            goal.completed_at = Some(stamp.clone());
        }
        goal.updated_at = stamp.clone();
        save_goal(conn, &goal)?;

        updates.push(GoalProgressUpdate {
            goal_id: goal.id,
            title: goal.title,
            matched: step.matched,
            delta: step.delta,
            progress: step.progress,
            completed: step.completed_now,
        });
    }
    Ok(updates)
}
