//! Task CRUD, recurrence, and the completion pipeline.
//!
//! [`complete_task`] is where the progression rules meet: it awards XP, resyncs
//! level and skill points, advances goals, and runs the achievement scan, all in
//! one transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::achievements::run_unlock_scan;
use super::activity::write_activity;
use super::goals::{apply_task_to_goals, GoalProgressUpdate};
use super::profile::{add_xp, load_profile, save_profile, sync_derived};
use super::types::{Achievement, NewTask, Profile, Task, TaskFilter, TaskSource, TaskUpdate};
use super::{timestamp, truncate_chars};
use crate::error::{Result, TrackerError};
use crate::progression::goals::TaskSignal;
use crate::progression::reward::clamp_alignment;
use crate::progression::{task_xp_reward, Category, Difficulty, Frequency, RewardPolicy, Skill};

pub const MAX_TITLE_CHARS: usize = 120;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

const TASK_COLUMNS: &str = "id, title, description, difficulty, category, base_xp, xp, \
    goal_alignment, frequency, skill_reward, completed, active, times_completed, source, \
    last_completed_at, created_at, updated_at";

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let difficulty: String = row.get(3)?;
    let category: String = row.get(4)?;
    let frequency: String = row.get(8)?;
    let skill_reward: Option<String> = row.get(9)?;
    let source: String = row.get(13)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        difficulty: Difficulty::parse_lenient(&difficulty),
        category: Category::parse_lenient(&category),
        base_xp: row.get(5)?,
        xp: row.get(6)?,
        goal_alignment: row.get(7)?,
        frequency: Frequency::parse_lenient(&frequency),
        skill_reward: skill_reward.and_then(|s| s.parse::<Skill>().ok()),
        completed: row.get(10)?,
        active: row.get(11)?,
        times_completed: row.get(12)?,
        source: source.parse().unwrap_or(TaskSource::Manual),
        last_completed_at: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TrackerError::invalid("title must not be empty"));
    }
    Ok(truncate_chars(title, MAX_TITLE_CHARS))
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| truncate_chars(d, MAX_DESCRIPTION_CHARS))
}

/// Insert a task without opening a transaction. Used by batch callers.
pub(crate) fn insert_task(
    conn: &Connection,
    new: &NewTask,
    source: TaskSource,
    policy: RewardPolicy,
    now: DateTime<Utc>,
) -> Result<Task> {
    let difficulty = new.difficulty.unwrap_or_default();
    let alignment = clamp_alignment(new.goal_alignment.unwrap_or(0.0));
    let base_xp = new.xp.unwrap_or_else(|| difficulty.default_base_xp()).max(0);
    let created_at = timestamp(now);

    let task = Task {
        id: uuid::Uuid::now_v7().to_string(),
        title: clean_title(&new.title)?,
        description: clean_description(new.description.as_deref()),
        difficulty,
        category: new.category.unwrap_or_default(),
        base_xp,
        xp: task_xp_reward(base_xp, difficulty, alignment, policy),
        goal_alignment: alignment,
        frequency: new.frequency.unwrap_or_default(),
        skill_reward: new.skill_reward,
        completed: false,
        active: true,
        times_completed: 0,
        source,
        last_completed_at: None,
        created_at: created_at.clone(),
        updated_at: created_at,
    };

    conn.execute(
        &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"),
        params![
            task.id,
            task.title,
            task.description,
            task.difficulty.as_str(),
            task.category.as_str(),
            task.base_xp,
            task.xp,
            task.goal_alignment,
            task.frequency.as_str(),
            task.skill_reward.map(|s| s.as_str()),
            task.completed,
            task.active,
            task.times_completed,
            task.source.as_str(),
            task.last_completed_at,
            task.created_at,
            task.updated_at,
        ],
    )?;
    write_activity(
        conn,
        "create",
        "task",
        &task.id,
        Some(&serde_json::json!({ "source": source.as_str(), "xp": task.xp })),
    )?;

    Ok(task)
}

/// Create one task. The stored `xp` is derived, never taken from the request.
pub fn create_task(
    conn: &mut Connection,
    new: &NewTask,
    source: TaskSource,
    policy: RewardPolicy,
) -> Result<Task> {
    let tx = conn.transaction()?;
    let task = insert_task(&tx, new, source, policy, Utc::now())?;
    tx.commit()?;
    tracing::info!(task_id = %task.id, xp = task.xp, difficulty = %task.difficulty, "task created");
    Ok(task)
}

/// Create several tasks atomically.
pub fn create_tasks(
    conn: &mut Connection,
    new: &[NewTask],
    source: TaskSource,
    policy: RewardPolicy,
) -> Result<Vec<Task>> {
    let tx = conn.transaction()?;
    let now = Utc::now();
    let tasks = new
        .iter()
        .map(|n| insert_task(&tx, n, source, policy, now))
        .collect::<Result<Vec<_>>>()?;
    tx.commit()?;
    Ok(tasks)
}

pub fn get_task(conn: &Connection, id: &str) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found("task", id))
}

/// List tasks, newest first, after reopening recurring tasks that are due again.
pub fn list_tasks(conn: &mut Connection, filter: &TaskFilter) -> Result<Vec<Task>> {
    list_tasks_at(conn, filter, Utc::now())
}

pub(crate) fn list_tasks_at(
    conn: &mut Connection,
    filter: &TaskFilter,
    now: DateTime<Utc>,
) -> Result<Vec<Task>> {
    let tx = conn.transaction()?;
    let reopened = reopen_due_tasks(&tx, now)?;
    if reopened > 0 {
        tracing::info!(reopened, "recurring tasks reopened");
    }

    let mut clauses = Vec::new();
    if !filter.include_inactive {
        clauses.push("active = 1");
    }
    match filter.completed {
        Some(true) => clauses.push("completed = 1"),
        Some(false) => clauses.push("completed = 0"),
        None => {}
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);

    let tasks = {
        let mut stmt = tx.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks {where_clause} ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map(params![limit], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    tx.commit()?;
    Ok(tasks)
}

/// Reopen completed recurring tasks whose interval has elapsed.
pub(crate) fn reopen_due_tasks(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    let due: Vec<String> = {
        let mut stmt = conn.prepare(
            "SELECT id, frequency, last_completed_at FROM tasks \
             WHERE completed = 1 AND active = 1 AND frequency != 'once' AND last_completed_at IS NOT NULL",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .filter(|(_, frequency, last)| is_due(Frequency::parse_lenient(frequency), last, now))
            .map(|(id, _, _)| id)
            .collect()
    };

    let stamp = timestamp(now);
    for id in &due {
        conn.execute(
            "UPDATE tasks SET completed = 0, updated_at = ?1 WHERE id = ?2",
            params![stamp, id],
        )?;
        write_activity(conn, "reopen", "task", id, None)?;
    }
    Ok(due.len())
}

fn is_due(frequency: Frequency, last_completed_at: &str, now: DateTime<Utc>) -> bool {
    let Some(days) = frequency.interval_days() else {
        return false;
    };
    match DateTime::parse_from_rfc3339(last_completed_at) {
        Ok(last) => now.signed_duration_since(last.with_timezone(&Utc)) >= chrono::Duration::days(days),
        Err(_) => false,
    }
}

/// Apply an allow-listed update, re-deriving `xp` from the new attributes.
pub fn update_task(
    conn: &mut Connection,
    id: &str,
    update: &TaskUpdate,
    policy: RewardPolicy,
) -> Result<Task> {
    let tx = conn.transaction()?;
    let mut task = get_task(&tx, id)?;

    if let Some(title) = &update.title {
        task.title = clean_title(title)?;
    }
    if let Some(description) = &update.description {
        task.description = clean_description(Some(description));
    }
    if let Some(difficulty) = update.difficulty {
        task.difficulty = difficulty;
    }
    if let Some(category) = update.category {
        task.category = category;
    }
    if let Some(xp) = update.xp {
        task.base_xp = xp.max(0);
    }
    if let Some(alignment) = update.goal_alignment {
        task.goal_alignment = clamp_alignment(alignment);
    }
    if let Some(frequency) = update.frequency {
        task.frequency = frequency;
    }
    if let Some(skill) = update.skill_reward {
        task.skill_reward = Some(skill);
    }
    if let Some(active) = update.active {
        task.active = active;
    }

    let previous_xp = task.xp;
    task.xp = task_xp_reward(task.base_xp, task.difficulty, task.goal_alignment, policy);
    task.updated_at = timestamp(Utc::now());

    tx.execute(
        "UPDATE tasks SET title = ?1, description = ?2, difficulty = ?3, category = ?4, base_xp = ?5, \
         xp = ?6, goal_alignment = ?7, frequency = ?8, skill_reward = ?9, active = ?10, updated_at = ?11 \
         WHERE id = ?12",
        params![
            task.title,
            task.description,
            task.difficulty.as_str(),
            task.category.as_str(),
            task.base_xp,
            task.xp,
            task.goal_alignment,
            task.frequency.as_str(),
            task.skill_reward.map(|s| s.as_str()),
            task.active,
            task.updated_at,
            task.id,
        ],
    )?;
    write_activity(
        &tx,
        "update",
        "task",
        &task.id,
        Some(&serde_json::json!({ "xp_before": previous_xp, "xp_after": task.xp })),
    )?;
    tx.commit()?;
    Ok(task)
}

/// Soft-delete a task. It disappears from default listings and can no longer be completed.
pub fn deactivate_task(conn: &mut Connection, id: &str) -> Result<Task> {
    let tx = conn.transaction()?;
    let mut task = get_task(&tx, id)?;
    task.active = false;
    task.updated_at = timestamp(Utc::now());
    tx.execute(
        "UPDATE tasks SET active = 0, updated_at = ?1 WHERE id = ?2",
        params![task.updated_at, task.id],
    )?;
    write_activity(&tx, "deactivate", "task", &task.id, None)?;
    tx.commit()?;
    Ok(task)
}

/// Total completion events across all tasks (recurring tasks count every time).
pub(crate) fn completed_task_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COALESCE(SUM(times_completed), 0) FROM tasks",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Everything a task completion changed.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub task: Task,
    /// `true` when the task was already completed and nothing happened.
    pub already_completed: bool,
    pub xp_awarded: i64,
    pub level_before: u32,
    pub level_after: u32,
    pub leveled_up: bool,
    pub skill_granted: Option<Skill>,
    pub goal_updates: Vec<GoalProgressUpdate>,
    pub achievements_unlocked: Vec<Achievement>,
    pub profile: Profile,
}

/// Complete a task and propagate the consequences.
pub fn complete_task(conn: &mut Connection, id: &str) -> Result<CompletionOutcome> {
    complete_task_at(conn, id, Utc::now())
}

pub(crate) fn complete_task_at(
    conn: &mut Connection,
    id: &str,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome> {
    let tx = conn.transaction()?;
    let mut task = get_task(&tx, id)?;
    let mut profile = load_profile(&tx)?;
    sync_derived(&mut profile);
    let level_before = profile.level;

    if task.completed {
        tx.commit()?;
        return Ok(CompletionOutcome {
            task,
            already_completed: true,
            xp_awarded: 0,
            level_before,
            level_after: level_before,
            leveled_up: false,
            skill_granted: None,
            goal_updates: Vec::new(),
            achievements_unlocked: Vec::new(),
            profile,
        });
    }
    if !task.active {
        return Err(TrackerError::invalid(format!("task {id} is inactive")));
    }

    let stamp = timestamp(now);
    task.completed = true;
    task.times_completed += 1;
    task.last_completed_at = Some(stamp.clone());
    task.updated_at = stamp.clone();
    tx.execute(
        "UPDATE tasks SET completed = 1, times_completed = ?1, last_completed_at = ?2, updated_at = ?2 WHERE id = ?3",
        params![task.times_completed, stamp, task.id],
    )?;

    add_xp(&mut profile, task.xp);
    if let Some(skill) = task.skill_reward {
        profile.skills.grant(skill, 1);
    }

    let signal = TaskSignal {
        title: &task.title,
        category: task.category,
        difficulty: task.difficulty,
        goal_alignment: task.goal_alignment,
    };
    let goal_updates = apply_task_to_goals(&tx, &signal, now)?;
    let achievements_unlocked = run_unlock_scan(&tx, &mut profile, now)?;

    profile.updated_at = stamp;
    save_profile(&tx, &profile)?;

    write_activity(
        &tx,
        "complete",
        "task",
        &task.id,
        Some(&serde_json::json!({
            "xp_awarded": task.xp,
            "level": profile.level,
            "goals_advanced": goal_updates.len(),
            "achievements_unlocked": achievements_unlocked.len(),
        })),
    )?;
    tx.commit()?;

    let level_after = profile.level;
    tracing::info!(
        task_id = %task.id,
        xp_awarded = task.xp,
        level = level_after,
        goals = goal_updates.len(),
        achievements = achievements_unlocked.len(),
        "task completed"
    );

    Ok(CompletionOutcome {
        xp_awarded: task.xp,
        skill_granted: task.skill_reward,
        task,
        already_completed: false,
        level_before,
        level_after,
        leveled_up: level_after > level_before,
        goal_updates,
        achievements_unlocked,
        profile,
    })
}

/// Creation time of the newest AI-sourced task created at or after `since`.
pub(crate) fn latest_ai_task_since(conn: &Connection, since: DateTime<Utc>) -> Result<Option<String>> {
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(created_at) FROM tasks WHERE source = 'ai' AND created_at >= ?1",
        params![timestamp(since)],
        |row| row.get(0),
    )?;
    Ok(latest)
}
