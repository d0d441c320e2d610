//! Compact progress summary shared by `GET /status`, the `get_status` tool, and `levelup status`.

use rusqlite::Connection;
use serde::Serialize;

use super::goals::list_goals;
use super::profile::get_profile;
use super::tasks::{completed_task_count, list_tasks};
use super::types::TaskFilter;
use crate::error::Result;
use crate::progression::level::xp_to_next_level;
use crate::progression::progress_to_next_level;

/// How many open task and goal titles the summary carries.
pub const STATUS_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct GoalSample {
    pub title: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub name: String,
    pub xp: i64,
    pub level: u32,
    pub progress_to_next_level: f64,
    pub xp_to_next_level: i64,
    pub skill_points: i64,
    pub open_tasks: usize,
    pub tasks_completed: i64,
    pub active_goals: usize,
    pub achievements_unlocked: i64,
    pub task_samples: Vec<String>,
    pub goal_samples: Vec<GoalSample>,
}

pub fn get_status(conn: &mut Connection) -> Result<StatusSummary> {
    let profile = get_profile(conn)?;
    let open = list_tasks(
        conn,
        &TaskFilter {
            completed: Some(false),
            ..Default::default()
        },
    )?;
    let goals: Vec<_> = list_goals(conn)?.into_iter().filter(|g| !g.completed).collect();
    let achievements_unlocked: i64 =
        conn.query_row("SELECT COUNT(*) FROM achievements WHERE unlocked = 1", [], |row| row.get(0))?;

    Ok(StatusSummary {
        progress_to_next_level: progress_to_next_level(profile.xp, profile.level),
        xp_to_next_level: xp_to_next_level(profile.xp, profile.level),
        name: profile.name,
        xp: profile.xp,
        level: profile.level,
        skill_points: profile.skill_points,
        open_tasks: open.len(),
        tasks_completed: completed_task_count(conn)?,
        active_goals: goals.len(),
        achievements_unlocked,
        task_samples: open
            .into_iter()
            .take(STATUS_SAMPLE_SIZE)
            .map(|t| t.title)
            .collect(),
        goal_samples: goals
            .into_iter()
            .take(STATUS_SAMPLE_SIZE)
            .map(|g| GoalSample {
                title: g.title,
                progress: g.progress,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::progression::RewardPolicy;
    use crate::tracker::goals::create_goal;
    use crate::tracker::tasks::{complete_task, create_task};
    use crate::tracker::types::{NewGoal, NewTask, TaskSource};

    #[test]
    fn fresh_status_is_level_one() {
        let mut conn = db::open_memory_database().unwrap();
        let status = get_status(&mut conn).unwrap();
        assert_eq!(status.level, 1);
        assert_eq!(status.xp_to_next_level, 100);
        assert_eq!(status.progress_to_next_level, 0.0);
        assert_eq!(status.open_tasks, 0);
    }

    #[test]
    fn status_reflects_open_work() {
        let mut conn = db::open_memory_database().unwrap();
        for i in 0..12 {
            create_task(
                &mut conn,
                &NewTask {
                    title: format!("task {i}"),
                    ..Default::default()
                },
                TaskSource::Manual,
                RewardPolicy::Ranged,
            )
            .unwrap();
        }
        let done = create_task(
            &mut conn,
            &NewTask {
                title: "done".into(),
                ..Default::default()
            },
            TaskSource::Manual,
            RewardPolicy::Ranged,
        )
        .unwrap();
        complete_task(&mut conn, &done.id).unwrap();
        create_goal(
            &mut conn,
            &NewGoal {
                title: "Learn Rust".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let status = get_status(&mut conn).unwrap();
        assert_eq!(status.open_tasks, 12);
        assert_eq!(status.task_samples.len(), STATUS_SAMPLE_SIZE);
        assert_eq!(status.tasks_completed, 1);
        assert_eq!(status.active_goals, 1);
        assert_eq!(status.achievements_unlocked, 1);
    }
}
