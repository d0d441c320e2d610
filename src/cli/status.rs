//! CLI `status` command: print the progress summary.

use anyhow::Result;

use crate::config::LevelupConfig;
use crate::tracker::activity::recent_activity;
use crate::tracker::status::{get_status, StatusSummary};

/// Print the summary, optionally followed by the `activity` most recent log entries.
pub fn status(config: &LevelupConfig, json: bool, activity: usize) -> Result<()> {
    let mut conn = crate::db::open_database(config.resolved_db_path())?;
    let summary = get_status(&mut conn)?;
    let recent = recent_activity(&conn, activity)?;

    if json {
        let value = serde_json::json!({ "status": summary, "activity": recent });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print!("{}", render(&summary));
    if !recent.is_empty() {
        println!("\nRecent activity:");
        for entry in &recent {
            println!(
                "  {}  {:<8} {:<12} {}",
                entry.created_at, entry.operation, entry.entity, entry.entity_id
            );
        }
    }
    Ok(())
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn render(s: &StatusSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  Level {}  ({} XP)\n", s.name, s.level, s.xp));
    out.push_str(&format!(
        "{} {:.0}%  {} XP to next level\n",
        progress_bar(s.progress_to_next_level, 20),
        s.progress_to_next_level * 100.0,
        s.xp_to_next_level
    ));
    out.push_str(&format!("Skill points:   {}\n", s.skill_points));
    out.push_str(&format!("Tasks done:     {}\n", s.tasks_completed));
    out.push_str(&format!("Achievements:   {}\n", s.achievements_unlocked));

    out.push_str(&format!("\nOpen quests ({}):\n", s.open_tasks));
    for title in &s.task_samples {
        out.push_str(&format!("  - {title}\n"));
    }
    out.push_str(&format!("\nGoals ({}):\n", s.active_goals));
    for goal in &s.goal_samples {
        out.push_str(&format!(
            "  {} {:>3.0}%  {}\n",
            progress_bar(goal.progress, 10),
            goal.progress * 100.0,
            goal.title
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(7.0, 4), "[####]");
    }
}
