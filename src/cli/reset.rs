//! CLI `reset` command: wipe all progress after user confirmation.

use anyhow::{bail, Result};
use rusqlite::Connection;
use std::io::Write;

use crate::config::LevelupConfig;
use crate::tracker::achievements::seed_default_achievements;

/// Delete all data after user confirmation.
pub fn reset(config: &LevelupConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("WARNING: This will permanently delete the profile, ALL tasks, goals, feedback, and activity logs.");
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let mut conn = crate::db::open_database(&db_path)?;
    clear_all_data(&mut conn)?;

    println!("All progress deleted. Database reset complete.");
    Ok(())
}

/// Delete every row and re-seed a fresh (all locked) achievement catalogue.
pub fn clear_all_data(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "DELETE FROM task_patterns;
         DELETE FROM task_feedback;
         DELETE FROM activity_log;
         DELETE FROM achievements;
         DELETE FROM goals;
         DELETE FROM tasks;
         DELETE FROM profile;",
    )?;
    let seeded = seed_default_achievements(&tx)?;
    tx.commit()?;
    tracing::info!(seeded, "database reset");
    Ok(())
}
