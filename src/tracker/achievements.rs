//! The achievement catalogue and the persisted unlock scan.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::activity::write_activity;
use super::profile::{add_xp, load_profile, save_profile, sync_derived};
use super::tasks::completed_task_count;
use super::timestamp;
use super::types::{Achievement, Profile};
use crate::error::Result;
use crate::progression::achievements::{scan_unlocks, AchievementRule, ConditionKind, ProgressSnapshot};

/// A catalogue entry before it is stored.
#[derive(Debug, Clone, Copy)]
pub struct AchievementSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
    pub condition: ConditionKind,
    pub condition_value: i64,
    pub xp_reward: i64,
}

const fn seed(
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: &'static str,
    condition: ConditionKind,
    condition_value: i64,
    xp_reward: i64,
) -> AchievementSeed {
    AchievementSeed {
        name,
        description,
        icon,
        category,
        condition,
        condition_value,
        xp_reward,
    }
}

/// The built-in catalogue.
pub const DEFAULT_ACHIEVEMENTS: [AchievementSeed; 11] = [
    seed("First Steps", "Reach Level 2", "fa-baby", "progression", ConditionKind::LevelReached, 2, 50),
    seed("Getting Serious", "Reach Level 5", "fa-rocket", "progression", ConditionKind::LevelReached, 5, 100),
    seed("Veteran", "Reach Level 10", "fa-medal", "progression", ConditionKind::LevelReached, 10, 200),
    seed("Master", "Reach Level 20", "fa-crown", "progression", ConditionKind::LevelReached, 20, 500),
    seed("Getting Started", "Complete your first task", "fa-check", "tasks", ConditionKind::TasksCompleted, 1, 25),
    seed("Task Warrior", "Complete 10 tasks", "fa-sword", "tasks", ConditionKind::TasksCompleted, 10, 75),
    seed("Quest Master", "Complete 25 tasks", "fa-trophy", "tasks", ConditionKind::TasksCompleted, 25, 150),
    seed("Completionist", "Complete 100 tasks", "fa-star", "tasks", ConditionKind::TasksCompleted, 100, 500),
    seed("Experience Seeker", "Earn 500 XP", "fa-gem", "progression", ConditionKind::XpEarned, 500, 50),
    seed("Knowledge Hunter", "Earn 1000 XP", "fa-brain", "progression", ConditionKind::XpEarned, 1000, 100),
    seed("Wisdom Collector", "Earn 5000 XP", "fa-scroll", "progression", ConditionKind::XpEarned, 5000, 300),
];

const ACHIEVEMENT_COLUMNS: &str = "id, name, description, icon, category, condition_type, \
    condition_value, xp_reward, unlocked, unlocked_at, created_at";

fn row_to_achievement(row: &Row<'_>) -> rusqlite::Result<Achievement> {
    Ok(Achievement {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        category: row.get(4)?,
        condition_type: row.get(5)?,
        condition_value: row.get(6)?,
        xp_reward: row.get(7)?,
        unlocked: row.get(8)?,
        unlocked_at: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Insert any catalogue entries that are missing, matched by name.
/// Returns the number inserted.
pub fn seed_default_achievements(conn: &Connection) -> rusqlite::Result<usize> {
    let now = timestamp(Utc::now());
    let mut inserted = 0;
    for seed in &DEFAULT_ACHIEVEMENTS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO achievements \
             (id, name, description, icon, category, condition_type, condition_value, xp_reward, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                uuid::Uuid::now_v7().to_string(),
                seed.name,
                seed.description,
                seed.icon,
                seed.category,
                seed.condition.as_str(),
                seed.condition_value,
                seed.xp_reward,
                now,
            ],
        )?;
    }
    Ok(inserted)
}

/// Seed the catalogue only when the table is empty.
///
/// Returns how many achievements were added; zero means it was already initialized.
pub fn initialize_achievements(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM achievements", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }
    let seeded = seed_default_achievements(&tx)?;
    write_activity(
        &tx,
        "initialize",
        "achievement",
        "*",
        Some(&serde_json::json!({ "seeded": seeded })),
    )?;
    tx.commit()?;
    tracing::info!(seeded, "achievements initialized");
    Ok(seeded)
}

/// All achievements in catalogue order.
pub fn list_achievements(conn: &Connection) -> Result<Vec<Achievement>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements ORDER BY created_at, rowid"
    ))?;
    let rows = stmt
        .query_map([], row_to_achievement)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Unlocked achievements, most recent first.
pub fn list_unlocked(conn: &Connection) -> Result<Vec<Achievement>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE unlocked = 1 \
         ORDER BY unlocked_at DESC, rowid DESC"
    ))?;
    let rows = stmt
        .query_map([], row_to_achievement)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub total: i64,
    pub unlocked: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementStats {
    pub total: i64,
    pub unlocked: i64,
    /// `unlocked / total`, zero for an empty catalogue.
    pub progress: f64,
    pub categories: BTreeMap<String, CategoryStats>,
}

pub fn achievement_stats(conn: &Connection) -> Result<AchievementStats> {
    let mut stmt = conn.prepare(
        "SELECT category, COUNT(*), COALESCE(SUM(unlocked), 0) FROM achievements GROUP BY category",
    )?;
    let categories = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                CategoryStats {
                    total: row.get(1)?,
                    unlocked: row.get(2)?,
                },
            ))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

    let total: i64 = categories.values().map(|c| c.total).sum();
    let unlocked: i64 = categories.values().map(|c| c.unlocked).sum();
    Ok(AchievementStats {
        total,
        unlocked,
        progress: if total > 0 { unlocked as f64 / total as f64 } else { 0.0 },
        categories,
    })
}

/// Unlock whatever the profile now qualifies for and add the rewards to it.
///
/// Runs inside the caller's transaction. The caller persists `profile`.
pub(crate) fn run_unlock_scan(
    conn: &Connection,
    profile: &mut Profile,
    now: DateTime<Utc>,
) -> Result<Vec<Achievement>> {
    let locked: Vec<Achievement> = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE unlocked = 0 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
            .query_map([], row_to_achievement)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    if locked.is_empty() {
        return Ok(Vec::new());
    }

    let rules: Vec<AchievementRule<'_>> = locked
        .iter()
        .map(|a| AchievementRule {
            condition_type: &a.condition_type,
            condition_value: a.condition_value,
            xp_reward: a.xp_reward,
            unlocked: false,
        })
        .collect();
    let snapshot = ProgressSnapshot::new(profile.xp, completed_task_count(conn)?);
    let scan = scan_unlocks(&rules, snapshot);
    if scan.unlocked.is_empty() {
        return Ok(Vec::new());
    }

    let stamp = timestamp(now);
    let mut unlocked = Vec::with_capacity(scan.unlocked.len());
    for idx in scan.unlocked {
        let mut achievement = locked[idx].clone();
        conn.execute(
            "UPDATE achievements SET unlocked = 1, unlocked_at = ?1 WHERE id = ?2",
            params![stamp, achievement.id],
        )?;
        write_activity(
            conn,
            "unlock",
            "achievement",
            &achievement.id,
            Some(&serde_json::json!({ "name": achievement.name, "xp_reward": achievement.xp_reward })),
        )?;
        tracing::info!(achievement = %achievement.name, xp_reward = achievement.xp_reward, "achievement unlocked");
        achievement.unlocked = true;
        achievement.unlocked_at = Some(stamp.clone());
        unlocked.push(achievement);
    }
    add_xp(profile, scan.xp_granted);

    Ok(unlocked)
}

/// Result of an explicit achievement check.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementCheck {
    pub unlocked: Vec<Achievement>,
    pub xp_granted: i64,
    pub profile: Profile,
}

/// Run the unlock scan against the stored profile and persist the result.
pub fn check_achievements(conn: &mut Connection) -> Result<AchievementCheck> {
    let tx = conn.transaction()?;
    let mut profile = load_profile(&tx)?;
    sync_derived(&mut profile);
    let xp_before = profile.xp;

    let now = Utc::now();
    let unlocked = run_unlock_scan(&tx, &mut profile, now)?;
    if !unlocked.is_empty() {
        profile.updated_at = timestamp(now);
        save_profile(&tx, &profile)?;
    }
    tx.commit()?;

    Ok(AchievementCheck {
        xp_granted: profile.xp - xp_before,
        unlocked,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn set_xp(conn: &Connection, xp: i64) {
        conn.execute(
            "INSERT OR IGNORE INTO profile (id, created_at, updated_at) VALUES (1, 'now', 'now')",
            [],
        )
        .unwrap();
        conn.execute("UPDATE profile SET xp = ?1 WHERE id = 1", params![xp])
            .unwrap();
    }

    #[test]
    fn catalogue_is_seeded_once() {
        let mut conn = db::open_memory_database().unwrap();
        assert_eq!(list_achievements(&conn).unwrap().len(), 11);
        assert_eq!(seed_default_achievements(&conn).unwrap(), 0);
        assert_eq!(initialize_achievements(&mut conn).unwrap(), 0);
    }

    #[test]
    fn initialize_fills_an_empty_table() {
        let mut conn = db::open_memory_database().unwrap();
        conn.execute("DELETE FROM achievements", []).unwrap();
        assert_eq!(initialize_achievements(&mut conn).unwrap(), 11);
        assert_eq!(list_achievements(&conn).unwrap()[0].name, "First Steps");
    }

    #[test]
    fn check_unlocks_and_grants_rewards() {
        let mut conn = db::open_memory_database().unwrap();
        set_xp(&conn, 520); // level 3, past "Earn 500 XP"

        let check = check_achievements(&mut conn).unwrap();
        let names: Vec<&str> = check.unlocked.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["First Steps", "Experience Seeker"]);
        assert_eq!(check.xp_granted, 100);
        assert_eq!(check.profile.xp, 620);
        assert_eq!(check.profile.level, 4);

        let again = check_achievements(&mut conn).unwrap();
        assert!(again.unlocked.is_empty());
        assert_eq!(again.xp_granted, 0);
        assert_eq!(again.profile.xp, 620);
    }

    #[test]
    fn stats_count_per_category() {
        let mut conn = db::open_memory_database().unwrap();
        set_xp(&conn, 100);
        check_achievements(&mut conn).unwrap();

        let stats = achievement_stats(&conn).unwrap();
        assert_eq!(stats.total, 11);
        assert_eq!(stats.unlocked, 1);
        assert!((stats.progress - 1.0 / 11.0).abs() < 1e-9);
        assert_eq!(stats.categories["tasks"], CategoryStats { total: 4, unlocked: 0 });
        assert_eq!(stats.categories["progression"], CategoryStats { total: 7, unlocked: 1 });

        assert_eq!(list_unlocked(&conn).unwrap()[0].name, "First Steps");
    }
}
