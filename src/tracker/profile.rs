//! The singleton profile: lazy creation, derived-field sync, and skill spending.

use rusqlite::{params, Connection, Row};

use super::activity::write_activity;
use super::types::{Profile, ProfileUpdate};
use crate::error::{Result, TrackerError};
use crate::progression::skills::plan_skill_spend;
use crate::progression::{level_from_xp, skill_points_for_level, Difficulty, SkillSet};

/// Row id of the only profile.
pub const PROFILE_ID: i64 = 1;

const PROFILE_COLUMNS: &str = "name, xp, level, skill_points, skill_points_spent, goals, \
    preferred_difficulty, focus_areas, strength, endurance, agility, focus, memory, \
    problem_solving, communication, leadership, empathy, created_at, updated_at";

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let difficulty: String = row.get(6)?;
    let focus_areas: String = row.get(7)?;
    Ok(Profile {
        name: row.get(0)?,
        xp: row.get(1)?,
        level: row.get(2)?,
        skill_points: row.get(3)?,
        skill_points_spent: row.get(4)?,
        goals: row.get(5)?,
        preferred_difficulty: Difficulty::parse_lenient(&difficulty),
        focus_areas: parse_focus_areas(&focus_areas),
        skills: SkillSet {
            strength: row.get(8)?,
            endurance: row.get(9)?,
            agility: row.get(10)?,
            focus: row.get(11)?,
            memory: row.get(12)?,
            problem_solving: row.get(13)?,
            communication: row.get(14)?,
            leadership: row.get(15)?,
            empathy: row.get(16)?,
        },
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

/// A corrupt column reads as empty; the next save rewrites it.
fn parse_focus_areas(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, raw, "unreadable focus_areas, treating as empty");
        Vec::new()
    })
}

/// Load the profile, creating the default one on first access.
pub(crate) fn load_profile(conn: &Connection) -> Result<Profile> {
    let now = super::timestamp(chrono::Utc::now());
    let created = conn.execute(
        "INSERT OR IGNORE INTO profile (id, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![PROFILE_ID, now],
    )?;
    if created > 0 {
        tracing::info!("created default profile");
        write_activity(conn, "create", "profile", &PROFILE_ID.to_string(), None)?;
    }

    let profile = conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE id = ?1"),
        params![PROFILE_ID],
        row_to_profile,
    )?;
    Ok(profile)
}

/// Recompute `level` and available `skill_points` from `xp`.
/// Returns `true` if either value changed.
pub(crate) fn sync_derived(profile: &mut Profile) -> bool {
    let level = level_from_xp(profile.xp);
    let available = (skill_points_for_level(level) - profile.skill_points_spent).max(0);
    let changed = level != profile.level || available != profile.skill_points;
    profile.level = level;
    profile.skill_points = available;
    changed
}

/// Add XP and resync the derived fields. Negative amounts are ignored.
pub(crate) fn add_xp(profile: &mut Profile, amount: i64) {
    profile.xp = profile.xp.saturating_add(amount.max(0));
    sync_derived(profile);
}

pub(crate) fn save_profile(conn: &Connection, profile: &Profile) -> Result<()> {
    let focus_areas = serde_json::to_string(&profile.focus_areas)?;
    let s = &profile.skills;
    conn.execute(
        "UPDATE profile SET name = ?1, xp = ?2, level = ?3, skill_points = ?4, \
         skill_points_spent = ?5, goals = ?6, preferred_difficulty = ?7, focus_areas = ?8, \
         strength = ?9, endurance = ?10, agility = ?11, focus = ?12, memory = ?13, \
         problem_solving = ?14, communication = ?15, leadership = ?16, empathy = ?17, \
         updated_at = ?18 WHERE id = ?19",
        params![
            profile.name,
            profile.xp,
            profile.level,
            profile.skill_points,
            profile.skill_points_spent,
            profile.goals,
            profile.preferred_difficulty.as_str(),
            focus_areas,
            s.strength,
            s.endurance,
            s.agility,
            s.focus,
            s.memory,
            s.problem_solving,
            s.communication,
            s.leadership,
            s.empathy,
            profile.updated_at,
            PROFILE_ID,
        ],
    )?;
    Ok(())
}

/// Fetch the profile, healing any drift in its derived fields.
pub fn get_profile(conn: &mut Connection) -> Result<Profile> {
    let tx = conn.transaction()?;
    let mut profile = load_profile(&tx)?;
    if sync_derived(&mut profile) {
        tracing::debug!(level = profile.level, skill_points = profile.skill_points, "profile resynced");
        profile.updated_at = super::timestamp(chrono::Utc::now());
        save_profile(&tx, &profile)?;
    }
    tx.commit()?;
    Ok(profile)
}

/// Apply an allow-listed update.
///
/// Skill increases are paid for with skill points. If the request costs more than
/// the profile has, or lowers a skill, nothing at all is written.
pub fn update_profile(conn: &mut Connection, update: &ProfileUpdate) -> Result<Profile> {
    let tx = conn.transaction()?;
    let mut profile = load_profile(&tx)?;
    sync_derived(&mut profile);

    let spend = plan_skill_spend(&profile.skills, &update.requested_skills(), profile.skill_points)?;

    if let Some(name) = &update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::invalid("name must not be empty"));
        }
        profile.name = name.to_string();
    }
    if let Some(goals) = &update.goals {
        profile.goals = Some(goals.clone());
    }
    if let Some(difficulty) = update.preferred_difficulty {
        profile.preferred_difficulty = difficulty;
    }
    if let Some(areas) = &update.focus_areas {
        profile.focus_areas = areas.clone();
    }

    profile.skills = spend.skills;
    profile.skill_points_spent += spend.points_spent;
    sync_derived(&mut profile);
    profile.updated_at = super::timestamp(chrono::Utc::now());

    save_profile(&tx, &profile)?;
    write_activity(
        &tx,
        "update",
        "profile",
        &PROFILE_ID.to_string(),
        Some(&serde_json::json!({ "skill_points_spent": spend.points_spent })),
    )?;
    tx.commit()?;

    tracing::info!(
        spent = spend.points_spent,
        remaining = profile.skill_points,
        "profile updated"
    );
    Ok(profile)
}
