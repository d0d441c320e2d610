//! SQL DDL for all tracker tables.
//!
//! Defines `profile`, `tasks`, `goals`, `achievements`, `activity_log`,
//! `task_feedback`, `task_patterns`, and `schema_meta`. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- Singleton player profile (id is always 1)
CREATE TABLE IF NOT EXISTS profile (
    id INTEGER PRIMARY KEY CHECK(id = 1),
    name TEXT NOT NULL DEFAULT 'Player',
    xp INTEGER NOT NULL DEFAULT 0 CHECK(xp >= 0),
    level INTEGER NOT NULL DEFAULT 1 CHECK(level >= 1),
    skill_points INTEGER NOT NULL DEFAULT 0,
    skill_points_spent INTEGER NOT NULL DEFAULT 0,
    goals TEXT,
    preferred_difficulty TEXT NOT NULL DEFAULT 'medium',
    focus_areas TEXT NOT NULL DEFAULT '[]',
    strength INTEGER NOT NULL DEFAULT 1 CHECK(strength >= 1),
    endurance INTEGER NOT NULL DEFAULT 1 CHECK(endurance >= 1),
    agility INTEGER NOT NULL DEFAULT 1 CHECK(agility >= 1),
    focus INTEGER NOT NULL DEFAULT 1 CHECK(focus >= 1),
    memory INTEGER NOT NULL DEFAULT 1 CHECK(memory >= 1),
    problem_solving INTEGER NOT NULL DEFAULT 1 CHECK(problem_solving >= 1),
    communication INTEGER NOT NULL DEFAULT 1 CHECK(communication >= 1),
    leadership INTEGER NOT NULL DEFAULT 1 CHECK(leadership >= 1),
    empathy INTEGER NOT NULL DEFAULT 1 CHECK(empathy >= 1),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    difficulty TEXT NOT NULL DEFAULT 'medium' CHECK(difficulty IN ('easy','medium','hard','expert')),
    category TEXT NOT NULL DEFAULT 'general',
    base_xp INTEGER NOT NULL,
    xp INTEGER NOT NULL,
    goal_alignment REAL NOT NULL DEFAULT 0.0 CHECK(goal_alignment >= 0.0 AND goal_alignment <= 1.0),
    frequency TEXT NOT NULL DEFAULT 'once' CHECK(frequency IN ('once','daily','weekly','monthly')),
    skill_reward TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 1,
    times_completed INTEGER NOT NULL DEFAULT 0,
    source TEXT NOT NULL DEFAULT 'manual' CHECK(source IN ('manual','ai')),
    last_completed_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_source ON tasks(source, created_at);

CREATE TABLE IF NOT EXISTS goals (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL DEFAULT 'personal',
    priority TEXT NOT NULL DEFAULT 'medium' CHECK(priority IN ('low','medium','high')),
    target REAL,
    progress REAL NOT NULL DEFAULT 0.0 CHECK(progress >= 0.0 AND progress <= 1.0),
    completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_goals_title ON goals(title);

CREATE TABLE IF NOT EXISTS achievements (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    icon TEXT NOT NULL,
    category TEXT NOT NULL,
    condition_type TEXT NOT NULL,
    condition_value INTEGER NOT NULL,
    xp_reward INTEGER NOT NULL DEFAULT 0,
    unlocked INTEGER NOT NULL DEFAULT 0,
    unlocked_at TEXT,
    created_at TEXT NOT NULL
);

-- Audit log
CREATE TABLE IF NOT EXISTS activity_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    entity TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    details TEXT,
    created_at TEXT NOT NULL
);

-- Suggestion feedback and the patterns learned from it
CREATE TABLE IF NOT EXISTS task_feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_goals TEXT,
    generated_task TEXT NOT NULL,
    task_category TEXT NOT NULL,
    user_rating INTEGER NOT NULL CHECK(user_rating BETWEEN 1 AND 5),
    completion_status INTEGER NOT NULL,
    completion_time INTEGER,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task_patterns (
    pattern_type TEXT NOT NULL,
    pattern_value TEXT NOT NULL,
    task_category TEXT NOT NULL,
    success_rate REAL NOT NULL,
    usage_count INTEGER NOT NULL DEFAULT 1,
    last_updated TEXT NOT NULL,
    PRIMARY KEY (pattern_type, pattern_value, task_category)
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
