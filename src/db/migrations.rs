//! Forward-only schema migrations.
//!
//! `schema_meta.schema_version` records the last applied step. Each step runs in
//! its own transaction together with the version bump, so a crash mid-upgrade
//! leaves the database at the previous version.

use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// `(target version, description, step)`, in order.
const MIGRATIONS: [(u32, &str, Step); 2] = [
    (2, "seed default achievements", seed_achievements),
    (3, "index recurring tasks and activity lookups", add_lookup_indexes),
];

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn set_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Apply every step newer than the stored version. Returns how many ran.
pub fn run_migrations(conn: &mut Connection) -> rusqlite::Result<usize> {
    let current = get_schema_version(conn)?;
    if current > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            schema_version = current,
            supported = CURRENT_SCHEMA_VERSION,
            "database is newer than this binary"
        );
        return Ok(0);
    }

    let mut applied = 0;
    for (version, description, step) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        tracing::info!(to = version, description, "running migration");
        let tx = conn.transaction()?;
        step(&tx)?;
        set_schema_version(&tx, *version)?;
        tx.commit()?;
        applied += 1;
    }
    Ok(applied)
}

fn seed_achievements(conn: &Connection) -> rusqlite::Result<()> {
    let seeded = crate::tracker::achievements::seed_default_achievements(conn)?;
    tracing::info!(seeded, "default achievements seeded");
    Ok(())
}

fn add_lookup_indexes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_tasks_recurring ON tasks(completed, frequency, active);
         CREATE INDEX IF NOT EXISTS idx_goals_open ON goals(active, completed);
         CREATE INDEX IF NOT EXISTS idx_activity_entity ON activity_log(entity, entity_id);",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::schema::init_schema(&conn).unwrap();
        conn
    }

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn base_schema_starts_at_version_one() {
        let conn = base_db();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM achievements"), 0);
    }

    #[test]
    fn upgrade_seeds_catalogue_and_indexes() {
        let mut conn = base_db();
        assert_eq!(run_migrations(&mut conn).unwrap(), MIGRATIONS.len());

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM achievements"), 11);
        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_tasks_recurring'"
            ),
            1
        );
    }

    #[test]
    fn partial_upgrade_resumes_from_stored_version() {
        let mut conn = base_db();
        conn.execute("UPDATE schema_meta SET value = '2' WHERE key = 'schema_version'", [])
            .unwrap();

        assert_eq!(run_migrations(&mut conn).unwrap(), 1);
        // step 2 was skipped, so nothing was seeded
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM achievements"), 0);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut conn = base_db();
        run_migrations(&mut conn).unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), 0);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM achievements"), 11);
    }

    #[test]
    fn newer_database_is_left_alone() {
        let mut conn = base_db();
        conn.execute("UPDATE schema_meta SET value = '99' WHERE key = 'schema_version'", [])
            .unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), 0);
        assert_eq!(get_schema_version(&conn).unwrap(), 99);
    }
}
