mod helpers;

use levelup::db;
use levelup::db::migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};
use levelup::tracker::types::NewTask;
use levelup::tracker::{profile, tasks};
use levelup::progression::RewardPolicy;
use levelup::tracker::types::TaskSource;
use tempfile::TempDir;

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("levelup.db");
    assert!(!db_path.exists());

    let conn = db::open_database(&db_path).unwrap();

    assert!(db_path.exists());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn busy_timeout_and_wal_are_set() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("test.db")).unwrap();

    let timeout: i64 = conn
        .pragma_query_value(None, "busy_timeout", |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, 5000);

    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn progress_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("levelup.db");

    let task_id = {
        let mut conn = db::open_database(&db_path).unwrap();
        let new = NewTask {
            title: "Write report".into(),
            ..Default::default()
        };
        let task = tasks::create_task(&mut conn, &new, TaskSource::Manual, RewardPolicy::Ranged).unwrap();
        tasks::complete_task(&mut conn, &task.id).unwrap();
        task.id
    };

    let mut conn = db::open_database(&db_path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

    let task = tasks::get_task(&conn, &task_id).unwrap();
    assert!(task.completed);
    let profile = profile::get_profile(&mut conn).unwrap();
    assert!(profile.xp > 0);

    // reopening must not reseed the catalogue
    let report = db::check_database_health(&conn).unwrap();
    assert_eq!(report.achievement_count, 11);
    assert_eq!(report.task_count, 1);
}

#[test]
fn base_schema_upgrades_to_current() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), 1);

    run_migrations(&mut conn).unwrap();
    run_migrations(&mut conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let report = db::check_database_health(&conn).unwrap();
    assert_eq!(report.achievement_count, 11);
}

#[test]
fn health_check_counts_rows() {
    let mut conn = helpers::test_db();
    profile::get_profile(&mut conn).unwrap();

    let report = db::check_database_health(&conn).unwrap();
    assert!(report.integrity_ok);
    assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(report.goal_count, 0);
    // the lazily created profile is logged
    assert_eq!(report.log_count, 1);
}
