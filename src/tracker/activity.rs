//! Append-only activity log. Every tracker mutation writes one row.

use rusqlite::{params, Connection};
use serde::Serialize;

/// One row of the activity log.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub operation: String,
    pub entity: String,
    pub entity_id: String,
    pub details: Option<serde_json::Value>,
    pub created_at: String,
}

/// Write an entry to the `activity_log` table.
pub(crate) fn write_activity(
    conn: &Connection,
    operation: &str,
    entity: &str,
    entity_id: &str,
    details: Option<&serde_json::Value>,
) -> rusqlite::Result<()> {
    let now = super::timestamp(chrono::Utc::now());
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO activity_log (operation, entity, entity_id, details, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![operation, entity, entity_id, details_json, now],
    )?;
    Ok(())
}

/// Most recent entries, newest first.
pub fn recent_activity(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<ActivityEntry>> {
    let mut stmt = conn.prepare(
        "SELECT operation, entity, entity_id, details, created_at FROM activity_log \
         ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            let details: Option<String> = row.get(3)?;
            Ok(ActivityEntry {
                operation: row.get(0)?,
                entity: row.get(1)?,
                entity_id: row.get(2)?,
                details: details.and_then(|d| serde_json::from_str(&d).ok()),
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
