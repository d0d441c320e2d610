//! Tracker operations: load entities, apply the progression rules, persist.
//!
//! Public operations that mutate state take `&mut Connection` and run inside a
//! single transaction, so a request either applies completely or not at all.

pub mod achievements;
pub mod activity;
pub mod goals;
pub mod profile;
pub mod status;
pub mod tasks;
pub mod types;

/// RFC 3339 in UTC with fixed microsecond precision, so timestamp columns sort
/// lexicographically.
pub(crate) fn timestamp(now: chrono::DateTime<chrono::Utc>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Count characters rather than bytes so multi-byte titles are cut cleanly.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
