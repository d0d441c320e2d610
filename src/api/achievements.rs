use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{ApiResult, SharedState};
use crate::db::with_conn;
use crate::tracker::achievements::{self, AchievementCheck, AchievementStats};
use crate::tracker::types::Achievement;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/achievements", get(list))
        .route("/achievements/unlocked", get(unlocked))
        .route("/achievements/stats", get(stats))
        .route("/achievements/initialize", post(initialize))
        .route("/achievements/check", post(check))
}

async fn list(State(state): State<SharedState>) -> ApiResult<Vec<Achievement>> {
    let all = with_conn(&state.db, |conn| achievements::list_achievements(conn)).await?;
    Ok(Json(all))
}

async fn unlocked(State(state): State<SharedState>) -> ApiResult<Vec<Achievement>> {
    let unlocked = with_conn(&state.db, |conn| achievements::list_unlocked(conn)).await?;
    Ok(Json(unlocked))
}

async fn stats(State(state): State<SharedState>) -> ApiResult<AchievementStats> {
    let stats = with_conn(&state.db, |conn| achievements::achievement_stats(conn)).await?;
    Ok(Json(stats))
}

async fn initialize(State(state): State<SharedState>) -> ApiResult<serde_json::Value> {
    let seeded = with_conn(&state.db, achievements::initialize_achievements).await?;
    let message = if seeded == 0 {
        "Achievements already initialized".to_string()
    } else {
        format!("Initialized {seeded} achievements")
    };
    Ok(Json(serde_json::json!({ "message": message, "seeded": seeded })))
}

async fn check(State(state): State<SharedState>) -> ApiResult<AchievementCheck> {
    let check = with_conn(&state.db, achievements::check_achievements).await?;
    Ok(Json(check))
}
