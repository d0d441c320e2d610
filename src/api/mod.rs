//! REST surface.
//!
//! Every handler locks the shared connection on the blocking pool via
//! [`crate::db::with_conn`] and delegates to a tracker operation. Derived values
//! never come from request bodies: the request types in
//! [`crate::tracker::types`] have no field for them.

pub mod achievements;
pub mod ai;
pub mod error;
pub mod goals;
pub mod profile;
pub mod tasks;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use crate::config::LevelupConfig;
use crate::db::SharedDb;
use crate::suggest::Suggester;
use crate::tracker::status::{get_status, StatusSummary};

pub use error::{ApiError, ApiResult};

/// State shared by every handler and by the MCP tools.
pub struct AppState {
    pub db: SharedDb,
    pub config: Arc<LevelupConfig>,
    pub suggester: Arc<Suggester>,
}

pub type SharedState = Arc<AppState>;

/// The full REST router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .merge(profile::routes())
        .merge(tasks::routes())
        .merge(goals::routes())
        .merge(achievements::routes())
        .merge(ai::routes())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn status(State(state): State<SharedState>) -> ApiResult<StatusSummary> {
    let summary = crate::db::with_conn(&state.db, get_status).await?;
    Ok(Json(summary))
}
