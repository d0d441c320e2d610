use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::{ApiResult, SharedState};
use crate::db::with_conn;
use crate::tracker::profile::{get_profile, update_profile};
use crate::tracker::types::{Profile, ProfileUpdate};

pub fn routes() -> Router<SharedState> {
    Router::new().route("/profile", get(read_profile).patch(patch_profile))
}

async fn read_profile(State(state): State<SharedState>) -> ApiResult<Profile> {
    let profile = with_conn(&state.db, get_profile).await?;
    Ok(Json(profile))
}

async fn patch_profile(
    State(state): State<SharedState>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Profile> {
    let profile = with_conn(&state.db, move |conn| update_profile(conn, &update)).await?;
    Ok(Json(profile))
}
