use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{ApiError, ApiResult, SharedState};
use crate::db::with_conn;
use crate::progression::types::{goal_categories, GoalCategoryInfo};
use crate::tracker::goals;
use crate::tracker::types::{Goal, GoalUpdate, NewGoal};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/categories", get(categories))
        .route("/goals/{id}", patch(update_goal).delete(delete_goal))
        .route("/goals/{id}/progress", post(set_progress))
}

#[derive(Debug, Deserialize)]
pub struct ProgressBody {
    pub progress: f64,
}

async fn list_goals(State(state): State<SharedState>) -> ApiResult<Vec<Goal>> {
    let goals = with_conn(&state.db, |conn| goals::list_goals(conn)).await?;
    Ok(Json(goals))
}

async fn create_goal(
    State(state): State<SharedState>,
    Json(new): Json<NewGoal>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    let goal = with_conn(&state.db, move |conn| goals::create_goal(conn, &new)).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn categories() -> Json<Vec<GoalCategoryInfo>> {
    Json(goal_categories())
}

async fn update_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<GoalUpdate>,
) -> ApiResult<Goal> {
    let goal = with_conn(&state.db, move |conn| goals::update_goal(conn, &id, &update)).await?;
    Ok(Json(goal))
}

async fn delete_goal(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Goal> {
    let goal = with_conn(&state.db, move |conn| goals::deactivate_goal(conn, &id)).await?;
    Ok(Json(goal))
}

async fn set_progress(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<ProgressBody>,
) -> ApiResult<Goal> {
    let goal = with_conn(&state.db, move |conn| {
        goals::set_goal_progress(conn, &id, body.progress)
    })
    .await?;
    Ok(Json(goal))
}
