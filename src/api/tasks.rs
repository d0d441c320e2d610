use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use super::{ApiError, ApiResult, SharedState};
use crate::db::with_conn;
use crate::tracker::tasks::{self, CompletionOutcome};
use crate::tracker::types::{NewTask, Task, TaskFilter, TaskSource, TaskUpdate};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/complete", patch(complete_task))
}

async fn list_tasks(
    State(state): State<SharedState>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Vec<Task>> {
    let tasks = with_conn(&state.db, move |conn| tasks::list_tasks(conn, &filter)).await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<SharedState>,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let policy = state.config.progression.reward_policy;
    let task = with_conn(&state.db, move |conn| {
        tasks::create_task(conn, &new, TaskSource::Manual, policy)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Task> {
    let task = with_conn(&state.db, move |conn| tasks::get_task(conn, &id)).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult<Task> {
    let policy = state.config.progression.reward_policy;
    let task = with_conn(&state.db, move |conn| {
        tasks::update_task(conn, &id, &update, policy)
    })
    .await?;
    Ok(Json(task))
}

async fn delete_task(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Task> {
    let task = with_conn(&state.db, move |conn| tasks::deactivate_task(conn, &id)).await?;
    Ok(Json(task))
}

async fn complete_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<CompletionOutcome> {
    let outcome = with_conn(&state.db, move |conn| tasks::complete_task(conn, &id)).await?;
    Ok(Json(outcome))
}
