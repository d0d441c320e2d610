use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{ApiResult, SharedState};
use crate::db::with_conn;
use crate::suggest::feedback::{self, FeedbackOutcome, ModelStats, TaskFeedback};
use crate::suggest::{GenerateRequest, GenerationOutcome};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/ai/generate", post(generate))
        .route("/ai/feedback", post(record_feedback))
        .route("/ai/stats", get(stats))
}

async fn generate(
    State(state): State<SharedState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<GenerationOutcome> {
    let outcome = state.suggester.generate(&state.db, request).await?;
    Ok(Json(outcome))
}

async fn record_feedback(
    State(state): State<SharedState>,
    Json(body): Json<TaskFeedback>,
) -> ApiResult<FeedbackOutcome> {
    let outcome = with_conn(&state.db, move |conn| feedback::record_feedback(conn, &body)).await?;
    Ok(Json(outcome))
}

async fn stats(State(state): State<SharedState>) -> ApiResult<ModelStats> {
    let llm = state.suggester.config().clone();
    let stats = with_conn(&state.db, move |conn| feedback::model_stats(conn, &llm)).await?;
    Ok(Json(stats))
}
