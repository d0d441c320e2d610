mod helpers;

use axum::http::{Method, StatusCode};
use helpers::{call, test_config, test_state, ScriptedGenerator};
use levelup::api::SharedState;
use serde_json::json;

fn state() -> SharedState {
    test_state(test_config(), ScriptedGenerator::offline())
}

async fn create_task(state: &SharedState, body: serde_json::Value) -> serde_json::Value {
    let (status, _, task) = call(state, Method::POST, "/tasks", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    task
}

#[tokio::test]
async fn health_reports_ok() {
    let state = state();
    let (status, _, body) = call(&state, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_task_is_404_with_detail() {
    let state = state();
    let (status, _, body) = call(&state, Method::GET, "/tasks/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("task not found"));
}

#[tokio::test]
async fn create_derives_xp_and_ignores_client_rewards() {
    let state = state();
    let task = create_task(
        &state,
        json!({"title": "Walk", "difficulty": "easy", "xp": 500, "level": 99, "completed": true}),
    )
    .await;
    assert_eq!(task["xp"], 20);
    assert_eq!(task["completed"], false);
    assert_eq!(task["source"], "manual");

    let (status, _, body) = call(&state, Method::POST, "/tasks", Some(json!({"title": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn completing_over_http_awards_once() {
    let state = state();
    let task = create_task(&state, json!({"title": "Ship it", "difficulty": "expert", "xp": 75})).await;
    let uri = format!("/tasks/{}/complete", task["id"].as_str().unwrap());

    let (status, _, first) = call(&state, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["xp_awarded"], 75);
    assert_eq!(first["already_completed"], false);
    assert_eq!(first["achievements_unlocked"][0]["name"], "Getting Started");

    let (status, _, second) = call(&state, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["already_completed"], true);
    assert_eq!(second["xp_awarded"], 0);

    let (_, _, profile) = call(&state, Method::GET, "/profile", None).await;
    assert_eq!(profile["xp"], first["profile"]["xp"]);
}

#[tokio::test]
async fn deleted_tasks_drop_out_of_listing() {
    let state = state();
    let keep = create_task(&state, json!({"title": "Keep"})).await;
    let drop = create_task(&state, json!({"title": "Drop"})).await;

    let uri = format!("/tasks/{}", drop["id"].as_str().unwrap());
    let (status, _, deleted) = call(&state, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["active"], false);

    let (_, _, listed) = call(&state, Method::GET, "/tasks", None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], keep["id"]);

    let (_, _, all) = call(&state, Method::GET, "/tasks?include_inactive=true&limit=5", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn overspending_skill_points_is_400() {
    let state = state();
    let (status, _, body) =
        call(&state, Method::PATCH, "/profile", Some(json!({"strength": 4, "name": "Ada"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("not enough skill points"));

    let (_, _, profile) = call(&state, Method::GET, "/profile", None).await;
    assert_eq!(profile["name"], "Player");
    assert_eq!(profile["strength"], 1);

    let (status, _, renamed) =
        call(&state, Method::PATCH, "/profile", Some(json!({"name": "Ada", "xp": 9000}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Ada");
    assert_eq!(renamed["xp"], 0);
}

#[tokio::test]
async fn goal_progress_only_moves_forward() {
    let state = state();
    let (status, _, goal) = call(
        &state,
        Method::POST,
        "/goals",
        Some(json!({"title": "Emergency fund", "category": "financial", "target": 5000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/goals/{}/progress", goal["id"].as_str().unwrap());

    let (status, _, goal) = call(&state, Method::POST, &uri, Some(json!({"progress": 0.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["progress"], 0.5);

    let (status, _, _) = call(&state, Method::POST, &uri, Some(json!({"progress": 0.3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, goal) = call(&state, Method::POST, &uri, Some(json!({"progress": 7.0}))).await;
    assert_eq!(goal["progress"], 1.0);
    assert_eq!(goal["completed"], true);
}

#[tokio::test]
async fn goal_categories_are_listed() {
    let state = state();
    let (status, _, categories) = call(&state, Method::GET, "/goals/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 6);
    assert!(ids.contains(&"financial"));
}

#[tokio::test]
async fn achievements_are_seeded_and_reported() {
    let state = state();
    let (_, _, body) = call(&state, Method::POST, "/achievements/initialize", None).await;
    assert_eq!(body["message"], "Achievements already initialized");

    let (_, _, all) = call(&state, Method::GET, "/achievements", None).await;
    assert_eq!(all.as_array().unwrap().len(), 11);

    let (_, _, stats) = call(&state, Method::GET, "/achievements/stats", None).await;
    assert_eq!(stats["total"], 11);
    assert_eq!(stats["unlocked"], 0);

    let (status, _, check) = call(&state, Method::POST, "/achievements/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["xp_granted"], 0);
}

#[tokio::test]
async fn status_counts_open_tasks() {
    let state = state();
    create_task(&state, json!({"title": "One"})).await;
    create_task(&state, json!({"title": "Two"})).await;

    let (status, _, summary) = call(&state, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["open_tasks"], 2);
    assert_eq!(summary["level"], 1);
}
