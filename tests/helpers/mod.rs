#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use levelup::api::{self, SharedState};
use levelup::config::LevelupConfig;
use levelup::db;
use levelup::server::build_state;
use levelup::suggest::{GenerationRequest, TextGenerator};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Default config with the generation cooldown disabled.
pub fn test_config() -> LevelupConfig {
    let mut config = LevelupConfig::default();
    config.llm.generation_cooldown_secs = 0;
    config
}

/// Replays scripted model replies in order; errors once they run out.
pub struct ScriptedGenerator {
    replies: Mutex<Vec<anyhow::Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<anyhow::Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// A generator whose every call fails, as if Ollama were down.
    pub fn offline() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            anyhow::bail!("connection refused");
        }
        replies.remove(0)
    }
}

pub fn test_state(config: LevelupConfig, generator: Arc<dyn TextGenerator>) -> SharedState {
    build_state(test_db(), config, generator)
}

/// Send one request through the REST router and decode the JSON reply.
pub async fn call(
    state: &SharedState,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = api::router(Arc::clone(state)).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, headers, json)
}
