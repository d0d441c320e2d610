//! Text generation backends for task suggestions.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::LlmConfig;

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
}

/// Anything that turns a prompt into free-form text.
///
/// The suggestion pipeline never trusts the output: whatever comes back goes
/// through [`super::parse::parse_suggestions`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Sampling options sent with every Ollama request.
#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    num_ctx: u32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Client for a local Ollama runtime (`POST /api/generate`, non-streaming).
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `true` if the runtime answers on `/api/tags`.
    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = OllamaGenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                top_k: 40,
                top_p: 0.9,
                num_ctx: 2048,
                num_predict: 250,
            },
        };

        tracing::debug!(model = %request.model, prompt_len = request.prompt.len(), "sending generate request");
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to model {} failed", request.model))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "model {} request failed: {}",
                request.model,
                response.status()
            ));
        }

        let json: serde_json::Value = response.json().await?;
        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_is_non_streaming() {
        let body = OllamaGenerateBody {
            model: "llama3.2:3b",
            prompt: "hi",
            stream: false,
            options: OllamaOptions {
                temperature: 0.6,
                top_k: 40,
                top_p: 0.9,
                num_ctx: 2048,
                num_predict: 250,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 250);
        assert_eq!(json["model"], "llama3.2:3b");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/".into(),
            ..Default::default()
        };
        let generator = OllamaGenerator::new(&config).unwrap();
        assert_eq!(generator.base_url, "http://localhost:11434");
    }
}
