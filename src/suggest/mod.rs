//! AI task suggestions.
//!
//! A [`Suggester`] builds a prompt from the user's goals and learned patterns,
//! asks a [`TextGenerator`] for a JSON list of tasks, and stores whatever survives
//! [`parse::parse_suggestions`] as AI-sourced tasks. Model failures never reach
//! the caller; they degrade to a canned fallback proposal.

pub mod cache;
pub mod feedback;
pub mod generator;
pub mod parse;
pub mod prompt;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::db::{with_conn, SharedDb};
use crate::error::{Result, TrackerError};
use crate::progression::{Category, Frequency, RewardPolicy};
use crate::tracker::tasks::{create_tasks, latest_ai_task_since};
use crate::tracker::types::{Task, TaskSource};

pub use cache::SuggestionCache;
pub use generator::{GenerationRequest, OllamaGenerator, TextGenerator};
pub use parse::{parse_suggestions, Suggestions, TaskProposal};
use prompt::ModelTier;

/// Hard ceiling on proposals per request, whatever the caller asks for.
pub const MAX_SUGGESTIONS_CEILING: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub goals: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    /// Defaults to the configured `max_suggestions`.
    #[serde(default)]
    pub count: Option<usize>,
}

fn default_frequency() -> Frequency {
    Frequency::Daily
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub tasks: Vec<Task>,
    pub used_fallback: bool,
    pub cached: bool,
    /// Model that produced the proposals; `None` for the canned fallback.
    pub model: Option<String>,
}

/// Owns the generator, the cache, and the knobs of the suggestion flow.
pub struct Suggester {
    generator: Arc<dyn TextGenerator>,
    cache: SuggestionCache,
    config: LlmConfig,
    policy: RewardPolicy,
}

impl Suggester {
    pub fn new(generator: Arc<dyn TextGenerator>, config: LlmConfig, policy: RewardPolicy) -> Self {
        Self {
            generator,
            cache: SuggestionCache::new(Duration::from_secs(config.cache_ttl_secs)),
            config,
            policy,
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    /// Generate proposals and persist them as AI-sourced tasks.
    pub async fn generate(&self, db: &SharedDb, request: GenerateRequest) -> Result<GenerationOutcome> {
        let goals = prompt::clean_goals(&request.goals);
        if goals.is_empty() {
            return Err(TrackerError::invalid("goals must not be empty"));
        }
        let count = request
            .count
            .unwrap_or(self.config.max_suggestions)
            .clamp(1, MAX_SUGGESTIONS_CEILING);
        let category = request.category;
        let frequency = request.frequency;
        let cooldown = self.config.generation_cooldown_secs;

        let patterns = with_conn(db, move |conn| {
            check_cooldown(conn, cooldown, Utc::now())?;
            feedback::learned_patterns(conn, category)
        })
        .await?;

        let prompt_text = prompt::build_prompt(&goals, category, frequency, count, &patterns);
        let (suggestions, model, cached) = self.propose(&prompt_text, category, frequency, count).await;
        let used_fallback = suggestions.is_fallback();

        let new_tasks: Vec<_> = suggestions.proposals().iter().map(TaskProposal::to_new_task).collect();
        let policy = self.policy;
        let tasks = with_conn(db, move |conn| {
            // a concurrent request may have stored tasks while the model was running
            check_cooldown(conn, cooldown, Utc::now())?;
            create_tasks(conn, &new_tasks, TaskSource::Ai, policy)
        })
        .await?;

        tracing::info!(
            created = tasks.len(),
            used_fallback,
            cached,
            model = model.as_deref().unwrap_or("fallback"),
            "suggestions stored"
        );
        Ok(GenerationOutcome {
            tasks,
            used_fallback,
            cached,
            model,
        })
    }

    /// Ask the category's model, then the fast model, then fall back.
    async fn propose(
        &self,
        prompt_text: &str,
        category: Category,
        frequency: Frequency,
        count: usize,
    ) -> (Suggestions, Option<String>, bool) {
        let primary = ModelTier::for_category(category);
        let mut tiers = vec![primary];
        if primary != ModelTier::Fast {
            tiers.push(ModelTier::Fast);
        }

        for tier in tiers {
            let model = tier.model_name(&self.config).to_string();
            let key = SuggestionCache::signature(&model, prompt_text);
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(model = %model, "suggestion cache hit");
                return (Suggestions::Parsed(hit), Some(model), true);
            }

            let request = GenerationRequest {
                model: model.clone(),
                prompt: prompt_text.to_string(),
                temperature: prompt::temperature_for(category),
            };
            match self.generator.generate(&request).await {
                Ok(text) => match parse_suggestions(&text, category, frequency, count) {
                    Suggestions::Parsed(proposals) => {
                        self.cache.insert(key, proposals.clone());
                        return (Suggestions::Parsed(proposals), Some(model), false);
                    }
                    Suggestions::Fallback(_) => {
                        tracing::warn!(model = %model, "model output unusable");
                    }
                },
                Err(e) => tracing::warn!(model = %model, error = %e, "generation failed"),
            }
        }

        (
            Suggestions::Fallback(parse::fallback_proposals(category, frequency)),
            None,
            false,
        )
    }
}

/// Reject generation while an AI task created less than `cooldown_secs` ago exists.
pub(crate) fn check_cooldown(conn: &Connection, cooldown_secs: u64, now: DateTime<Utc>) -> Result<()> {
    if cooldown_secs == 0 {
        return Ok(());
    }
    let window = chrono::Duration::seconds(cooldown_secs as i64);
    let Some(latest) = latest_ai_task_since(conn, now - window)? else {
        return Ok(());
    };
    let elapsed = DateTime::parse_from_rfc3339(&latest)
        .map(|t| now.signed_duration_since(t.with_timezone(&Utc)))
        .unwrap_or_else(|_| chrono::Duration::zero());
    let remaining = (window - elapsed).num_seconds().max(1) as u64;
    Err(TrackerError::RateLimited {
        retry_after_secs: remaining.min(cooldown_secs),
    })
}
