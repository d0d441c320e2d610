use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::progression::RewardPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LevelupConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub progression: ProgressionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub fast_model: String,
    pub balanced_model: String,
    pub creative_model: String,
    pub analytical_model: String,
    pub cache_ttl_secs: u64,
    /// Minimum gap between two generation requests that produce AI tasks.
    pub generation_cooldown_secs: u64,
    pub max_suggestions: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ProgressionConfig {
    pub reward_policy: RewardPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_levelup_dir()
            .join("levelup.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            timeout_secs: 20,
            fast_model: "llama3.2:1b".into(),
            balanced_model: "llama3.2:3b".into(),
            creative_model: "gemma2:2b".into(),
            analytical_model: "llama3.2:3b".into(),
            cache_ttl_secs: 300,
            generation_cooldown_secs: 60,
            max_suggestions: 3,
        }
    }
}

/// Returns `~/.levelup/`
pub fn default_levelup_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".levelup")
}

/// Returns the default config file path: `~/.levelup/config.toml`
pub fn default_config_path() -> PathBuf {
    default_levelup_dir().join("config.toml")
}

impl LevelupConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            LevelupConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (LEVELUP_DB, LEVELUP_LOG_LEVEL, LEVELUP_PORT, LEVELUP_OLLAMA_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LEVELUP_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("LEVELUP_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("LEVELUP_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid LEVELUP_PORT"),
            }
        }
        if let Ok(val) = std::env::var("LEVELUP_OLLAMA_URL") {
            self.llm.base_url = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LevelupConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.max_suggestions, 3);
        assert_eq!(config.progression.reward_policy, RewardPolicy::Ranged);
        assert!(config.storage.db_path.ends_with("levelup.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9100

[llm]
creative_model = "mistral:7b"
generation_cooldown_secs = 0

[progression]
reward_policy = "multiplier"
"#;
        let config: LevelupConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.llm.creative_model, "mistral:7b");
        assert_eq!(config.llm.generation_cooldown_secs, 0);
        assert_eq!(config.progression.reward_policy, RewardPolicy::Multiplier);
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.fast_model, "llama3.2:1b");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = LevelupConfig::default();
        std::env::set_var("LEVELUP_DB", "/tmp/override.db");
        std::env::set_var("LEVELUP_LOG_LEVEL", "trace");
        std::env::set_var("LEVELUP_PORT", "not-a-port");
        std::env::set_var("LEVELUP_OLLAMA_URL", "http://gpu-box:11434");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.base_url, "http://gpu-box:11434");

        // Clean up
        std::env::remove_var("LEVELUP_DB");
        std::env::remove_var("LEVELUP_LOG_LEVEL");
        std::env::remove_var("LEVELUP_PORT");
        std::env::remove_var("LEVELUP_OLLAMA_URL");
    }
}
