//! Configuration management
//!
//! Configuration is read once at startup from a YAML file, then environment
//! variables override individual values. The resulting snapshot is
//! read-only for the lifetime of the process.

use crate::error::{Result, VeritasError};
use crate::model::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at an explicit config file
pub const ENV_CONFIG_PATH: &str = "VERITAS_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Per-provider credentials and models, keyed by provider id
    #[serde(default)]
    pub providers: BTreeMap<ProviderId, ProviderConfig>,

    /// Web search backend used to gather evidence
    #[serde(default)]
    pub search: Option<SearchConfig>,
}

/// Orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Provider tried first when a request does not name one
    #[serde(default = "default_provider")]
    pub default_provider: ProviderId,

    /// Budget for the whole classify-with-fallback operation
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Budget for a single provider or search call
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Ask a provider for search queries before classifying
    #[serde(default = "default_true")]
    pub query_planning: bool,

    /// Accept a bare category keyword when a reply carries no JSON
    #[serde(default)]
    pub lenient_extraction: bool,

    /// Fallback priority; providers missing here are appended in default order
    #[serde(default = "default_priority")]
    pub priority: Vec<ProviderId>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            request_timeout_secs: default_request_timeout(),
            provider_timeout_secs: default_provider_timeout(),
            query_planning: true,
            lenient_extraction: false,
            priority: default_priority(),
        }
    }
}

impl ClassifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Complete priority list: configured order first, no duplicates
    pub fn effective_priority(&self) -> Vec<ProviderId> {
        let mut order: Vec<ProviderId> = Vec::with_capacity(ProviderId::ALL.len());
        for id in self.priority.iter().chain(ProviderId::ALL.iter()) {
            if !order.contains(id) {
                order.push(*id);
            }
        }
        order
    }
}

fn default_provider() -> ProviderId {
    ProviderId::Gemini
}

fn default_request_timeout() -> u64 {
    90
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_priority() -> Vec<ProviderId> {
    ProviderId::ALL.to_vec()
}

/// Credentials and model for one provider
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    /// API key; a provider without one is disabled
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name (provider default when absent)
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL override, e.g. for a proxy or self-hosted gateway
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Google Programmable Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_key: String,

    /// Programmable Search Engine id (`cx`)
    pub engine_id: String,

    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_results_per_query() -> usize {
    5
}

impl Config {
    /// Load config from `$VERITAS_CONFIG` or the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load config from a YAML file; a missing or empty file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration from file");
        Ok(config)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Apply environment overrides through a lookup function
    ///
    /// Takes a lookup closure so tests can inject variables without touching
    /// the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = [
            (ProviderId::Gemini, "GEMINI_API_KEY"),
            (ProviderId::OpenAi, "OPENAI_API_KEY"),
            (ProviderId::HuggingFace, "HUGGINGFACE_API_KEY"),
            (ProviderId::Claude, "ANTHROPIC_API_KEY"),
            (ProviderId::DeepSeek, "DEEPSEEK_API_KEY"),
        ];
        for (id, var) in keys {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                self.providers.entry(id).or_default().api_key = Some(key);
            }
        }

        if let Some(model) = lookup("HUGGINGFACE_MODEL_ID") {
            self.providers
                .entry(ProviderId::HuggingFace)
                .or_default()
                .model = Some(model);
        }

        if let Some(provider) = lookup("VERITAS_DEFAULT_PROVIDER") {
            match provider.parse() {
                Ok(id) => self.classifier.default_provider = id,
                Err(e) => tracing::warn!(error = %e, "Ignoring VERITAS_DEFAULT_PROVIDER"),
            }
        }

        if let Some(secs) = lookup("VERITAS_REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.classifier.request_timeout_secs = secs;
        }

        if let (Some(api_key), Some(engine_id)) = (
            lookup("GOOGLE_SEARCH_API_KEY"),
            lookup("GOOGLE_SEARCH_ENGINE_ID"),
        ) {
            let results_per_query = self
                .search
                .as_ref()
                .map(|s| s.results_per_query)
                .unwrap_or_else(default_results_per_query);
            self.search = Some(SearchConfig {
                api_key,
                engine_id,
                results_per_query,
                base_url: self.search.as_ref().and_then(|s| s.base_url.clone()),
            });
        }
    }

    /// Reject settings that cannot work at all
    pub fn validate(&self) -> Result<()> {
        if self.classifier.request_timeout_secs == 0 {
            return Err(VeritasError::Config(
                "classifier.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.classifier.provider_timeout_secs == 0 {
            return Err(VeritasError::Config(
                "classifier.provider_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Providers with credentials, in fallback priority order
    pub fn enabled_providers(&self) -> Vec<ProviderId> {
        self.classifier
            .effective_priority()
            .into_iter()
            .filter(|id| self.providers.get(id).is_some_and(ProviderConfig::is_enabled))
            .collect()
    }

    /// Database path from `$VERITAS_DB` or the default location
    pub fn database_path() -> PathBuf {
        std::env::var("VERITAS_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::db::Database::default_path())
    }
}
