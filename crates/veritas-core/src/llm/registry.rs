//! Provider registry
//!
//! Built once at startup and shared read-only. Registration order is the
//! fallback priority.

use super::providers::{ClaudeAdapter, GeminiAdapter, OpenAiCompatibleAdapter};
use super::ProviderAdapter;
use crate::config::Config;
use crate::error::{Result, VeritasError};
use crate::model::ProviderId;
use std::sync::Arc;
use std::time::Duration;

/// Enabled provider adapters in priority order
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit adapters; the first adapter per id wins
    pub fn with_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        let mut registry = Self::new();
        for adapter in adapters {
            registry.register(adapter);
        }
        registry
    }

    /// Append an adapter at the lowest priority; duplicates are ignored
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        if self.get(adapter.id()).is_some() {
            tracing::warn!(provider = %adapter.id(), "Provider already registered, ignoring");
            return;
        }
        self.adapters.push(adapter);
    }

    /// Build HTTP adapters for every provider with credentials
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.classifier.provider_timeout_secs))
            .build()
            .map_err(VeritasError::Http)?;

        let mut registry = Self::new();
        for id in config.enabled_providers() {
            let provider_config = config.providers.get(&id).cloned().unwrap_or_default();
            let api_key = provider_config.api_key.clone().unwrap_or_default();
            let client = http_client.clone();

            let adapter: Arc<dyn ProviderAdapter> = match id {
                ProviderId::Gemini => Arc::new(GeminiAdapter::new(client, api_key, &provider_config)),
                ProviderId::Claude => Arc::new(ClaudeAdapter::new(client, api_key, &provider_config)),
                ProviderId::OpenAi | ProviderId::HuggingFace | ProviderId::DeepSeek => Arc::new(
                    OpenAiCompatibleAdapter::new(id, client, api_key, &provider_config)?,
                ),
            };

            tracing::info!(provider = %id, model = adapter.model_name(), "Provider enabled");
            registry.register(adapter);
        }

        if registry.is_empty() {
            tracing::warn!("No LLM provider has credentials configured");
        }

        Ok(registry)
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Enabled providers in priority order
    pub fn enabled(&self) -> Vec<ProviderId> {
        self.adapters.iter().map(|a| a.id()).collect()
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.iter().find(|a| a.id() == id).cloned()
    }

    /// Preferred provider first (when enabled), then the rest in priority order
    pub fn fallback_order(&self, preferred: ProviderId) -> Vec<ProviderId> {
        let mut order = Vec::with_capacity(self.adapters.len());
        if self.get(preferred).is_some() {
            order.push(preferred);
        }
        order.extend(self.enabled().into_iter().filter(|id| *id != preferred));
        order
    }

    /// Adapters able to answer tool calls, in priority order
    pub fn tool_capable(&self) -> Vec<Arc<dyn ProviderAdapter>> {
        self.adapters
            .iter()
            .filter(|a| a.supports_tools())
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.enabled())
            .finish()
    }
}
