//! Provider adapter trait

use crate::error::{Result, VeritasError};
use crate::model::ProviderId;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Output shape requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// JSON mode / response schema when the backend supports one
    Structured,
    /// Plain generation; the extractor has to find the JSON
    FreeText,
}

/// Function-style tool the model is forced to call
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments
    pub parameters: Value,
}

/// Uniform contract over every LLM backend
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which backend this adapter talks to
    fn id(&self) -> ProviderId;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Whether `call_tool` is implemented for this backend
    fn supports_tools(&self) -> bool {
        false
    }

    /// Send one prompt and return the raw text answer
    async fn complete(&self, prompt: &str, mode: OutputMode) -> Result<String>;

    /// Force a call of `tool` and return its JSON arguments
    async fn call_tool(&self, _prompt: &str, _tool: &ToolSpec) -> Result<Value> {
        Err(VeritasError::provider(
            self.id(),
            "tool calls are not supported by this provider",
        ))
    }

    /// Classification call: structured output first, one free-text retry
    /// when the backend rejected the structured request
    async fn classify(&self, prompt: &str) -> Result<String> {
        match self.complete(prompt, OutputMode::Structured).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_rejected_request() => {
                tracing::warn!(
                    provider = %self.id(),
                    error = %e,
                    "Structured output failed, retrying in free-text mode"
                );
                self.complete(prompt, OutputMode::FreeText).await
            }
            Err(e) => Err(e),
        }
    }
}
