//! OpenAI-compatible chat completions adapter
//!
//! Serves OpenAI itself, DeepSeek and the Hugging Face inference router,
//! which all speak the `/chat/completions` dialect.

use super::{normalize_base_url, send_json};
use crate::config::ProviderConfig;
use crate::error::{Result, VeritasError};
use crate::llm::prompts::CLASSIFIER_SYSTEM_PROMPT;
use crate::llm::{OutputMode, ProviderAdapter, ToolSpec};
use crate::model::ProviderId;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Adapter for any OpenAI-compatible endpoint
pub struct OpenAiCompatibleAdapter {
    id: ProviderId,
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

impl OpenAiCompatibleAdapter {
    /// Create an adapter; `id` must be one of the OpenAI-compatible providers
    pub fn new(
        id: ProviderId,
        http_client: reqwest::Client,
        api_key: impl Into<String>,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let (default_url, default_model) = match id {
            ProviderId::OpenAi => ("https://api.openai.com/v1", "gpt-4o-mini"),
            ProviderId::DeepSeek => ("https://api.deepseek.com/v1", "deepseek-chat"),
            ProviderId::HuggingFace => (
                "https://router.huggingface.co/v1",
                "mistralai/Mistral-7B-Instruct-v0.2",
            ),
            ProviderId::Gemini | ProviderId::Claude => {
                return Err(VeritasError::Config(format!(
                    "{} does not use the OpenAI-compatible API",
                    id
                )))
            }
        };

        Ok(Self {
            id,
            http_client,
            base_url: normalize_base_url(config.base_url.as_deref().unwrap_or(default_url)),
            api_key: api_key.into(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
        })
    }

    fn completion_body(&self, prompt: &str, mode: OutputMode) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": CLASSIFIER_SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.2,
            "max_tokens": 1024,
        });
        if mode == OutputMode::Structured {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    fn tool_body(&self, prompt: &str, tool: &ToolSpec) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": crate::llm::prompts::PLANNER_SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.0,
            "tools": [{
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                }
            }],
            "tool_choice": { "type": "function", "function": { "name": tool.name } },
        })
    }

    async fn post(&self, body: &Value) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body);
        send_json(self.id, request).await
    }
}

fn first_message(id: ProviderId, response: ChatResponse) -> Result<ResponseMessage> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| VeritasError::provider(id, "response contained no choices"))
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn supports_tools(&self) -> bool {
        // Tool use on the HF router depends on the hosted model
        !matches!(self.id, ProviderId::HuggingFace)
    }

    async fn complete(&self, prompt: &str, mode: OutputMode) -> Result<String> {
        let response = self.post(&self.completion_body(prompt, mode)).await?;
        first_message(self.id, response)?
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| VeritasError::provider(self.id, "empty completion"))
    }

    async fn call_tool(&self, prompt: &str, tool: &ToolSpec) -> Result<Value> {
        let response = self.post(&self.tool_body(prompt, tool)).await?;
        let message = first_message(self.id, response)?;
        let call = message
            .tool_calls
            .into_iter()
            .find(|c| c.function.name == tool.name)
            .ok_or_else(|| VeritasError::provider(self.id, "model did not call the tool"))?;
        serde_json::from_str(&call.function.arguments).map_err(|e| {
            VeritasError::provider(self.id, format!("invalid tool arguments: {}", e))
        })
    }
}
