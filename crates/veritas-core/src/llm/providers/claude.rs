//! Anthropic Claude adapter (Messages API)
//!
//! The Messages API has no JSON mode. Structured mode prefills the
//! assistant turn with `{` so the model continues a JSON object; the prefill
//! is prepended back to the returned text.

use super::{normalize_base_url, send_json};
use crate::config::ProviderConfig;
use crate::error::{Result, VeritasError};
use crate::llm::prompts::{CLASSIFIER_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT};
use crate::llm::{OutputMode, ProviderAdapter, ToolSpec};
use crate::model::ProviderId;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";
const JSON_PREFILL: &str = "{";

pub struct ClaudeAdapter {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

impl ClaudeAdapter {
    pub fn new(http_client: reqwest::Client, api_key: impl Into<String>, config: &ProviderConfig) -> Self {
        Self {
            http_client,
            base_url: normalize_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
            api_key: api_key.into(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn completion_body(&self, prompt: &str, mode: OutputMode) -> Value {
        let mut messages = vec![json!({ "role": "user", "content": prompt })];
        if mode == OutputMode::Structured {
            messages.push(json!({ "role": "assistant", "content": JSON_PREFILL }));
        }
        json!({
            "model": self.model,
            "max_tokens": 1024,
            "temperature": 0.2,
            "system": CLASSIFIER_SYSTEM_PROMPT,
            "messages": messages,
        })
    }

    fn tool_body(&self, prompt: &str, tool: &ToolSpec) -> Value {
        json!({
            "model": self.model,
            "max_tokens": 512,
            "system": PLANNER_SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": prompt }],
            "tools": [{
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.parameters,
            }],
            "tool_choice": { "type": "tool", "name": tool.name },
        })
    }

    async fn post(&self, body: &Value) -> Result<Vec<ContentBlock>> {
        let url = format!("{}/messages", self.base_url);
        let request = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body);
        let response: MessagesResponse = send_json(ProviderId::Claude, request).await?;
        Ok(response.content)
    }
}

fn joined_text(blocks: Vec<ContentBlock>) -> String {
    blocks
        .into_iter()
        .filter_map(|b| match b {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str, mode: OutputMode) -> Result<String> {
        let blocks = self.post(&self.completion_body(prompt, mode)).await?;
        let text = joined_text(blocks);
        if text.trim().is_empty() {
            return Err(VeritasError::provider(ProviderId::Claude, "empty completion"));
        }
        Ok(match mode {
            OutputMode::Structured => format!("{}{}", JSON_PREFILL, text),
            OutputMode::FreeText => text,
        })
    }

    async fn call_tool(&self, prompt: &str, tool: &ToolSpec) -> Result<Value> {
        let blocks = self.post(&self.tool_body(prompt, tool)).await?;
        blocks
            .into_iter()
            .find_map(|b| match b {
                ContentBlock::ToolUse { name, input } if name == tool.name => Some(input),
                _ => None,
            })
            .ok_or_else(|| VeritasError::provider(ProviderId::Claude, "model did not call the tool"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> ClaudeAdapter {
        ClaudeAdapter::new(reqwest::Client::new(), "key", &ProviderConfig::default())
    }

    #[test]
    fn test_structured_body_prefills_json() {
        let body = adapter().completion_body("texto", OutputMode::Structured);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "{");

        let free = adapter().completion_body("texto", OutputMode::FreeText);
        assert_eq!(free["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_tool_body() {
        let tool = crate::llm::prompts::search_query_tool();
        let body = adapter().tool_body("texto", &tool);
        assert_eq!(body["tool_choice"]["type"], "tool");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_content_block_parsing() {
        let raw = r#"{"content":[
            {"type":"text","text":"Vou registrar as consultas."},
            {"type":"tool_use","id":"tu_1","name":"generate_search_queries","input":{"queries":["a","b"]}},
            {"type":"thinking","thinking":"..."}
        ]}"#;
        let response: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.content.len(), 3);
        assert!(matches!(response.content[2], ContentBlock::Other));
        assert_eq!(joined_text(response.content), "Vou registrar as consultas.");
    }
}
