//! Google Gemini adapter (Generative Language API, `generateContent`)

use super::{normalize_base_url, send_json};
use crate::config::ProviderConfig;
use crate::error::{Result, VeritasError};
use crate::llm::prompts::{CLASSIFIER_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT};
use crate::llm::{OutputMode, ProviderAdapter, ToolSpec};
use crate::model::{Category, ProviderId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiAdapter {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

impl GeminiAdapter {
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

    fn endpoint(&self) -> String {
        // Accept both "gemini-1.5-pro" and "models/gemini-1.5-pro"
        let model = self.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn completion_body(&self, prompt: &str, mode: OutputMode) -> Value {
        let mut generation_config = json!({ "temperature": 0.2, "maxOutputTokens": 1024 });
        if mode == OutputMode::Structured {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = classification_schema();
        }
        json!({
            "systemInstruction": { "parts": [{ "text": CLASSIFIER_SYSTEM_PROMPT }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        })
    }

    fn tool_body(&self, prompt: &str, tool: &ToolSpec) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": PLANNER_SYSTEM_PROMPT }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "tools": [{
                "functionDeclarations": [{
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                }]
            }],
            "toolConfig": {
                "functionCallingConfig": { "mode": "ANY", "allowedFunctionNames": [tool.name] }
            },
        })
    }

    async fn post(&self, body: &Value) -> Result<Vec<Part>> {
        let request = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body);
        let response: GenerateResponse = send_json(ProviderId::Gemini, request).await?;
        candidate_parts(response)
    }
}

/// Response schema enforcing the classification shape
fn classification_schema() -> Value {
    let labels: Vec<&str> = Category::SUBSTANTIVE.iter().map(Category::as_str).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "classification": { "type": "STRING", "enum": labels },
            "message": { "type": "STRING" },
            "sources": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["classification", "message"]
    })
}

fn candidate_parts(response: GenerateResponse) -> Result<Vec<Part>> {
    let candidate = match response.candidates.into_iter().next() {
        Some(c) => c,
        None => {
            // No candidates means the prompt itself was blocked
            let reason = response
                .prompt_feedback
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(VeritasError::provider(ProviderId::Gemini, reason));
        }
    };

    match candidate.content {
        Some(content) if !content.parts.is_empty() => Ok(content.parts),
        _ => Err(VeritasError::provider(
            ProviderId::Gemini,
            format!(
                "empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        )),
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str, mode: OutputMode) -> Result<String> {
        let parts = self.post(&self.completion_body(prompt, mode)).await?;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            return Err(VeritasError::provider(ProviderId::Gemini, "empty completion"));
        }
        Ok(text)
    }

    async fn call_tool(&self, prompt: &str, tool: &ToolSpec) -> Result<Value> {
        let parts = self.post(&self.tool_body(prompt, tool)).await?;
        parts
            .into_iter()
            .filter_map(|p| p.function_call)
            .find(|call| call.name == tool.name)
            .map(|call| call.args)
            .ok_or_else(|| VeritasError::provider(ProviderId::Gemini, "model did not call the tool"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(model: Option<&str>) -> GeminiAdapter {
        let config = ProviderConfig {
            model: model.map(String::from),
            ..Default::default()
        };
        GeminiAdapter::new(reqwest::Client::new(), "key", &config)
    }

    #[test]
    fn test_endpoint_accepts_prefixed_model() {
        assert_eq!(
            adapter(Some("models/gemini-1.5-pro")).endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert!(adapter(None).endpoint().contains("gemini-1.5-flash"));
    }

    #[test]
    fn test_structured_body_has_schema() {
        let body = adapter(None).completion_body("texto", OutputMode::Structured);
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        let labels = config["responseSchema"]["properties"]["classification"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(labels.len(), 6);
        assert!(!labels.iter().any(|l| l == "error"));

        let free = adapter(None).completion_body("texto", OutputMode::FreeText);
        assert!(free["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_tool_body_forces_function() {
        let tool = crate::llm::prompts::search_query_tool();
        let body = adapter(None).tool_body("texto", &tool);
        assert_eq!(body["toolConfig"]["functionCallingConfig"]["mode"], "ANY");
        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], tool.name);
    }

    #[test]
    fn test_candidate_parsing() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"classification\":"},{"text":"\"verdadeiro\"}"}]},"finishReason":"STOP"}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = candidate_parts(response)
            .unwrap()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        assert_eq!(text, r#"{"classification":"verdadeiro"}"#);
    }

    #[test]
    fn test_blocked_prompt_is_provider_error() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let err = candidate_parts(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_function_call_parsing() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"functionCall":{"name":"generate_search_queries","args":{"queries":["vacinas autismo estudo"]}}}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let parts = candidate_parts(response).unwrap();
        let call = parts[0].function_call.as_ref().unwrap();
        assert_eq!(call.args["queries"][0], "vacinas autismo estudo");
    }
}
