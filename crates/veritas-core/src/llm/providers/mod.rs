//! HTTP adapters for the supported LLM backends
//!
//! - `OpenAiCompatibleAdapter`: OpenAI, DeepSeek and the Hugging Face router
//! - `GeminiAdapter`: Google Generative Language API
//! - `ClaudeAdapter`: Anthropic Messages API

mod claude;
mod gemini;
mod openai;

pub use claude::ClaudeAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiCompatibleAdapter;

use crate::error::{Result, VeritasError};
use crate::model::ProviderId;
use serde::de::DeserializeOwned;

/// Send a request and decode the JSON body, mapping every failure to a provider error
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            VeritasError::provider(provider, "request timed out")
        } else {
            VeritasError::provider(provider, format!("transport error: {}", e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(provider, status, &body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| VeritasError::provider(provider, format!("malformed response body: {}", e)))
}

fn status_error(provider: ProviderId, status: reqwest::StatusCode, body: &str) -> VeritasError {
    let cause = describe_status(status, body);
    match status.as_u16() {
        400 | 422 => VeritasError::rejected(provider, cause),
        _ => VeritasError::provider(provider, cause),
    }
}

fn describe_status(status: reqwest::StatusCode, body: &str) -> String {
    let kind = match status.as_u16() {
        401 | 403 => "authentication failed",
        429 => "rate limited",
        400 | 422 => "request rejected",
        500..=599 => "server error",
        _ => "unexpected status",
    };
    format!(
        "{} (HTTP {}): {}",
        kind,
        status.as_u16(),
        crate::llm::extractor::preview(body)
    )
}

/// Trim a trailing slash so paths can be appended with `format!`
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_status() {
        let msg = describe_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "quota exceeded");
        assert_eq!(msg, "rate limited (HTTP 429): quota exceeded");

        let long = "x".repeat(5000);
        let msg = describe_status(reqwest::StatusCode::UNAUTHORIZED, &long);
        assert!(msg.starts_with("authentication failed (HTTP 401)"));
        assert!(msg.len() < 400);
    }

    #[test]
    fn test_only_bad_request_is_a_rejection() {
        let err = status_error(ProviderId::OpenAi, reqwest::StatusCode::BAD_REQUEST, "bad format");
        assert!(err.is_rejected_request());
        let err = status_error(
            ProviderId::OpenAi,
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            "schema",
        );
        assert!(err.is_rejected_request());

        for status in [
            reqwest::StatusCode::UNAUTHORIZED,
            reqwest::StatusCode::FORBIDDEN,
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            reqwest::StatusCode::BAD_GATEWAY,
        ] {
            assert!(!status_error(ProviderId::OpenAi, status, "").is_rejected_request());
        }
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://api.x/v1/"), "https://api.x/v1");
    }
}
