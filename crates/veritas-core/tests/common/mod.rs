//! Scripted providers and search backends shared by integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use veritas_core::llm::{OutputMode, ProviderAdapter, ProviderRegistry, ToolSpec};
use veritas_core::{ProviderId, Result, SearchBackend, SearchResults, VeritasError};

enum Reply {
    Text(String),
    Fail(String),
    Reject(String),
}

pub struct MockAdapter {
    id: ProviderId,
    reply: Reply,
    delay: Duration,
    tool_delay: Duration,
    queries: Option<Value>,
    calls: AtomicUsize,
    tool_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockAdapter {
    pub fn ok(id: ProviderId, text: &str) -> Self {
        Self::build(id, Reply::Text(text.to_string()))
    }

    pub fn failing(id: ProviderId, reason: &str) -> Self {
        Self::build(id, Reply::Fail(reason.to_string()))
    }

    /// Fails every call the way a backend refusing the request format does
    pub fn rejecting(id: ProviderId, reason: &str) -> Self {
        Self::build(id, Reply::Reject(reason.to_string()))
    }

    fn build(id: ProviderId, reply: Reply) -> Self {
        Self {
            id,
            reply,
            delay: Duration::ZERO,
            tool_delay: Duration::ZERO,
            queries: None,
            calls: AtomicUsize::new(0),
            tool_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay before answering planning calls
    pub fn with_tool_delay(mut self, delay: Duration) -> Self {
        self.tool_delay = delay;
        self
    }

    /// Make the adapter tool-capable, answering planning calls with `queries`
    pub fn with_queries(mut self, queries: &[&str]) -> Self {
        self.queries = Some(json!({ "queries": queries }));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tool_calls(&self) -> usize {
        self.tool_calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    fn supports_tools(&self) -> bool {
        self.queries.is_some()
    }

    async fn complete(&self, prompt: &str, _mode: OutputMode) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(reason) => Err(VeritasError::provider(self.id, reason)),
            Reply::Reject(reason) => Err(VeritasError::rejected(self.id, reason)),
        }
    }

    async fn call_tool(&self, _prompt: &str, _tool: &ToolSpec) -> Result<Value> {
        self.tool_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.tool_delay).await;
        self.queries
            .clone()
            .ok_or_else(|| VeritasError::provider(self.id, "no tools"))
    }
}

pub fn registry(adapters: &[Arc<MockAdapter>]) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::with_adapters(
        adapters
            .iter()
            .map(|a| Arc::clone(a) as Arc<dyn ProviderAdapter>)
            .collect(),
    ))
}

pub struct MockSearch {
    results: std::result::Result<SearchResults, String>,
    seen: Mutex<Vec<Vec<String>>>,
}

impl MockSearch {
    pub fn ok(results: SearchResults) -> Self {
        Self {
            results: Ok(results),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            results: Err(reason.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<Vec<String>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, queries: &[String]) -> Result<SearchResults> {
        self.seen.lock().unwrap().push(queries.to_vec());
        self.results.clone().map_err(VeritasError::Search)
    }
}
