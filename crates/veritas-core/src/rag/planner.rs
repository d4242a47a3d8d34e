//! Search query planning
//!
//! Asks a tool-capable provider to decompose the content into a few web
//! search queries. Planning is an enhancement: it never fails, it returns
//! an empty set with a note instead.

use crate::error::{Result, VeritasError};
use crate::llm::prompts::{build_planning_prompt, search_query_tool};
use crate::llm::ProviderRegistry;
use crate::model::{ProviderId, SearchQuerySet};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Result of a planning run
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub queries: SearchQuerySet,
    /// Provider whose queries were accepted
    pub provider: Option<ProviderId>,
    /// Diagnostic for the caller to log when planning degraded
    pub note: Option<String>,
}

/// LLM-backed query planner
pub struct QueryPlanner {
    registry: Arc<ProviderRegistry>,
    call_timeout: Duration,
}

impl QueryPlanner {
    pub fn new(registry: Arc<ProviderRegistry>, call_timeout: Duration) -> Self {
        Self {
            registry,
            call_timeout,
        }
    }

    /// Plan search queries for `content`
    pub async fn plan(&self, content: &str) -> PlanOutcome {
        let mut outcome = PlanOutcome::default();
        self.plan_into(content, &mut outcome).await;
        outcome
    }

    /// Plan into `outcome`, updating its note after every failed provider.
    ///
    /// A caller that cancels this future mid-way keeps the failures seen so
    /// far.
    pub async fn plan_into(&self, content: &str, outcome: &mut PlanOutcome) {
        let candidates = self.registry.tool_capable();
        if candidates.is_empty() {
            outcome.note = Some("no provider supports tool calls".to_string());
            return;
        }

        let prompt = build_planning_prompt(content);
        let tool = search_query_tool();
        let mut failures = Vec::new();

        for adapter in candidates {
            let id = adapter.id();
            let result = tokio::time::timeout(self.call_timeout, adapter.call_tool(&prompt, &tool))
                .await
                .map_err(|_| VeritasError::Timeout(self.call_timeout))
                .and_then(|r| r)
                .and_then(|value| parse_queries(&value));

            match result {
                Ok(queries) => {
                    tracing::info!(provider = %id, count = queries.len(), "Search queries planned");
                    outcome.note = queries
                        .is_empty()
                        .then(|| format!("{} returned no queries", id));
                    outcome.queries = queries;
                    outcome.provider = Some(id);
                    return;
                }
                Err(e) => {
                    tracing::warn!(provider = %id, error = %e, "Query planning attempt failed");
                    failures.push(format!("{}: {}", id, e));
                    outcome.note = Some(VeritasError::Planning(failures.join("; ")).to_string());
                }
            }
        }
    }
}

/// Accept `{"queries": [..]}` or a bare array of strings
pub(crate) fn parse_queries(value: &Value) -> Result<SearchQuerySet> {
    let list = value
        .get("queries")
        .unwrap_or(value)
        .as_array()
        .ok_or_else(|| VeritasError::Planning("tool arguments have no 'queries' list".to_string()))?;

    let strings: Vec<&str> = list.iter().filter_map(Value::as_str).collect();
    if strings.len() != list.len() {
        return Err(VeritasError::Planning(
            "'queries' must contain only strings".to_string(),
        ));
    }

    Ok(SearchQuerySet::from_raw(strings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{OutputMode, ProviderAdapter, ToolSpec};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ToolStub {
        id: ProviderId,
        reply: std::result::Result<Value, String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProviderAdapter for ToolStub {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn model_name(&self) -> &str {
            "stub"
        }

        fn supports_tools(&self) -> bool {
            true
        }

        async fn complete(&self, _prompt: &str, _mode: OutputMode) -> Result<String> {
            unreachable!("planner must only use tool calls")
        }

        async fn call_tool(&self, _prompt: &str, tool: &ToolSpec) -> Result<Value> {
            assert_eq!(tool.name, "generate_search_queries");
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.reply
                .clone()
                .map_err(|e| VeritasError::provider(self.id, e))
        }
    }

    fn stub(id: ProviderId, reply: std::result::Result<Value, String>) -> Arc<ToolStub> {
        Arc::new(ToolStub {
            id,
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn planner(stubs: &[Arc<ToolStub>]) -> QueryPlanner {
        let registry = ProviderRegistry::with_adapters(
            stubs
                .iter()
                .map(|s| s.clone() as Arc<dyn ProviderAdapter>)
                .collect(),
        );
        QueryPlanner::new(Arc::new(registry), Duration::from_secs(5))
    }

    #[test]
    fn test_parse_queries_shapes() {
        let set = parse_queries(&json!({"queries": ["a", " b ", "a", "c", "d"]})).unwrap();
        assert_eq!(set.as_slice(), &["a", "b", "c"]);
        assert_eq!(parse_queries(&json!(["x"])).unwrap().len(), 1);
        assert!(parse_queries(&json!({"queries": "a"})).is_err());
        assert!(parse_queries(&json!({"queries": ["a", 1]})).is_err());
        assert!(parse_queries(&json!({"other": []})).is_err());
    }

    #[tokio::test]
    async fn test_first_valid_provider_wins() {
        let first = stub(ProviderId::Gemini, Ok(json!({"queries": ["vacinas autismo"]})));
        let second = stub(ProviderId::OpenAi, Ok(json!({"queries": ["outra"]})));
        let outcome = planner(&[first.clone(), second.clone()]).plan("Vacinas causam autismo").await;

        assert_eq!(outcome.queries.as_slice(), &["vacinas autismo"]);
        assert_eq!(outcome.provider, Some(ProviderId::Gemini));
        assert!(outcome.note.is_none());
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_reply_falls_through() {
        let first = stub(ProviderId::Gemini, Ok(json!({"queries": 42})));
        let second = stub(ProviderId::Claude, Err("HTTP 500".to_string()));
        let third = stub(ProviderId::OpenAi, Ok(json!({"queries": ["q1", "q2"]})));
        let outcome = planner(&[first, second, third]).plan("texto").await;
        assert_eq!(outcome.queries.len(), 2);
        assert_eq!(outcome.provider, Some(ProviderId::OpenAi));
    }

    #[tokio::test]
    async fn test_total_failure_returns_empty_with_note() {
        let first = stub(ProviderId::Gemini, Err("quota".to_string()));
        let outcome = planner(&[first]).plan("texto").await;
        assert!(outcome.queries.is_empty());
        let note = outcome.note.unwrap();
        assert!(note.contains("gemini"));
        assert!(note.contains("quota"));
    }

    #[tokio::test]
    async fn test_no_tool_capable_provider() {
        let outcome = planner(&[]).plan("texto").await;
        assert!(outcome.queries.is_empty());
        assert!(outcome.note.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_planner_times_out() {
        let slow = Arc::new(ToolStub {
            id: ProviderId::Claude,
            reply: Ok(json!({"queries": ["q"]})),
            delay: Duration::from_secs(60),
            calls: AtomicUsize::new(0),
        });
        let outcome = planner(&[slow]).plan("texto").await;
        assert!(outcome.queries.is_empty());
        assert!(outcome.note.unwrap().contains("Timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_plan_keeps_earlier_failures() {
        let broken = stub(ProviderId::Gemini, Err("quota".to_string()));
        let hanging = Arc::new(ToolStub {
            id: ProviderId::OpenAi,
            reply: Ok(json!({"queries": ["q"]})),
            delay: Duration::from_secs(3600),
            calls: AtomicUsize::new(0),
        });
        let planner = planner(&[broken, hanging.clone()]);

        let mut outcome = PlanOutcome::default();
        let finished = tokio::time::timeout(
            Duration::from_secs(1),
            planner.plan_into("texto", &mut outcome),
        )
        .await;

        assert!(finished.is_err());
        assert_eq!(hanging.calls.load(Ordering::SeqCst), 1);
        assert!(outcome.queries.is_empty());
        let note = outcome.note.unwrap();
        assert!(note.contains("gemini: "));
        assert!(note.contains("quota"));
    }
}
