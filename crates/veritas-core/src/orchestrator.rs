//! Fallback orchestration
//!
//! One request flows `Planning -> Searching -> Classifying -> Done`.
//! Providers are tried strictly one after another in registry fallback
//! order; the first attempt yielding a non-error classification ends the
//! chain. Provider failures never escape: exhaustion, misconfiguration and
//! the overall deadline all produce an `error`-classified result.
//!
//! Planning and searching share one evidence budget, a third of the request
//! timeout, so classification always keeps the rest.

use crate::config::{ClassifierConfig, Config};
use crate::error::{Result, VeritasError};
use crate::llm::{extract, extract_lenient, ProviderAdapter, ProviderRegistry};
use crate::llm::prompts::build_classification_prompt;
use crate::model::{
    AttemptOutcome, ClassificationRequest, ClassificationResult, EvidenceBundle, ProviderAttempt,
    ProviderId, SearchQuerySet,
};
use crate::rag::{
    empty_evidence, format_evidence, GoogleSearchBackend, PlanOutcome, QueryPlanner, SearchBackend,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Message reported when no provider is enabled at all
pub const NO_PROVIDERS_MESSAGE: &str = "No LLM providers are configured";

/// Pipeline stage, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Searching,
    Classifying,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Planning => "planning",
            Self::Searching => "searching",
            Self::Classifying => "classifying",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Timeouts and feature switches
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Budget for the whole request
    pub request_timeout: Duration,
    /// Budget for each provider or search call
    pub provider_timeout: Duration,
    /// Run the planning stage when a search backend is present
    pub query_planning: bool,
    /// Fall back to a keyword scan for replies without JSON
    pub lenient_extraction: bool,
}

impl OrchestratorSettings {
    /// Time shared by planning and searching
    pub fn evidence_budget(&self) -> Duration {
        self.request_timeout / 3
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

impl From<&ClassifierConfig> for OrchestratorSettings {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            provider_timeout: config.provider_timeout(),
            query_planning: config.query_planning,
            lenient_extraction: config.lenient_extraction,
        }
    }
}

/// Everything one run produced, for callers that want more than the result
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub result: ClassificationResult,
    /// Provider attempts in the order they were made
    pub attempts: Vec<ProviderAttempt>,
    pub queries: SearchQuerySet,
    pub planning_note: Option<String>,
    pub evidence: Option<EvidenceBundle>,
    pub timed_out: bool,
}

impl ClassificationReport {
    pub fn attempted_providers(&self) -> Vec<ProviderId> {
        self.attempts.iter().map(|a| a.provider).collect()
    }
}

/// Per-run scratch state; lives outside the deadline so it survives cancellation
#[derive(Default)]
struct RunState {
    attempts: Vec<ProviderAttempt>,
    plan: PlanOutcome,
    evidence: Option<EvidenceBundle>,
}

/// Multi-provider classifier with fallback
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    planner: Option<QueryPlanner>,
    search: Option<Arc<dyn SearchBackend>>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Create an orchestrator without a search backend
    pub fn new(registry: Arc<ProviderRegistry>, settings: OrchestratorSettings) -> Self {
        Self {
            registry,
            planner: None,
            search: None,
            settings,
        }
    }

    /// Attach a search backend; enables planning when the settings allow it
    pub fn with_search(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        if self.settings.query_planning {
            self.planner = Some(QueryPlanner::new(
                Arc::clone(&self.registry),
                self.settings.provider_timeout,
            ));
        }
        self.search = Some(backend);
        self
    }

    /// Build registry, search backend and settings from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ProviderRegistry::from_config(config)?);
        let settings = OrchestratorSettings::from(&config.classifier);
        let provider_timeout = settings.provider_timeout;
        let orchestrator = Self::new(registry, settings);

        match &config.search {
            Some(search) => {
                let backend = GoogleSearchBackend::new(search.clone(), provider_timeout)?;
                Ok(orchestrator.with_search(Arc::new(backend)))
            }
            None => {
                tracing::info!("No search backend configured, classifying without evidence");
                Ok(orchestrator)
            }
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Classify content, returning only the final result
    pub async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        self.run(request).await.result
    }

    /// Classify content, returning the result and the attempt history
    pub async fn run(&self, request: &ClassificationRequest) -> ClassificationReport {
        let started = Instant::now();
        let mut state = RunState::default();

        let outcome = tokio::time::timeout(
            self.settings.request_timeout,
            self.run_stages(request, &mut state),
        )
        .await;

        let (result, timed_out) = match outcome {
            Ok(result) => (result, false),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.settings.request_timeout.as_millis() as u64,
                    attempts = state.attempts.len(),
                    "Classification deadline elapsed, cancelling in-flight attempt"
                );
                (timeout_result(self.settings.request_timeout), true)
            }
        };

        tracing::info!(
            stage = %Stage::Done,
            classification = %result.classification,
            attempts = state.attempts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Classification finished"
        );

        ClassificationReport {
            result,
            attempts: state.attempts,
            queries: state.plan.queries,
            planning_note: state.plan.note,
            evidence: state.evidence,
            timed_out,
        }
    }

    async fn run_stages(
        &self,
        request: &ClassificationRequest,
        state: &mut RunState,
    ) -> ClassificationResult {
        if self.registry.is_empty() {
            tracing::warn!("{}", NO_PROVIDERS_MESSAGE);
            return ClassificationResult::error(NO_PROVIDERS_MESSAGE);
        }

        let evidence_deadline = tokio::time::Instant::now() + self.settings.evidence_budget();
        self.plan(request.content(), evidence_deadline, state).await;
        self.gather_evidence(evidence_deadline, state).await;

        let prompt = build_classification_prompt(request.content(), state.evidence.as_ref());
        self.classify_with_fallback(request.preferred_provider(), &prompt, state)
            .await
    }

    async fn plan(&self, content: &str, deadline: tokio::time::Instant, state: &mut RunState) {
        let planner = match (&self.planner, &self.search) {
            (Some(planner), Some(_)) => planner,
            _ => {
                tracing::debug!(stage = %Stage::Planning, "Query planning skipped");
                return;
            }
        };

        let finished = tokio::time::timeout_at(deadline, planner.plan_into(content, &mut state.plan))
            .await
            .is_ok();
        if !finished {
            let exhausted = format!(
                "evidence budget of {} spent during planning",
                describe_duration(self.settings.evidence_budget())
            );
            state.plan.queries = SearchQuerySet::default();
            state.plan.note = Some(match state.plan.note.take() {
                Some(note) => format!("{}; {}", note, exhausted),
                None => exhausted,
            });
        }
        if let Some(note) = &state.plan.note {
            tracing::warn!(stage = %Stage::Planning, note = %note, "Query planning degraded");
        }
    }

    async fn gather_evidence(&self, deadline: tokio::time::Instant, state: &mut RunState) {
        let search = match &self.search {
            Some(search) if !state.plan.queries.is_empty() => search,
            _ => return,
        };

        let limit = deadline
            .saturating_duration_since(tokio::time::Instant::now())
            .min(self.settings.provider_timeout);
        let searched = tokio::time::timeout(limit, search.search(state.plan.queries.as_slice()))
            .await
            .map_err(|_| VeritasError::Timeout(limit))
            .and_then(|r| r);

        let bundle = match searched {
            Ok(results) => {
                tracing::info!(
                    stage = %Stage::Searching,
                    backend = search.name(),
                    queries = results.len(),
                    "Search completed"
                );
                format_evidence(&results)
            }
            Err(e) => {
                tracing::warn!(stage = %Stage::Searching, error = %e, "Search failed, continuing without evidence");
                empty_evidence()
            }
        };
        state.evidence = Some(bundle);
    }

    async fn classify_with_fallback(
        &self,
        preferred: ProviderId,
        prompt: &str,
        state: &mut RunState,
    ) -> ClassificationResult {
        let order = self.registry.fallback_order(preferred);
        if order.first() != Some(&preferred) {
            tracing::info!(preferred = %preferred, "Preferred provider is not enabled");
        }

        for id in order {
            let adapter = match self.registry.get(id) {
                Some(adapter) => adapter,
                None => continue,
            };

            let started = Instant::now();
            let outcome = self.attempt(adapter.as_ref(), prompt).await;
            let elapsed = started.elapsed();

            match outcome {
                Ok(mut result) => {
                    tracing::info!(
                        stage = %Stage::Classifying,
                        provider = %id,
                        classification = %result.classification,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Provider succeeded"
                    );
                    state.attempts.push(ProviderAttempt {
                        provider: id,
                        outcome: AttemptOutcome::Success(result.clone()),
                        elapsed,
                    });
                    if let Some(evidence) = &state.evidence {
                        result.merge_sources(&evidence.source_urls);
                    }
                    return result;
                }
                Err(e) => {
                    tracing::warn!(
                        stage = %Stage::Classifying,
                        provider = %id,
                        error = %e,
                        "Provider attempt failed, falling back"
                    );
                    state.attempts.push(ProviderAttempt {
                        provider: id,
                        outcome: AttemptOutcome::Failure(e.to_string()),
                        elapsed,
                    });
                }
            }
        }

        ClassificationResult::error(exhaustion_message(&state.attempts))
    }

    /// One provider call: bounded wait, then extraction
    async fn attempt(&self, adapter: &dyn ProviderAdapter, prompt: &str) -> Result<ClassificationResult> {
        let raw = tokio::time::timeout(self.settings.provider_timeout, adapter.classify(prompt))
            .await
            .map_err(|_| VeritasError::Timeout(self.settings.provider_timeout))??;

        tracing::debug!(
            provider = %adapter.id(),
            chars = raw.chars().count(),
            "Provider replied"
        );

        let result = if self.settings.lenient_extraction {
            extract_lenient(&raw)?
        } else {
            extract(&raw)?
        };
        if result.is_error() {
            return Err(VeritasError::provider(
                adapter.id(),
                format!("model answered with an error classification: {}", result.message),
            ));
        }
        Ok(result)
    }
}

fn exhaustion_message(attempts: &[ProviderAttempt]) -> String {
    let reasons: Vec<String> = attempts
        .iter()
        .filter_map(|a| a.failure_reason().map(|r| format!("{}: {}", a.provider, r)))
        .collect();
    format!("All providers failed: {}", reasons.join("; "))
}

/// Error result for a request that ran out of time
pub(crate) fn timeout_result(timeout: Duration) -> ClassificationResult {
    ClassificationResult::error(format!(
        "Classification timed out after {}",
        describe_duration(timeout)
    ))
}

/// Whole seconds, or milliseconds below one second
fn describe_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}s", duration.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[test]
    fn test_exhaustion_message_lists_each_provider() {
        let attempts = vec![
            ProviderAttempt {
                provider: ProviderId::Gemini,
                outcome: AttemptOutcome::Failure("HTTP 429".into()),
                elapsed: Duration::ZERO,
            },
            ProviderAttempt {
                provider: ProviderId::OpenAi,
                outcome: AttemptOutcome::Failure("parse".into()),
                elapsed: Duration::ZERO,
            },
        ];
        assert_eq!(
            exhaustion_message(&attempts),
            "All providers failed: gemini: HTTP 429; openai: parse"
        );
    }

    #[test]
    fn test_timeout_result() {
        let result = timeout_result(Duration::from_secs(90));
        assert_eq!(result.classification, Category::Error);
        assert_eq!(result.message, "Classification timed out after 90s");
        assert_eq!(
            timeout_result(Duration::from_millis(250)).message,
            "Classification timed out after 250ms"
        );
    }

    #[test]
    fn test_settings_from_config() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_secs(90));
        assert_eq!(settings.provider_timeout, Duration::from_secs(30));
        assert!(settings.query_planning);
        assert!(!settings.lenient_extraction);
        assert_eq!(settings.evidence_budget(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_empty_registry_reports_misconfiguration() {
        let orchestrator = Orchestrator::new(
            Arc::new(ProviderRegistry::new()),
            OrchestratorSettings::default(),
        );
        let request = ClassificationRequest::new("texto", ProviderId::Gemini).unwrap();
        let report = orchestrator.run(&request).await;
        assert!(report.result.is_error());
        assert_eq!(report.result.message, NO_PROVIDERS_MESSAGE);
        assert!(report.attempts.is_empty());
    }
}
