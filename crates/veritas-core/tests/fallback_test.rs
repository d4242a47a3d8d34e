//! Integration tests for provider fallback and timeouts

mod common;

use common::{registry, MockAdapter};
use std::sync::Arc;
use std::time::Duration;
use veritas_core::{
    classify_blocking, Category, ClassificationRequest, Orchestrator, OrchestratorSettings,
    ProviderId,
};

fn settings(provider_secs: u64, request_secs: u64) -> OrchestratorSettings {
    OrchestratorSettings {
        request_timeout: Duration::from_secs(request_secs),
        provider_timeout: Duration::from_secs(provider_secs),
        query_planning: true,
        lenient_extraction: false,
    }
}

fn request(content: &str, preferred: ProviderId) -> ClassificationRequest {
    ClassificationRequest::new(content, preferred).unwrap()
}

const FAKE: &str = r#"{"classification": "fake_news", "message": "Contradiz a ciência", "sources": ["https://who.int/vacinas"]}"#;
const TRUE: &str = r#"{"classification": "verdadeiro", "message": "Fato astronômico consolidado"}"#;

#[tokio::test]
async fn test_single_provider_verdadeiro_without_search() {
    let gemini = Arc::new(MockAdapter::ok(ProviderId::Gemini, TRUE));
    let orchestrator = Orchestrator::new(registry(&[gemini.clone()]), settings(30, 90));

    let result = orchestrator
        .classify(&request("A Terra é redonda e orbita o Sol.", ProviderId::Gemini))
        .await;

    assert_eq!(result.classification, Category::Verdadeiro);
    assert_eq!(result.message, "Fato astronômico consolidado");
    assert!(result.sources.is_empty());
    assert_eq!(gemini.calls(), 1);
}

#[tokio::test]
async fn test_fenced_reply_is_extracted() {
    let reply = format!(
        "Segue a análise solicitada:\n```json\n{}\n```\nEspero ter ajudado.",
        FAKE
    );
    let openai = Arc::new(MockAdapter::ok(ProviderId::OpenAi, &reply));
    let orchestrator = Orchestrator::new(registry(&[openai]), settings(30, 90));

    let result = orchestrator
        .classify(&request(
            "Vacinas causam autismo, segundo estudo.",
            ProviderId::OpenAi,
        ))
        .await;

    assert_eq!(result.classification, Category::FakeNews);
    assert_eq!(result.sources, vec!["https://who.int/vacinas"]);
}

#[tokio::test]
async fn test_preferred_success_is_only_call() {
    let gemini = Arc::new(MockAdapter::ok(ProviderId::Gemini, TRUE));
    let openai = Arc::new(MockAdapter::ok(ProviderId::OpenAi, FAKE));
    let claude = Arc::new(MockAdapter::ok(ProviderId::Claude, FAKE));
    let orchestrator = Orchestrator::new(
        registry(&[gemini.clone(), openai.clone(), claude.clone()]),
        settings(30, 90),
    );

    let report = orchestrator
        .run(&request("texto", ProviderId::OpenAi))
        .await;

    assert_eq!(report.result.classification, Category::FakeNews);
    assert_eq!(openai.calls(), 1);
    assert_eq!(gemini.calls(), 0);
    assert_eq!(claude.calls(), 0);
    assert_eq!(report.attempted_providers(), vec![ProviderId::OpenAi]);
}

#[tokio::test]
async fn test_preferred_failure_falls_back_in_order() {
    let gemini = Arc::new(MockAdapter::ok(ProviderId::Gemini, TRUE));
    let openai = Arc::new(MockAdapter::failing(ProviderId::OpenAi, "HTTP 429 rate limited"));
    let orchestrator = Orchestrator::new(
        registry(&[gemini.clone(), openai.clone()]),
        settings(30, 90),
    );

    let report = orchestrator
        .run(&request("texto", ProviderId::OpenAi))
        .await;

    assert_eq!(report.result.classification, Category::Verdadeiro);
    assert_eq!(
        report.attempted_providers(),
        vec![ProviderId::OpenAi, ProviderId::Gemini]
    );
    assert!(!report.attempts[0].is_success());
    assert!(report.attempts[1].is_success());
    // a rate limit is not worth a free-text retry
    assert_eq!(openai.calls(), 1);
    assert_eq!(gemini.calls(), 1);
}

#[tokio::test]
async fn test_rejected_structured_request_retries_free_text() {
    let openai = Arc::new(MockAdapter::rejecting(
        ProviderId::OpenAi,
        "request rejected (HTTP 400): response_format not supported",
    ));
    let gemini = Arc::new(MockAdapter::ok(ProviderId::Gemini, TRUE));
    let orchestrator = Orchestrator::new(
        registry(&[gemini.clone(), openai.clone()]),
        settings(30, 90),
    );

    let report = orchestrator
        .run(&request("texto", ProviderId::OpenAi))
        .await;

    assert_eq!(report.result.classification, Category::Verdadeiro);
    assert_eq!(openai.calls(), 2);
    assert!(report.attempts[0]
        .failure_reason()
        .unwrap()
        .contains("rejected the request"));
}

#[tokio::test]
async fn test_unparseable_and_error_replies_count_as_failures() {
    let gemini = Arc::new(MockAdapter::ok(ProviderId::Gemini, "Não sei responder."));
    let claude = Arc::new(MockAdapter::ok(
        ProviderId::Claude,
        r#"{"classification": "error", "message": "conteúdo bloqueado"}"#,
    ));
    let deepseek = Arc::new(MockAdapter::ok(ProviderId::DeepSeek, TRUE));
    let orchestrator = Orchestrator::new(
        registry(&[gemini, claude, deepseek]),
        settings(30, 90),
    );

    let report = orchestrator
        .run(&request("texto", ProviderId::Gemini))
        .await;

    assert_eq!(report.result.classification, Category::Verdadeiro);
    assert_eq!(report.attempts.len(), 3);
    assert!(report.attempts[1]
        .failure_reason()
        .unwrap()
        .contains("conteúdo bloqueado"));
}

#[tokio::test]
async fn test_lenient_extraction_accepts_keyword_reply() {
    const PROSE: &str = "Este conteúdo é claramente fake news, sem qualquer base.";

    let strict = Orchestrator::new(
        registry(&[Arc::new(MockAdapter::ok(ProviderId::Gemini, PROSE))]),
        settings(30, 90),
    );
    let report = strict.run(&request("texto", ProviderId::Gemini)).await;
    assert!(report.result.is_error());

    let lenient = Orchestrator::new(
        registry(&[Arc::new(MockAdapter::ok(ProviderId::Gemini, PROSE))]),
        OrchestratorSettings {
            lenient_extraction: true,
            ..settings(30, 90)
        },
    );
    let report = lenient.run(&request("texto", ProviderId::Gemini)).await;
    assert_eq!(report.result.classification, Category::FakeNews);
    assert_eq!(report.result.message, PROSE);
}

#[tokio::test]
async fn test_all_providers_fail_names_each_provider() {
    let gemini = Arc::new(MockAdapter::failing(ProviderId::Gemini, "HTTP 500"));
    let openai = Arc::new(MockAdapter::failing(ProviderId::OpenAi, "invalid api key"));
    let orchestrator = Orchestrator::new(registry(&[gemini, openai]), settings(30, 90));

    let result = orchestrator
        .classify(&request("texto", ProviderId::Gemini))
        .await;

    assert!(result.is_error());
    assert!(result.message.starts_with("All providers failed: gemini: "));
    assert!(result.message.contains("HTTP 500"));
    assert!(result.message.contains("; openai: "));
    assert!(result.message.contains("invalid api key"));
}

#[tokio::test(start_paused = true)]
async fn test_preferred_timeout_then_second_provider() {
    let claude = Arc::new(
        MockAdapter::ok(ProviderId::Claude, FAKE).with_delay(Duration::from_secs(60)),
    );
    let gemini = Arc::new(
        MockAdapter::ok(ProviderId::Gemini, TRUE).with_delay(Duration::from_millis(500)),
    );
    let orchestrator = Orchestrator::new(
        registry(&[gemini.clone(), claude.clone()]),
        settings(2, 90),
    );

    let started = tokio::time::Instant::now();
    let report = orchestrator
        .run(&request("texto", ProviderId::Claude))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(report.result.classification, Category::Verdadeiro);
    assert_eq!(
        report.attempted_providers(),
        vec![ProviderId::Claude, ProviderId::Gemini]
    );
    assert!(report.attempts[0]
        .failure_reason()
        .unwrap()
        .contains("Timed out after 2s"));
    assert!(elapsed >= Duration::from_millis(2500));
    assert!(elapsed < Duration::from_millis(2600));
}

#[tokio::test(start_paused = true)]
async fn test_request_deadline_cancels_in_flight_attempt() {
    let gemini = Arc::new(
        MockAdapter::ok(ProviderId::Gemini, TRUE).with_delay(Duration::from_secs(20)),
    );
    let openai = Arc::new(MockAdapter::ok(ProviderId::OpenAi, TRUE));
    let orchestrator = Orchestrator::new(
        registry(&[gemini, openai.clone()]),
        settings(30, 5),
    );

    let report = orchestrator
        .run(&request("texto", ProviderId::Gemini))
        .await;

    assert!(report.timed_out);
    assert_eq!(report.result.message, "Classification timed out after 5s");
    assert!(report.attempts.is_empty());
    assert_eq!(openai.calls(), 0);
}

#[test]
fn test_blocking_all_fail_never_raises() {
    let gemini = Arc::new(MockAdapter::failing(ProviderId::Gemini, "quota exceeded"));
    let huggingface = Arc::new(MockAdapter::failing(ProviderId::HuggingFace, "model loading"));
    let orchestrator = Arc::new(Orchestrator::new(
        registry(&[gemini, huggingface]),
        settings(30, 90),
    ));

    let result = classify_blocking(
        orchestrator,
        "Conteúdo qualquer",
        ProviderId::HuggingFace,
        Duration::from_secs(10),
    )
    .unwrap();

    assert!(result.is_error());
    assert!(result.message.contains("huggingface: "));
    assert!(result.message.contains("gemini: "));
}

#[test]
fn test_blocking_call_is_bounded() {
    let slow = Arc::new(
        MockAdapter::ok(ProviderId::Gemini, TRUE).with_delay(Duration::from_secs(30)),
    );
    let orchestrator = Arc::new(Orchestrator::new(registry(&[slow]), settings(60, 90)));

    let started = std::time::Instant::now();
    let result = classify_blocking(
        orchestrator,
        "texto",
        ProviderId::Gemini,
        Duration::from_millis(300),
    )
    .unwrap();

    assert!(result.is_error());
    assert!(started.elapsed() < Duration::from_secs(5));
}
