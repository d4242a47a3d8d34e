//! Veritas Core Library
//!
//! Multi-provider LLM content classification.
//!
//! # Features
//! - Provider adapters for Gemini, OpenAI, Hugging Face, Claude and DeepSeek
//! - Ordered fallback with per-provider and per-request timeouts
//! - Search query planning and web evidence for retrieval-augmented prompts
//! - Tolerant extraction of JSON verdicts from free-text replies
//! - SQLite persistence of analyses and a blocking job runner

pub mod bridge;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod llm;
pub mod model;
pub mod orchestrator;
pub mod rag;

pub use bridge::{classify_blocking, BlockingClassifier};
pub use config::{ClassifierConfig, Config, ProviderConfig, SearchConfig};
pub use db::{AnalysisRecord, AnalysisSink, AnalysisStats, Database};
pub use error::{Error, Result, VeritasError};
pub use llm::{
    extract, extract_lenient, ClaudeAdapter, GeminiAdapter, OpenAiCompatibleAdapter, OutputMode,
    ProviderAdapter, ProviderRegistry, ToolSpec,
};
pub use model::{
    AnalysisStatus, AttemptOutcome, Category, ClassificationRequest, ClassificationResult,
    EvidenceBundle, ProviderAttempt, ProviderId, SearchHit, SearchQuerySet, SearchResults,
};
pub use orchestrator::{ClassificationReport, Orchestrator, OrchestratorSettings, Stage};
pub use rag::{format_evidence, GoogleSearchBackend, QueryPlanner, SearchBackend};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "veritas";

/// Default data directory name
pub const DATA_DIR_NAME: &str = "veritas";
