//! Classification data model
//!
//! Types shared by the extractor, the provider adapters, the RAG phase and
//! the orchestrator. Everything here is plain data; behaviour lives in the
//! modules that consume it.

use crate::error::{Result, VeritasError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Maximum number of search queries kept from the planner
pub const MAX_QUERIES: usize = 3;

/// LLM backend identifier
///
/// Declaration order is the default fallback priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    OpenAi,
    HuggingFace,
    Claude,
    DeepSeek,
}

impl ProviderId {
    /// All providers in default priority order
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Gemini,
        ProviderId::OpenAi,
        ProviderId::HuggingFace,
        ProviderId::Claude,
        ProviderId::DeepSeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::HuggingFace => "huggingface",
            Self::Claude => "claude",
            Self::DeepSeek => "deepseek",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = VeritasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "chatgpt" | "gpt" => Ok(Self::OpenAi),
            "huggingface" | "hf" | "hugging_face" => Ok(Self::HuggingFace),
            "claude" | "anthropic" => Ok(Self::Claude),
            "deepseek" => Ok(Self::DeepSeek),
            other => Err(VeritasError::InvalidRequest(format!(
                "Unknown provider '{}' (expected one of: gemini, openai, huggingface, claude, deepseek)",
                other
            ))),
        }
    }
}

/// Classification taxonomy
///
/// `Error` is a sentinel: no provider produced a usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    FakeNews,
    Verdadeiro,
    Satira,
    Opiniao,
    Tendencioso,
    Indefinido,
    Error,
}

impl Category {
    /// The six substantive categories a model may answer with
    pub const SUBSTANTIVE: [Category; 6] = [
        Category::FakeNews,
        Category::Verdadeiro,
        Category::Satira,
        Category::Opiniao,
        Category::Tendencioso,
        Category::Indefinido,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FakeNews => "fake_news",
            Self::Verdadeiro => "verdadeiro",
            Self::Satira => "satira",
            Self::Opiniao => "opiniao",
            Self::Tendencioso => "tendencioso",
            Self::Indefinido => "indefinido",
            Self::Error => "error",
        }
    }

    /// Map a model-supplied label onto the closed set.
    ///
    /// Case and accents are ignored, English synonyms and the legacy
    /// `parcial` spelling are accepted. Unknown labels become `Indefinido`.
    pub fn from_label(label: &str) -> Self {
        Self::match_label(label).unwrap_or(Self::Indefinido)
    }

    /// Like `from_label` but returns `None` for unknown labels
    pub fn match_label(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        let category = match normalized.as_str() {
            "fake_news" | "fakenews" | "fake" | "falso" | "falsa" | "noticia_falsa"
            | "desinformacao" | "misinformation" => Self::FakeNews,
            "verdadeiro" | "verdadeira" | "verdade" | "true" | "fato" | "confirmado"
            | "factual" => Self::Verdadeiro,
            "satira" | "satire" | "satirical" | "humor" => Self::Satira,
            "opiniao" | "opinion" | "editorial" => Self::Opiniao,
            "tendencioso" | "tendenciosa" | "parcial" | "biased" | "bias" => Self::Tendencioso,
            "indefinido" | "indefinida" | "indeterminado" | "undetermined" | "unknown"
            | "inconclusivo" => Self::Indefinido,
            "error" | "erro" => Self::Error,
            _ => return None,
        };
        Some(category)
    }

    /// Display color hint persisted with each analysis
    pub fn color(&self) -> &'static str {
        match self {
            Self::Verdadeiro => "green",
            Self::FakeNews => "red",
            Self::Satira => "white",
            Self::Opiniao => "blue",
            Self::Tendencioso => "orange",
            Self::Indefinido | Self::Error => "black",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Verdadeiro => "🟢",
            Self::FakeNews => "🔴",
            Self::Satira => "⚪",
            Self::Opiniao => "🔵",
            Self::Tendencioso => "🟠",
            Self::Indefinido | Self::Error => "⚫",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

/// Persisted processing status of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work: one piece of content to classify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    content: String,
    preferred_provider: ProviderId,
}

impl ClassificationRequest {
    /// Build a request, rejecting empty content
    pub fn new(content: impl Into<String>, preferred_provider: ProviderId) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(VeritasError::InvalidRequest(
                "content must not be empty".to_string(),
            ));
        }
        Ok(Self {
            content,
            preferred_provider,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn preferred_provider(&self) -> ProviderId {
        self.preferred_provider
    }
}

/// Final (or per-attempt) classification outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: Category,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ClassificationResult {
    pub fn new(classification: Category, message: impl Into<String>) -> Self {
        Self {
            classification,
            message: message.into(),
            sources: Vec::new(),
        }
    }

    /// Sentinel result reported when no provider produced a usable answer
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Category::Error, message)
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn is_error(&self) -> bool {
        self.classification.is_error()
    }

    /// Status a caller should persist for this result
    pub fn status(&self) -> AnalysisStatus {
        if self.is_error() {
            AnalysisStatus::Failed
        } else {
            AnalysisStatus::Completed
        }
    }

    /// Append URLs not already present, preserving order
    pub fn merge_sources<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            push_unique(&mut self.sources, url.as_ref());
        }
    }
}

/// Push a trimmed, non-empty value unless it is already present
pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Bounded, ordered list of web search queries produced by the planner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuerySet(Vec<String>);

impl SearchQuerySet {
    /// Normalize raw queries: trim, drop blanks and duplicates, cap at `MAX_QUERIES`
    pub fn from_raw<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for query in queries {
            if out.len() >= MAX_QUERIES {
                break;
            }
            push_unique(&mut out, query.as_ref());
        }
        Self(out)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

/// One web search hit; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl SearchHit {
    pub fn new(title: &str, snippet: &str, url: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            snippet: Some(snippet.to_string()),
            url: Some(url.to_string()),
        }
    }
}

/// Raw search results keyed by query, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    entries: Vec<(String, Vec<SearchHit>)>,
}

impl SearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add hits for a query; hits for a repeated query are appended
    pub fn insert(&mut self, query: impl Into<String>, hits: Vec<SearchHit>) {
        let query = query.into();
        match self.entries.iter_mut().find(|(q, _)| *q == query) {
            Some((_, existing)) => existing.extend(hits),
            None => self.entries.push((query, hits)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SearchHit])> {
        self.entries.iter().map(|(q, h)| (q.as_str(), h.as_slice()))
    }
}

/// Evidence block injected into the final prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvidenceBundle {
    pub formatted_text: String,
    pub source_urls: Vec<String>,
}

/// Outcome of one fallback step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(ClassificationResult),
    Failure(String),
}

/// Record of a single provider attempt within one request
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

impl ProviderAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Failure(reason) => Some(reason),
            AttemptOutcome::Success(_) => None,
        }
    }
}
