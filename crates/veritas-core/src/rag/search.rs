//! Web search backends used to gather evidence

use crate::config::SearchConfig;
use crate::error::{Result, VeritasError};
use crate::model::{SearchHit, SearchResults};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const MAX_CONCURRENT_QUERIES: usize = 3;

/// Search backend trait
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Run every query; results keep query order
    async fn search(&self, queries: &[String]) -> Result<SearchResults>;
}

/// Google Programmable Search (Custom Search JSON API)
pub struct GoogleSearchBackend {
    http_client: reqwest::Client,
    config: SearchConfig,
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Deserialize)]
struct GoogleItem {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

impl From<GoogleItem> for SearchHit {
    fn from(item: GoogleItem) -> Self {
        SearchHit {
            title: item.title,
            snippet: item.snippet,
            url: item.link,
        }
    }
}

impl GoogleSearchBackend {
    pub fn new(config: SearchConfig, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VeritasError::Http)?;
        Ok(Self {
            http_client,
            config,
        })
    }

    async fn search_one(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = self.config.base_url.as_deref().unwrap_or(GOOGLE_SEARCH_URL);
        // The API caps `num` at 10
        let num = self.config.results_per_query.clamp(1, 10).to_string();

        let response = self
            .http_client
            .get(url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VeritasError::Search(format!(
                "search API error (HTTP {}): {}",
                status,
                crate::llm::extractor::preview(&body)
            )));
        }

        let parsed: GoogleResponse = response.json().await?;
        Ok(parsed.items.into_iter().map(SearchHit::from).collect())
    }
}

#[async_trait]
impl SearchBackend for GoogleSearchBackend {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, queries: &[String]) -> Result<SearchResults> {
        use futures::stream::StreamExt;

        // `buffered` keeps query order
        let pending: Vec<_> = queries
            .iter()
            .map(|query| async move { (query, self.search_one(query).await) })
            .collect();
        let outcomes: Vec<(&String, Result<Vec<SearchHit>>)> = futures::stream::iter(pending)
            .buffered(MAX_CONCURRENT_QUERIES)
            .collect()
            .await;

        let mut results = SearchResults::new();
        let mut failures = Vec::new();

        for (query, outcome) in outcomes {
            match outcome {
                Ok(hits) => {
                    tracing::debug!(query = %query, hits = hits.len(), "Search completed");
                    results.insert(query.clone(), hits);
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Search query failed, skipping");
                    failures.push(e.to_string());
                }
            }
        }

        if !queries.is_empty() && failures.len() == queries.len() {
            return Err(VeritasError::Search(failures.join("; ")));
        }

        Ok(results)
    }
}
