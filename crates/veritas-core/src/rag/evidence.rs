//! Evidence formatting
//!
//! Turns raw search results into the text block fed to the classification
//! prompt and collects the URLs that end up in `sources`.

use crate::model::{push_unique, EvidenceBundle, SearchHit, SearchResults};

/// Text used when there is nothing to show; read by the model as-is
pub const NO_RESULTS_TEXT: &str = "No relevant search results were found for this content.";

const MAX_HITS_PER_QUERY: usize = 5;
const MAX_SNIPPET_CHARS: usize = 300;
const MAX_TOTAL_CHARS: usize = 6000;

/// Format raw search results. Pure and total.
pub fn format_evidence(raw: &SearchResults) -> EvidenceBundle {
    let mut source_urls = Vec::new();
    let mut paragraphs = Vec::new();

    for (query, hits) in raw.iter() {
        // URLs are collected from every hit, including ones cut from the text
        for hit in hits {
            if let Some(url) = hit.url.as_deref() {
                push_unique(&mut source_urls, url);
            }
        }

        if hits.is_empty() {
            continue;
        }

        let mut paragraph = format!("Results for \"{}\":", query);
        for (rank, hit) in hits.iter().take(MAX_HITS_PER_QUERY).enumerate() {
            paragraph.push('\n');
            paragraph.push_str(&format_hit(rank + 1, hit));
        }
        paragraphs.push(paragraph);
    }

    let formatted_text = if paragraphs.is_empty() {
        NO_RESULTS_TEXT.to_string()
    } else {
        bound(paragraphs.join("\n\n"), MAX_TOTAL_CHARS)
    };

    EvidenceBundle {
        formatted_text,
        source_urls,
    }
}

/// Bundle used when the search phase failed or was skipped
pub fn empty_evidence() -> EvidenceBundle {
    EvidenceBundle {
        formatted_text: NO_RESULTS_TEXT.to_string(),
        source_urls: Vec::new(),
    }
}

fn format_hit(rank: usize, hit: &SearchHit) -> String {
    let title = non_blank(hit.title.as_deref()).unwrap_or("no title");
    let snippet = non_blank(hit.snippet.as_deref())
        .map(|s| bound(s.split_whitespace().collect::<Vec<_>>().join(" "), MAX_SNIPPET_CHARS))
        .unwrap_or_else(|| "no snippet".to_string());
    let url = non_blank(hit.url.as_deref()).unwrap_or("no url");
    format!("{}. {} - {} ({})", rank, title.trim(), snippet, url.trim())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn bound(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text,
    }
}
