//! Classification extraction from raw model output
//!
//! Models wrap JSON in commentary or markdown fences even when asked not to.
//! Every provider's text goes through `extract`, so one parsing contract
//! applies regardless of where the text came from.

use crate::error::{Result, VeritasError};
use crate::model::{push_unique, Category, ClassificationResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

/// Maximum characters of offending text carried by a parse error
pub const PREVIEW_CHARS: usize = 300;

/// Maximum characters kept as message by the keyword fallback
const LENIENT_MESSAGE_CHARS: usize = 2000;

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?is)```\s*json\s*\n?(.*?)```").unwrap();
    static ref ANY_FENCE: Regex = Regex::new(r"(?s)```[^\n`]*\n?(.*?)```").unwrap();
}

/// Extract a classification from raw model text
pub fn extract(raw: &str) -> Result<ClassificationResult> {
    let candidate = locate_json(raw);

    let value: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(first_err) => match outer_braces(candidate) {
            Some(span) => serde_json::from_str(span).map_err(|e| parse_error(e, raw))?,
            None => return Err(parse_error(first_err, raw)),
        },
    };

    from_value(&value).ok_or_else(|| VeritasError::Parse {
        message: "JSON object has no string 'classification' field".to_string(),
        preview: preview(raw),
    })
}

/// `extract`, falling back to a keyword scan of free text
///
/// The whole text (bounded) becomes the message when no JSON is found.
pub fn extract_lenient(raw: &str) -> Result<ClassificationResult> {
    match extract(raw) {
        Ok(result) => Ok(result),
        Err(err) => {
            let category = scan_keywords(raw).ok_or(err)?;
            Ok(ClassificationResult::new(
                category,
                truncate_chars(raw.trim(), LENIENT_MESSAGE_CHARS),
            ))
        }
    }
}

/// Render a result the way providers are asked to answer
pub fn to_fenced_json(result: &ClassificationResult) -> String {
    let body = serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string());
    format!("```json\n{}\n```", body)
}

/// Bounded preview of a text, safe on char boundaries
pub fn preview(text: &str) -> String {
    truncate_chars(text.trim(), PREVIEW_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn locate_json(raw: &str) -> &str {
    if let Some(body) = JSON_FENCE.captures(raw).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }

    // Untagged fence: only trust it when the body looks like an object
    if let Some(body) = ANY_FENCE.captures(raw).and_then(|c| c.get(1)) {
        let body = body.as_str().trim();
        if body.starts_with('{') {
            return body;
        }
    }

    raw.trim()
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn from_value(value: &Value) -> Option<ClassificationResult> {
    let obj = value.as_object()?;
    let classification = Category::from_label(obj.get("classification")?.as_str()?);

    let message = ["message", "justification", "justificativa"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let mut sources = Vec::new();
    if let Some(list) = obj.get("sources").and_then(Value::as_array) {
        for url in list.iter().filter_map(Value::as_str) {
            push_unique(&mut sources, url);
        }
    }

    Some(ClassificationResult {
        classification,
        message,
        sources,
    })
}

fn scan_keywords(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    let table: [(&[&str], Category); 5] = [
        (&["fake_news", "fake news", "notícia falsa"], Category::FakeNews),
        (&["verdadeiro"], Category::Verdadeiro),
        (&["sátira", "satira"], Category::Satira),
        (&["opinião", "opiniao"], Category::Opiniao),
        (&["tendencioso", "parcial"], Category::Tendencioso),
    ];
    table
        .iter()
        .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
        .map(|(_, category)| *category)
}

fn parse_error(err: serde_json::Error, raw: &str) -> VeritasError {
    VeritasError::Parse {
        message: err.to_string(),
        preview: preview(raw),
    }
}
