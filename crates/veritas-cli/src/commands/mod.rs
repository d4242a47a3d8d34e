//! CLI command handlers

pub mod classify;
pub mod delete;
pub mod get;
pub mod history;
pub mod providers;
pub mod status;
pub mod submit;
pub mod worker;

use crate::app::ContentArgs;
use anyhow::{Context, Result};
use std::io::Read;
use veritas_core::VeritasError;

/// Resolve the content argument, file or stdin into text
pub(crate) fn read_content(input: &ContentArgs) -> Result<String> {
    let text = match (&input.content, &input.file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (Some(content), None) if content == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (Some(content), None) => content.clone(),
        (None, None) => {
            return Err(VeritasError::InvalidRequest(
                "provide content as an argument, with --file, or `-` for stdin".to_string(),
            )
            .into())
        }
    };

    if text.trim().is_empty() {
        return Err(VeritasError::InvalidRequest("content must not be empty".to_string()).into());
    }
    Ok(text)
}
