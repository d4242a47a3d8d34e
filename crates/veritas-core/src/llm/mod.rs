//! LLM integration
//!
//! Provides:
//! - The `ProviderAdapter` contract and HTTP adapters per backend
//! - The provider registry that fixes fallback priority
//! - Classification extraction from raw model output
//! - Prompt templates

pub mod extractor;
pub mod prompts;
mod provider;
pub mod providers;
mod registry;

pub use extractor::{extract, extract_lenient};
pub use provider::{OutputMode, ProviderAdapter, ToolSpec};
pub use providers::{ClaudeAdapter, GeminiAdapter, OpenAiCompatibleAdapter};
pub use registry::ProviderRegistry;
