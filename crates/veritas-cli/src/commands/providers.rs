//! Providers command

use crate::app::OutputFormat;
use anyhow::Result;
use veritas_core::{Config, ProviderId};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let enabled = config.enabled_providers();

    let rows: Vec<serde_json::Value> = config
        .classifier
        .effective_priority()
        .into_iter()
        .map(|id| {
            serde_json::json!({
                "provider": id,
                "enabled": enabled.contains(&id),
                "model": model_for(config, id),
                "default": id == config.classifier.default_provider,
            })
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "providers": rows,
                    "search": config.search.is_some(),
                }))?
            );
        }
        OutputFormat::Cli => {
            for id in config.classifier.effective_priority() {
                let state = if enabled.contains(&id) { "enabled" } else { "disabled" };
                let marker = if id == config.classifier.default_provider { "*" } else { " " };
                let model = model_for(config, id).unwrap_or_else(|| "(default model)".to_string());
                println!("{} {:<12} {:<9} {}", marker, id.as_str(), state, model);
            }
            println!();
            if config.search.is_some() {
                println!("Web search: enabled");
            } else {
                println!("Web search: disabled");
            }
            if enabled.is_empty() {
                println!("No LLM providers are configured");
            }
        }
    }
    Ok(())
}

fn model_for(config: &Config, id: ProviderId) -> Option<String> {
    config.providers.get(&id).and_then(|p| p.model.clone())
}
