//! Classify command

use super::read_content;
use crate::app::{ClassifyArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use veritas_core::{ClassificationRequest, Config, Database, Orchestrator};

pub async fn run(
    args: ClassifyArgs,
    config: &Config,
    db: &Database,
    format: OutputFormat,
) -> Result<()> {
    let content = read_content(&args.input)?;
    let preferred = args.provider.unwrap_or(config.classifier.default_provider);
    let request = ClassificationRequest::new(content, preferred)?;

    let orchestrator = if args.lenient {
        let mut config = config.clone();
        config.classifier.lenient_extraction = true;
        Orchestrator::from_config(&config)?
    } else {
        Orchestrator::from_config(config)?
    };
    let report = orchestrator.run(&request).await;

    let saved_id = if args.save {
        let id = db.create_analysis(request.content())?;
        db.complete_analysis(&id, &report.result)?;
        Some(id)
    } else {
        None
    };

    print!(
        "{}",
        output::format_report(&report, saved_id.as_deref(), args.attempts, format)
    );
    Ok(())
}
