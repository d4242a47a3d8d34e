//! Terminal output formatter

use std::io::{IsTerminal, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};
use veritas_core::{AnalysisRecord, Category, ClassificationReport};

const CONTENT_PREVIEW_CHARS: usize = 60;

pub fn format_report(
    report: &ClassificationReport,
    saved_id: Option<&str>,
    show_attempts: bool,
) -> String {
    let mut buf = buffer();
    let result = &report.result;

    write_verdict(&mut buf, result.classification);
    let _ = writeln!(buf);
    if !result.message.is_empty() {
        let _ = writeln!(buf, "{}", result.message);
    }
    write_sources(&mut buf, &result.sources);

    if !report.queries.is_empty() {
        let queries: Vec<&str> = report.queries.iter().map(String::as_str).collect();
        let _ = writeln!(buf, "\nSearch queries: {}", queries.join("; "));
    }

    if show_attempts && !report.attempts.is_empty() {
        let _ = writeln!(buf, "\nAttempts:");
        for attempt in &report.attempts {
            let outcome = attempt.failure_reason().unwrap_or("ok");
            let _ = writeln!(
                buf,
                "  {:<12} {:>6}ms  {}",
                attempt.provider.as_str(),
                attempt.elapsed.as_millis(),
                outcome
            );
        }
    }

    if let Some(id) = saved_id {
        let _ = writeln!(buf, "\nSaved as {}", id);
    }

    into_string(buf)
}

pub fn format_history(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No analyses yet.\n".to_string();
    }

    let mut buf = buffer();
    for record in records {
        let _ = write!(buf, "{}  ", record.id);
        match record.classification {
            Some(category) => write_verdict(&mut buf, category),
            None => {
                let _ = write!(buf, "{}", record.status);
            }
        }
        let _ = writeln!(buf, "  {}", preview(&record.content));
    }
    into_string(buf)
}

pub fn format_record(record: &AnalysisRecord) -> String {
    let mut buf = buffer();
    let _ = writeln!(buf, "Id:        {}", record.id);
    let _ = writeln!(buf, "Status:    {}", record.status);
    let _ = write!(buf, "Verdict:   ");
    match record.classification {
        Some(category) => write_verdict(&mut buf, category),
        None => {
            let _ = write!(buf, "-");
        }
    }
    let _ = writeln!(buf);
    let _ = writeln!(buf, "Created:   {}", record.created_at);
    let _ = writeln!(buf, "Updated:   {}", record.updated_at);
    if let Some(message) = record.message.as_deref().filter(|m| !m.is_empty()) {
        let _ = writeln!(buf, "Message:   {}", message);
    }
    let _ = writeln!(buf, "\n{}", record.content.trim());
    write_sources(&mut buf, &record.sources);
    into_string(buf)
}

fn buffer() -> Buffer {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    BufferWriter::stdout(choice).buffer()
}

fn into_string(buf: Buffer) -> String {
    String::from_utf8_lossy(buf.as_slice()).into_owned()
}

fn write_verdict(buf: &mut Buffer, category: Category) {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    if let Some(color) = term_color(category) {
        spec.set_fg(Some(color));
    }
    let _ = write!(buf, "{} ", category.emoji());
    let _ = buf.set_color(&spec);
    let _ = write!(buf, "{}", category.as_str());
    let _ = buf.reset();
}

fn write_sources(buf: &mut Buffer, sources: &[String]) {
    if sources.is_empty() {
        return;
    }
    let _ = writeln!(buf, "\nSources:");
    for url in sources {
        let _ = writeln!(buf, "  - {}", url);
    }
}

fn term_color(category: Category) -> Option<Color> {
    match category.color() {
        "green" => Some(Color::Green),
        "red" => Some(Color::Red),
        "white" => Some(Color::White),
        "blue" => Some(Color::Blue),
        "orange" => Some(Color::Yellow),
        _ => None,
    }
}

fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}
