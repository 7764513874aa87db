use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::fields::{self, Record};

const DONE: &str = "✓";
const PENDING: &str = "○";
const DUE_FORMAT: &str = "%d/%m %H:%M";

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Renders an ISO-8601 due date as `DD/MM HH:MM`.
///
/// The wall-clock time written in the timestamp is kept; a trailing `Z` is
/// read as `+00:00`. Anything unparseable is returned verbatim.
#[must_use]
pub fn format_due(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.format(DUE_FORMAT).to_string();
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return parsed.format(DUE_FORMAT).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%d/%m 00:00").to_string();
    }
    raw.to_string()
}

/// `✓ {title} — {type} | {due}`; completion is the presence of `completedAt`.
#[must_use]
pub fn task_summary(task: &Record) -> String {
    let glyph = if fields::is_set(task, &["completedAt"]) {
        DONE
    } else {
        PENDING
    };
    let title = fields::text(task, &["title"]).unwrap_or_else(|| "Sem título".to_string());

    let extra: Vec<String> = [
        fields::text(task, &["type"]),
        fields::text(task, &["dueAt"]).map(|due| format_due(&due)),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect();

    if extra.is_empty() {
        format!("{glyph} {title}")
    } else {
        format!("{glyph} {title} — {}", extra.join(" | "))
    }
}
