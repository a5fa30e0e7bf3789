use serde::Serialize;

use crate::error::CliResult;

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Date part of an ISO-8601 timestamp (`2025-03-15T09:00:00` -> `2025-03-15`)
pub fn format_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Notice printed on stderr when placeholder data stands in for the backend
pub fn offline_notice(what: &str) {
    eprintln!("Backend unavailable, showing offline {what}");
}
