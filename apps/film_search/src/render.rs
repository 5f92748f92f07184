//! Plain-text presentation of controller snapshots.

use std::fmt::Write as _;

use client_core::{ControllerSnapshot, FetchState};
use shared::{domain::ResultRecord, error::ErrorKind};

const TITLE: &str = "Film Searcher";

pub fn render_snapshot(snapshot: &ControllerSnapshot) -> String {
    match &snapshot.state {
        FetchState::Idle => "No search started.".to_string(),
        FetchState::Loading => "Searching...".to_string(),
        FetchState::Failed(error) => match error.kind {
            ErrorKind::NoResults if !error.message.is_empty() => error.message.clone(),
            _ => format!("Search failed ({}): {}", error.kind, error.message),
        },
        FetchState::Loaded(results) if results.is_empty() => format!("{TITLE}: no films found."),
        FetchState::Loaded(results) => {
            let mut out = format!("{TITLE}: {} result(s)\n", results.len());
            for (index, record) in results.iter().enumerate() {
                let marker = if snapshot.selection.as_ref() == Some(&record.id) {
                    '*'
                } else {
                    ' '
                };
                let _ = writeln!(
                    out,
                    "{marker}{:>3}. {} ({}) [{}]",
                    index + 1,
                    record.title,
                    record.year,
                    record.id
                );
            }
            if let Some(record) = snapshot.selected_record() {
                out.push('\n');
                out.push_str(&render_detail(record));
            }
            out.trim_end().to_string()
        }
    }
}

pub fn render_detail(record: &ResultRecord) -> String {
    let poster = record.poster_url.as_deref().unwrap_or("not available");
    format!(
        "Selected film:\n  {}\n  {}\n  Poster: {}",
        record.title, record.year, poster
    )
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
