//! Interactive line-oriented session over stdin.
//!
//! A spawned listener prints every snapshot the controller publishes; the
//! input loop only forwards intents.

use std::sync::Arc;

use client_core::{ControllerSnapshot, ListSelectionController};
use shared::domain::RecordId;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::debug;

use crate::render::render_snapshot;

pub const HELP: &str = "Commands: <number> or <imdbID> select, c clear, r search again, x cancel, q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(RecordId),
    Clear,
    Refetch,
    Cancel,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parses one input line. List positions are one-based and resolved
    /// against the current result set; anything else is taken as an identifier.
    pub fn parse(line: &str, snapshot: &ControllerSnapshot) -> Option<Self> {
        let input = line.trim();
        match input {
            "" => None,
            "q" | "quit" => Some(Self::Quit),
            "c" | "clear" => Some(Self::Clear),
            "r" | "refresh" => Some(Self::Refetch),
            "x" | "cancel" => Some(Self::Cancel),
            "h" | "help" | "?" => Some(Self::Help),
            _ => match input.parse::<usize>() {
                Ok(position) => {
                    let record = position
                        .checked_sub(1)
                        .and_then(|index| snapshot.state.result_set()?.records().get(index));
                    Some(Self::Select(match record {
                        Some(record) => record.id.clone(),
                        None => RecordId::from(input),
                    }))
                }
                Err(_) => Some(Self::Select(RecordId::from(input))),
            },
        }
    }
}

pub async fn run(controller: Arc<ListSelectionController>) -> anyhow::Result<()> {
    let mut events = controller.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(snapshot) => println!("{}\n", render_snapshot(&snapshot)),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "renderer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{HELP}");
    controller.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let snapshot = controller.snapshot().await;
        let Some(command) = SessionCommand::parse(&line, &snapshot) else {
            continue;
        };

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Clear => controller.clear_selection().await,
            SessionCommand::Cancel => {
                if !controller.cancel().await {
                    println!("No search is running.");
                }
            }
            SessionCommand::Refetch => {
                if !controller.start().await.is_started() {
                    println!("A search is already running.");
                }
            }
            SessionCommand::Select(id) => {
                if let Err(err) = controller.select(&id).await {
                    println!("Cannot select {id}: {err}");
                }
            }
        }
    }

    listener.abort();
    Ok(())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
