use super::*;

use client_core::FetchState;
use shared::domain::{ResultRecord, ResultSet};

fn loaded_snapshot() -> ControllerSnapshot {
    let records = ["tt0076759", "tt0080684"]
        .into_iter()
        .map(|id| ResultRecord {
            id: RecordId::from(id),
            title: format!("Film {id}"),
            year: "1977".to_string(),
            poster_url: None,
        })
        .collect::<ResultSet>();
    ControllerSnapshot {
        state: FetchState::Loaded(records),
        selection: None,
        request_seq: 1,
    }
}

#[test]
fn parses_control_words() {
    let snapshot = loaded_snapshot();
    assert_eq!(SessionCommand::parse("q", &snapshot), Some(SessionCommand::Quit));
    assert_eq!(SessionCommand::parse(" clear ", &snapshot), Some(SessionCommand::Clear));
    assert_eq!(SessionCommand::parse("r", &snapshot), Some(SessionCommand::Refetch));
    assert_eq!(SessionCommand::parse("x", &snapshot), Some(SessionCommand::Cancel));
    assert_eq!(SessionCommand::parse("?", &snapshot), Some(SessionCommand::Help));
    assert_eq!(SessionCommand::parse("   ", &snapshot), None);
}

#[test]
fn list_position_resolves_to_identifier() {
    assert_eq!(
        SessionCommand::parse("2", &loaded_snapshot()),
        Some(SessionCommand::Select(RecordId::from("tt0080684")))
    );
}

#[test]
fn out_of_range_position_is_passed_through_as_identifier() {
    let snapshot = loaded_snapshot();
    assert_eq!(
        SessionCommand::parse("0", &snapshot),
        Some(SessionCommand::Select(RecordId::from("0")))
    );
    assert_eq!(
        SessionCommand::parse("9", &snapshot),
        Some(SessionCommand::Select(RecordId::from("9")))
    );
}

#[test]
fn free_text_selects_by_identifier() {
    assert_eq!(
        SessionCommand::parse("tt0076759", &loaded_snapshot()),
        Some(SessionCommand::Select(RecordId::from("tt0076759")))
    );
}
