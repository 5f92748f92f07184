use super::*;
use crate::error::ErrorKind;

fn decode(body: &str) -> Result<ResultSet, ErrorInfo> {
    SearchResponseDto::from_slice(body.as_bytes())?.into_result_set()
}

#[test]
fn maps_entries_in_server_order() {
    let set = decode(
        r#"{
            "Search": [
                {"Title": "Star Wars", "Year": "1977", "imdbID": "tt0076759", "Type": "movie",
                 "Poster": "https://m.media-amazon.com/images/sw.jpg"},
                {"Title": "The Empire Strikes Back", "Year": "1980", "imdbID": "tt0080684",
                 "Type": "movie", "Poster": "N/A"}
            ],
            "totalResults": "2",
            "Response": "True"
        }"#,
    )
    .expect("decode");

    assert_eq!(set.len(), 2);
    let first = &set.records()[0];
    assert_eq!(first.id.as_str(), "tt0076759");
    assert_eq!(first.title, "Star Wars");
    assert_eq!(first.year, "1977");
    assert_eq!(
        first.poster_url.as_deref(),
        Some("https://m.media-amazon.com/images/sw.jpg")
    );
    assert_eq!(set.records()[1].poster_url, None);
}

#[test]
fn drops_entries_missing_required_fields() {
    let set = decode(
        r#"{
            "Response": "True",
            "Search": [
                {"Title": "No Id", "Year": "1999", "Poster": "N/A"},
                {"Title": "Blank Id", "Year": "1999", "imdbID": "  ", "Poster": "N/A"},
                {"Year": "1999", "imdbID": "tt1", "Poster": "N/A"},
                {"Title": "No Poster", "Year": "1999", "imdbID": "tt2"},
                {"Title": 42, "Year": "1999", "imdbID": "tt3", "Poster": "N/A"},
                "not an object",
                {"Title": "Kept", "Year": "2001", "imdbID": "tt4", "Poster": "N/A"}
            ]
        }"#,
    )
    .expect("decode");

    let ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["tt4"]);
}

#[test]
fn false_response_carries_server_message_verbatim() {
    let err = decode(r#"{"Response": "False", "Error": "Movie not found!"}"#).expect_err("false");
    assert_eq!(err.kind, ErrorKind::NoResults);
    assert_eq!(err.message, "Movie not found!");
}

#[test]
fn false_response_without_message_is_still_no_results() {
    let err = decode(r#"{"Response": "False"}"#).expect_err("false");
    assert_eq!(err.kind, ErrorKind::NoResults);
    assert_eq!(err.message, "");
}

#[test]
fn unrecognized_envelopes_are_malformed() {
    for body in [
        "<html>oops</html>",
        "[]",
        r#"{"Search": []}"#,
        r#"{"Response": "Maybe"}"#,
        r#"{"Response": "True"}"#,
        r#"{"Response": "True", "Search": {"Title": "x"}}"#,
    ] {
        let err = decode(body).expect_err(body);
        assert_eq!(err.kind, ErrorKind::MalformedResponse, "body: {body}");
    }
}

#[test]
fn error_info_serializes_flat() {
    let info = ErrorInfo::http(503, "service unavailable");
    let json = serde_json::to_value(&info).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({"kind": "http_error", "status": 503, "message": "service unavailable"})
    );
    assert_eq!(info.to_string(), "http error 503: service unavailable");
}
