use super::*;

#[test]
fn log_level_defaults_to_info() {
    let args = Args::try_parse_from(["film_search"]).expect("parse");
    assert_eq!(args.log_level, "info");
}

#[test]
fn interactive_conflicts_with_json() {
    assert!(Args::try_parse_from(["film_search", "--interactive", "--json"]).is_err());
}
