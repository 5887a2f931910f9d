use std::fs;
use std::path::PathBuf;

use chrono::{FixedOffset, Utc};

use football_scores::fixtures_fetch::parse_fixtures_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_one_match_per_linked_entry() {
    let raw = read_fixture("fixtures_n2.json");
    let rows = parse_fixtures_json(&raw, &Utc).expect("fixture should parse");
    assert_eq!(rows.len(), 3);

    let first = &rows[0];
    assert_eq!(first.match_id, 147085);
    assert_eq!(first.league_id, 398);
    assert_eq!(first.home, "Swansea City FC");
    assert_eq!(first.away, "Chelsea FC");
    assert_eq!(first.date, "2015-08-15");
    assert_eq!(first.time, "16:30");
    assert_eq!(first.match_day, 2);
    assert_eq!(first.home_goals, None);
    assert_eq!(first.away_goals, None);
}

#[test]
fn finished_scores_are_copied() {
    let raw = read_fixture("fixtures_n2.json");
    let rows = parse_fixtures_json(&raw, &Utc).expect("fixture should parse");
    let played = rows.iter().find(|m| m.match_id == 147084).unwrap();
    assert_eq!(played.home_goals, Some(0));
    assert_eq!(played.away_goals, Some(1));
    assert!(played.is_played());
}

#[test]
fn negative_goals_mean_not_played() {
    let raw = read_fixture("fixtures_n2.json");
    let rows = parse_fixtures_json(&raw, &Utc).expect("fixture should parse");
    let cl = rows.iter().find(|m| m.match_id == 146492).unwrap();
    assert_eq!(cl.league_id, 362);
    assert_eq!(cl.match_day, 8);
    assert!(!cl.is_played());
}

#[test]
fn kickoff_follows_time_zone() {
    let raw = read_fixture("fixtures_n2.json");
    let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
    let rows = parse_fixtures_json(&raw, &plus_eight).expect("fixture should parse");
    let cl = rows.iter().find(|m| m.match_id == 146492).unwrap();
    assert_eq!(cl.date, "2015-08-17");
    assert_eq!(cl.time, "02:45");
}

#[test]
fn empty_and_null_payloads() {
    assert!(parse_fixtures_json("null", &Utc).unwrap().is_empty());
    assert!(parse_fixtures_json("   ", &Utc).unwrap().is_empty());
    assert!(parse_fixtures_json("{}", &Utc).unwrap().is_empty());
    assert!(parse_fixtures_json(r#"{"fixtures": null}"#, &Utc).unwrap().is_empty());
    let raw = read_fixture("fixtures_empty.json");
    assert!(parse_fixtures_json(&raw, &Utc).unwrap().is_empty());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(parse_fixtures_json("{\"fixtures\": [", &Utc).is_err());
}

#[test]
fn team_names_are_stored_as_sent() {
    let raw = r#"{"fixtures": [{
        "_links": {
            "self": {"href": "http://api.football-data.org/alpha/fixtures/150001"},
            "soccerseason": {"href": "http://api.football-data.org/alpha/soccerseasons/398"}
        },
        "date": "2015-08-22T14:00:00Z",
        "homeTeamName": "  Spaced FC ",
        "awayTeamName": "Stoke City FC\t",
        "result": {"goalsHomeTeam": null, "goalsAwayTeam": null},
        "matchday": 3
    }]}"#;
    let rows = parse_fixtures_json(raw, &Utc).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].home, "  Spaced FC ");
    assert_eq!(rows[0].away, "Stoke City FC\t");
}
