use std::fs;
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use football_scores::config::Config;
use football_scores::demo_feed::DEMO_ID_BASE;
use football_scores::refresh::{RefreshOutcome, ingest_payloads, refresh_scores};
use football_scores::scores_db;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn open() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    scores_db::init_schema(&conn).expect("schema");
    conn
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn config(league_ids: Vec<u32>, demo_fallback: bool) -> Config {
    Config {
        league_ids,
        demo_fallback,
        db_path: None,
        ..Config::default()
    }
}

#[test]
fn stores_only_configured_leagues() {
    let mut conn = open();
    let bodies = vec![read_fixture("fixtures_n2.json")];
    let report = ingest_payloads(&mut conn, &bodies, &config(vec![398], false), today(), &Utc)
        .expect("ingest");

    assert_eq!(
        report.outcome,
        RefreshOutcome::Stored {
            upserted: 2,
            demo: false
        }
    );
    assert_eq!(scores_db::count_matches(&conn).unwrap(), 2);
    assert!(scores_db::match_by_id(&conn, 146492).unwrap().is_none());
}

#[test]
fn empty_league_filter_keeps_every_entry() {
    let mut conn = open();
    let bodies = vec![read_fixture("fixtures_n2.json")];
    ingest_payloads(&mut conn, &bodies, &config(Vec::new(), false), today(), &Utc).unwrap();
    assert_eq!(scores_db::count_matches(&conn).unwrap(), 3);
}

#[test]
fn repeated_refresh_is_idempotent() {
    let mut conn = open();
    let bodies = vec![read_fixture("fixtures_n2.json"), read_fixture("fixtures_n2.json")];
    let cfg = config(Vec::new(), false);
    ingest_payloads(&mut conn, &bodies, &cfg, today(), &Utc).unwrap();
    let report = ingest_payloads(&mut conn, &bodies, &cfg, today(), &Utc).unwrap();
    assert_eq!(report.outcome.upserted(), 3);
    assert_eq!(scores_db::count_matches(&conn).unwrap(), 3);
    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(run.matches_stored, 3);
}

#[test]
fn empty_feed_without_fallback_stores_nothing() {
    let mut conn = open();
    let bodies = vec![read_fixture("fixtures_empty.json")];
    let report =
        ingest_payloads(&mut conn, &bodies, &config(Vec::new(), false), today(), &Utc).unwrap();

    assert_eq!(report.outcome, RefreshOutcome::Empty);
    assert_eq!(scores_db::count_matches(&conn).unwrap(), 0);
    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(run.outcome.as_deref(), Some("empty"));
}

#[test]
fn empty_feed_falls_back_to_demo_fixtures() {
    let mut conn = open();
    let bodies = vec![read_fixture("fixtures_empty.json")];
    let report =
        ingest_payloads(&mut conn, &bodies, &config(Vec::new(), true), today(), &Utc).unwrap();

    assert_eq!(
        report.outcome,
        RefreshOutcome::Stored {
            upserted: 10,
            demo: true
        }
    );
    for offset in -2..=2 {
        let date = today() + chrono::TimeDelta::days(offset);
        let rows = scores_db::matches_on_date(&conn, &date.format("%Y-%m-%d").to_string())
            .unwrap();
        assert_eq!(rows.len(), 2, "two demo rows on {date}");
    }
    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(run.outcome.as_deref(), Some("stored_demo"));
    assert_eq!(run.matches_stored, 10);
}

#[test]
fn filtered_out_feed_is_empty_not_demo() {
    let mut conn = open();
    let bodies = vec![read_fixture("fixtures_n2.json")];
    let report =
        ingest_payloads(&mut conn, &bodies, &config(vec![1], true), today(), &Utc).unwrap();
    assert_eq!(report.outcome, RefreshOutcome::Empty);
}

#[test]
fn one_bad_payload_is_reported_but_not_fatal() {
    let mut conn = open();
    let bodies = vec!["{ not json".to_string(), read_fixture("fixtures_n2.json")];
    let report =
        ingest_payloads(&mut conn, &bodies, &config(Vec::new(), false), today(), &Utc).unwrap();
    assert_eq!(report.outcome.upserted(), 3);
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn only_bad_payloads_fail_and_are_recorded() {
    let mut conn = open();
    let bodies = vec!["{ not json".to_string()];
    let result = ingest_payloads(&mut conn, &bodies, &config(Vec::new(), true), today(), &Utc);
    assert!(result.is_err());

    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(run.outcome.as_deref(), Some("failed"));
    assert!(run.error.is_some());
}

fn local_config(port: u16) -> Config {
    Config {
        api_base: format!("http://127.0.0.1:{port}/alpha/"),
        net_timeout: Duration::from_millis(300),
        ..config(Vec::new(), true)
    }
}

#[test]
fn unreachable_feed_is_offline_and_recorded() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut conn = open();
    let report = refresh_scores(&mut conn, &local_config(port)).expect("offline is not an error");

    assert_eq!(report.outcome, RefreshOutcome::Offline);
    assert_eq!(scores_db::count_matches(&conn).unwrap(), 0);
    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(report.run_id, Some(run.run_id));
    assert_eq!(run.outcome.as_deref(), Some("offline"));
    assert_eq!(run.matches_stored, 0);
}

#[test]
fn every_frame_failing_records_a_failed_run() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming() {
            drop(stream);
        }
    });

    let mut conn = open();
    let err = refresh_scores(&mut conn, &local_config(port)).expect_err("no body was served");
    let message = format!("{err:#}");
    assert!(message.contains("n2:"), "{message}");
    assert!(message.contains("p2:"), "{message}");

    assert_eq!(scores_db::count_matches(&conn).unwrap(), 0);
    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(run.outcome.as_deref(), Some("failed"));
    assert!(run.error.as_deref().is_some_and(|e| e.contains("n2:")));
}

#[test]
fn demo_rows_never_replace_live_rows() {
    let mut conn = open();
    let cfg = config(Vec::new(), true);
    ingest_payloads(&mut conn, &[read_fixture("fixtures_n2.json")], &cfg, today(), &Utc).unwrap();
    let live = scores_db::match_by_id(&conn, 147085).unwrap().expect("live row");

    ingest_payloads(&mut conn, &[read_fixture("fixtures_empty.json")], &cfg, today(), &Utc)
        .unwrap();

    assert_eq!(scores_db::count_matches(&conn).unwrap(), 13);
    assert_eq!(scores_db::match_by_id(&conn, 147085).unwrap(), Some(live));
    let demo_ids = scores_db::all_matches(&conn)
        .unwrap()
        .into_iter()
        .filter(|m| m.match_id >= DEMO_ID_BASE)
        .count();
    assert_eq!(demo_ids, 10);
}
