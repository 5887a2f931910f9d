use rusqlite::Connection;

use football_scores::scores_db::{
    self, Match, all_matches, count_matches, match_by_id, matches_in_league, matches_on_date,
    upsert_matches,
};

fn open() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    scores_db::init_schema(&conn).expect("schema");
    conn
}

fn fixture(match_id: u64, date: &str, time: &str) -> Match {
    Match {
        match_id,
        league_id: 398,
        date: date.to_string(),
        time: time.to_string(),
        home: format!("Home {match_id}"),
        away: format!("Away {match_id}"),
        home_goals: None,
        away_goals: None,
        match_day: 3,
    }
}

#[test]
fn upsert_twice_keeps_one_row_with_latest_values() {
    let mut conn = open();
    upsert_matches(&mut conn, &[fixture(10, "2015-08-15", "15:00")]).unwrap();

    let mut updated = fixture(10, "2015-08-15", "15:00");
    updated.home_goals = Some(3);
    updated.away_goals = Some(2);
    updated.away = "Renamed".to_string();
    upsert_matches(&mut conn, &[updated.clone()]).unwrap();

    assert_eq!(count_matches(&conn).unwrap(), 1);
    assert_eq!(match_by_id(&conn, 10).unwrap(), Some(updated));
}

#[test]
fn date_query_is_exact_and_time_ordered() {
    let mut conn = open();
    upsert_matches(
        &mut conn,
        &[
            fixture(1, "2015-08-15", "18:30"),
            fixture(2, "2015-08-15", "12:45"),
            fixture(3, "2015-08-16", "10:00"),
            fixture(4, "2015-08-15", "15:00"),
            fixture(5, "2015-08-1", "09:00"),
        ],
    )
    .unwrap();

    let ids: Vec<u64> = matches_on_date(&conn, "2015-08-15")
        .unwrap()
        .iter()
        .map(|m| m.match_id)
        .collect();
    assert_eq!(ids, vec![2, 4, 1]);
    assert!(matches_on_date(&conn, "2015-08-17").unwrap().is_empty());
}

#[test]
fn league_and_full_listing() {
    let mut conn = open();
    let mut cl = fixture(7, "2015-08-14", "20:45");
    cl.league_id = 362;
    upsert_matches(
        &mut conn,
        &[fixture(8, "2015-08-15", "15:00"), cl, fixture(9, "2015-08-13", "15:00")],
    )
    .unwrap();

    let league: Vec<u64> = matches_in_league(&conn, 398)
        .unwrap()
        .iter()
        .map(|m| m.match_id)
        .collect();
    assert_eq!(league, vec![9, 8]);

    let all: Vec<u64> = all_matches(&conn).unwrap().iter().map(|m| m.match_id).collect();
    assert_eq!(all, vec![9, 7, 8]);
    assert_eq!(match_by_id(&conn, 999).unwrap(), None);
}

#[test]
fn refresh_runs_are_recorded() {
    let conn = open();
    assert!(scores_db::last_run(&conn).unwrap().is_none());

    let run_id = scores_db::begin_run(&conn).unwrap();
    scores_db::finish_run(&conn, run_id, "stored", 12, None).unwrap();

    let run = scores_db::last_run(&conn).unwrap().expect("run row");
    assert_eq!(run.run_id, run_id);
    assert_eq!(run.outcome.as_deref(), Some("stored"));
    assert_eq!(run.matches_stored, 12);
    assert!(run.finished_at.is_some());
    assert!(run.error.is_none());
}

#[test]
fn upsert_counts_distinct_matches() {
    let mut conn = open();
    let mut later = fixture(7, "2015-08-15", "15:00");
    later.home_goals = Some(2);
    let written = upsert_matches(
        &mut conn,
        &[
            fixture(7, "2015-08-15", "15:00"),
            fixture(8, "2015-08-15", "17:30"),
            later.clone(),
        ],
    )
    .unwrap();

    assert_eq!(written, 2);
    assert_eq!(count_matches(&conn).unwrap(), 2);
    assert_eq!(match_by_id(&conn, 7).unwrap(), Some(later));
}
