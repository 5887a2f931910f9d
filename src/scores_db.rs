use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// One fixture as stored locally. `date`/`time` are already in the
/// viewer's time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub match_id: u64,
    pub league_id: u32,
    pub date: String,
    pub time: String,
    pub home: String,
    pub away: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub match_day: u32,
}

impl Match {
    pub fn is_played(&self) -> bool {
        self.home_goals.is_some() && self.away_goals.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRun {
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub outcome: Option<String>,
    pub matches_stored: usize,
    pub error: Option<String>,
}

const MATCH_COLUMNS: &str = "match_id, league_id, date, time, home, away, home_goals, away_goals, match_day";

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS scores (
            match_id INTEGER PRIMARY KEY,
            league_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            home TEXT NOT NULL,
            away TEXT NOT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL,
            match_day INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_scores_date ON scores(date);
        CREATE INDEX IF NOT EXISTS idx_scores_league ON scores(league_id);

        CREATE TABLE IF NOT EXISTS refresh_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            outcome TEXT NULL,
            matches_stored INTEGER NOT NULL,
            error TEXT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_match(tx: &rusqlite::Transaction<'_>, m: &Match) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO scores (
            match_id, league_id, date, time, home, away,
            home_goals, away_goals, match_day, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(match_id) DO UPDATE SET
            league_id = excluded.league_id,
            date = excluded.date,
            time = excluded.time,
            home = excluded.home,
            away = excluded.away,
            home_goals = excluded.home_goals,
            away_goals = excluded.away_goals,
            match_day = excluded.match_day,
            updated_at = excluded.updated_at
        "#,
        params![
            m.match_id as i64,
            m.league_id as i64,
            m.date,
            m.time,
            m.home,
            m.away,
            m.home_goals,
            m.away_goals,
            m.match_day as i64,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert match {}", m.match_id))?;
    Ok(())
}

/// Upserts every row in one transaction and returns how many distinct
/// matches were written. Later duplicates of a match id win.
pub fn upsert_matches(conn: &mut Connection, matches: &[Match]) -> Result<usize> {
    let tx = conn.transaction().context("begin upsert transaction")?;
    let mut seen = HashSet::new();
    for m in matches {
        upsert_match(&tx, m)?;
        seen.insert(m.match_id);
    }
    tx.commit().context("commit upsert transaction")?;
    Ok(seen.len())
}

pub fn matches_on_date(conn: &Connection, date: &str) -> Result<Vec<Match>> {
    query_matches(
        conn,
        &format!(
            "SELECT {MATCH_COLUMNS} FROM scores WHERE date = ?1 ORDER BY time ASC, match_id ASC"
        ),
        params![date],
    )
}

pub fn matches_in_league(conn: &Connection, league_id: u32) -> Result<Vec<Match>> {
    query_matches(
        conn,
        &format!(
            "SELECT {MATCH_COLUMNS} FROM scores WHERE league_id = ?1 ORDER BY date ASC, time ASC, match_id ASC"
        ),
        params![league_id as i64],
    )
}

pub fn all_matches(conn: &Connection) -> Result<Vec<Match>> {
    query_matches(
        conn,
        &format!("SELECT {MATCH_COLUMNS} FROM scores ORDER BY date ASC, time ASC, match_id ASC"),
        params![],
    )
}

pub fn match_by_id(conn: &Connection, match_id: u64) -> Result<Option<Match>> {
    conn.query_row(
        &format!("SELECT {MATCH_COLUMNS} FROM scores WHERE match_id = ?1"),
        params![match_id as i64],
        match_from_row,
    )
    .optional()
    .with_context(|| format!("query match {match_id}"))
}

pub fn count_matches(conn: &Connection) -> Result<usize> {
    let count = conn
        .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get::<_, i64>(0))
        .context("count matches")?;
    Ok(count.max(0) as usize)
}

pub fn begin_run(conn: &Connection) -> Result<i64> {
    conn.execute(
        "INSERT INTO refresh_runs(started_at, finished_at, outcome, matches_stored, error)
         VALUES (?1, NULL, NULL, 0, NULL)",
        params![Utc::now().to_rfc3339()],
    )
    .context("insert refresh run")?;
    Ok(conn.last_insert_rowid())
}

pub fn finish_run(
    conn: &Connection,
    run_id: i64,
    outcome: &str,
    matches_stored: usize,
    error: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE refresh_runs
         SET finished_at = ?1, outcome = ?2, matches_stored = ?3, error = ?4
         WHERE run_id = ?5",
        params![
            Utc::now().to_rfc3339(),
            outcome,
            matches_stored as i64,
            error,
            run_id
        ],
    )
    .context("update refresh run")?;
    Ok(())
}

pub fn last_run(conn: &Connection) -> Result<Option<RefreshRun>> {
    conn.query_row(
        "SELECT run_id, started_at, finished_at, outcome, matches_stored, error
         FROM refresh_runs ORDER BY run_id DESC LIMIT 1",
        [],
        |row| {
            Ok(RefreshRun {
                run_id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                outcome: row.get(3)?,
                matches_stored: row.get::<_, i64>(4)?.max(0) as usize,
                error: row.get(5)?,
            })
        },
    )
    .optional()
    .context("query last refresh run")
}

fn query_matches(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Match>> {
    let mut stmt = conn.prepare(sql).context("prepare match query")?;
    let rows = stmt
        .query_map(params, match_from_row)
        .context("query matches")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode match row")?);
    }
    Ok(out)
}

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<Match> {
    Ok(Match {
        match_id: row.get::<_, i64>(0)? as u64,
        league_id: row.get::<_, u32>(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        home: row.get(4)?,
        away: row.get(5)?,
        home_goals: row.get(6)?,
        away_goals: row.get(7)?,
        match_day: row.get::<_, u32>(8)?,
    })
}
