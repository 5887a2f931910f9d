use std::fmt::Display;

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate, TimeZone};
use rusqlite::Connection;

use crate::config::Config;
use crate::connectivity;
use crate::demo_feed::demo_matches;
use crate::fixtures_fetch::{fetch_fixtures_body, parse_fixtures_json};
use crate::scores_db::{self, Match};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Stored { upserted: usize, demo: bool },
    /// The feed had nothing usable; the UI is left as it is.
    Empty,
    Offline,
}

impl RefreshOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Stored { demo: false, .. } => "stored",
            RefreshOutcome::Stored { demo: true, .. } => "stored_demo",
            RefreshOutcome::Empty => "empty",
            RefreshOutcome::Offline => "offline",
        }
    }

    pub fn upserted(&self) -> usize {
        match self {
            RefreshOutcome::Stored { upserted, .. } => *upserted,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub outcome: RefreshOutcome,
    pub run_id: Option<i64>,
    pub errors: Vec<String>,
}

/// Connectivity check, then one fetch per configured time frame, then
/// [`ingest_payloads`]. Runs to completion; nothing is retried.
pub fn refresh_scores(conn: &mut Connection, config: &Config) -> Result<RefreshReport> {
    if !connectivity::is_online(&config.api_base, config.net_timeout) {
        let outcome = RefreshOutcome::Offline;
        let run_id = scores_db::begin_run(conn)?;
        scores_db::finish_run(conn, run_id, outcome.label(), 0, None)?;
        return Ok(RefreshReport {
            outcome,
            run_id: Some(run_id),
            errors: Vec::new(),
        });
    }

    let mut bodies = Vec::new();
    let mut errors = Vec::new();
    for frame in &config.time_frames {
        match fetch_fixtures_body(config, frame) {
            Ok(body) => bodies.push(body),
            Err(err) => errors.push(format!("{frame}: {err:#}")),
        }
    }

    if bodies.is_empty() {
        let run_id = scores_db::begin_run(conn)?;
        let message = if errors.is_empty() {
            "no time frames configured".to_string()
        } else {
            errors.join("; ")
        };
        scores_db::finish_run(conn, run_id, "failed", 0, Some(&message))?;
        return Err(anyhow!("fixtures fetch failed: {message}"));
    }

    let mut report = ingest_payloads(conn, &bodies, config, Local::now().date_naive(), &Local)?;
    errors.append(&mut report.errors);
    report.errors = errors;
    Ok(report)
}

/// Parses raw feed bodies, keeps the configured leagues and upserts the
/// result. Falls back to the bundled demo fixtures when the feed returned no
/// entries at all and the fallback is enabled. Every call is recorded as a
/// refresh run.
pub fn ingest_payloads<Tz>(
    conn: &mut Connection,
    bodies: &[String],
    config: &Config,
    today: NaiveDate,
    tz: &Tz,
) -> Result<RefreshReport>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let run_id = scores_db::begin_run(conn)?;
    match ingest_inner(conn, bodies, config, today, tz) {
        Ok((outcome, errors)) => {
            scores_db::finish_run(
                conn,
                run_id,
                outcome.label(),
                outcome.upserted(),
                errors.first().map(String::as_str),
            )?;
            Ok(RefreshReport {
                outcome,
                run_id: Some(run_id),
                errors,
            })
        }
        Err(err) => {
            let _ = scores_db::finish_run(conn, run_id, "failed", 0, Some(&format!("{err:#}")));
            Err(err)
        }
    }
}

fn ingest_inner<Tz>(
    conn: &mut Connection,
    bodies: &[String],
    config: &Config,
    today: NaiveDate,
    tz: &Tz,
) -> Result<(RefreshOutcome, Vec<String>)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut errors = Vec::new();
    let mut parsed: Vec<Match> = Vec::new();
    for (idx, body) in bodies.iter().enumerate() {
        match parse_fixtures_json(body, tz) {
            Ok(mut rows) => parsed.append(&mut rows),
            Err(err) => errors.push(format!("payload {idx}: {err:#}")),
        }
    }
    if !bodies.is_empty() && errors.len() == bodies.len() {
        return Err(anyhow!("no parseable payloads: {}", errors.join("; ")));
    }

    let mut demo = false;
    if parsed.is_empty() && config.demo_fallback {
        parsed = demo_matches(today, tz)?;
        demo = true;
    }

    let rows: Vec<Match> = parsed
        .into_iter()
        .filter(|m| config.accepts_league(m.league_id))
        .collect();
    if rows.is_empty() {
        return Ok((RefreshOutcome::Empty, errors));
    }

    let upserted = scores_db::upsert_matches(conn, &rows)?;
    Ok((RefreshOutcome::Stored { upserted, demo }, errors))
}
