use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::labels::{day_key, league_name, score_text, team_crest};
use crate::scores_db::{Match, matches_on_date};

pub const NO_MATCHES_TODAY: &str = "No matches today";

/// The single row the "today" panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodaySummary {
    pub match_id: u64,
    pub home: String,
    pub away: String,
    pub home_crest: String,
    pub away_crest: String,
    pub score: String,
    pub time: String,
    pub league: String,
}

impl TodaySummary {
    pub fn from_match(m: &Match) -> Self {
        Self {
            match_id: m.match_id,
            home: m.home.clone(),
            away: m.away.clone(),
            home_crest: team_crest(&m.home),
            away_crest: team_crest(&m.away),
            score: score_text(m.home_goals, m.away_goals),
            time: m.time.clone(),
            league: league_name(m.league_id).to_string(),
        }
    }

    pub fn render_lines(&self) -> Vec<String> {
        vec![
            format!("[{}] {}", self.home_crest, self.home),
            format!("      {}   {}", self.score.trim(), self.time),
            format!("[{}] {}", self.away_crest, self.away),
            self.league.clone(),
        ]
    }

    pub fn one_line(&self) -> String {
        format!(
            "{} {} {}  {}",
            self.home_crest,
            self.score.trim(),
            self.away_crest,
            self.time
        )
    }
}

pub fn no_matches_lines() -> Vec<String> {
    vec![NO_MATCHES_TODAY.to_string()]
}

/// First match of `today` in kickoff order.
pub fn today_summary(conn: &Connection, today: NaiveDate) -> Result<Option<TodaySummary>> {
    let rows = matches_on_date(conn, &day_key(today))?;
    Ok(rows.first().map(TodaySummary::from_match))
}

pub fn render_today(summary: Option<&TodaySummary>) -> Vec<String> {
    match summary {
        Some(summary) => summary.render_lines(),
        None => no_matches_lines(),
    }
}
