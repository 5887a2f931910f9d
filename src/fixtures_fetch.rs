use std::fmt::Display;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::Deserialize;

use crate::config::Config;
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::scores_db::Match;

const AUTH_HEADER: &str = "X-Auth-Token";

pub fn fixtures_url(api_base: &str, time_frame: &str) -> String {
    let base = api_base.trim_end_matches('/');
    format!("{base}/fixtures?timeFrame={time_frame}")
}

pub fn fetch_fixtures_body(config: &Config, time_frame: &str) -> Result<String> {
    let client = http_client()?;
    let url = fixtures_url(&config.api_base, time_frame);
    let mut headers = Vec::new();
    if let Some(key) = config.api_key.as_deref() {
        headers.push((AUTH_HEADER, key));
    }
    fetch_json_cached(client, &url, &headers)
        .with_context(|| format!("fetch fixtures ({time_frame})"))
}

#[derive(Debug, Deserialize)]
struct FixturesResponse {
    #[serde(default)]
    fixtures: Option<Vec<FeedFixture>>,
}

#[derive(Debug, Deserialize)]
struct FeedFixture {
    #[serde(rename = "_links", default)]
    links: FeedLinks,
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "homeTeamName", default)]
    home_team_name: Option<String>,
    #[serde(rename = "awayTeamName", default)]
    away_team_name: Option<String>,
    #[serde(default)]
    result: Option<FeedResult>,
    #[serde(default)]
    matchday: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedLinks {
    #[serde(rename = "self", default)]
    self_link: Option<FeedHref>,
    #[serde(default)]
    soccerseason: Option<FeedHref>,
}

#[derive(Debug, Deserialize)]
struct FeedHref {
    #[serde(default)]
    href: String,
}

#[derive(Debug, Deserialize)]
struct FeedResult {
    #[serde(rename = "goalsHomeTeam", default)]
    goals_home_team: Option<i64>,
    #[serde(rename = "goalsAwayTeam", default)]
    goals_away_team: Option<i64>,
}

/// Parses a fixtures payload into one `Match` per entry that carries a match
/// link. Kickoff times are moved into `tz` before being split.
pub fn parse_fixtures_json<Tz>(raw: &str, tz: &Tz) -> Result<Vec<Match>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: FixturesResponse =
        serde_json::from_str(trimmed).context("invalid fixtures json")?;

    let mut out = Vec::new();
    for fixture in data.fixtures.unwrap_or_default() {
        let Some(match_id) = fixture
            .links
            .self_link
            .as_ref()
            .and_then(|link| id_from_href(&link.href))
        else {
            continue;
        };
        let league_id = fixture
            .links
            .soccerseason
            .as_ref()
            .and_then(|link| id_from_href(&link.href))
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(0);
        let (date, time) = fixture
            .date
            .as_deref()
            .and_then(|raw| split_kickoff(raw, tz))
            .unwrap_or_default();
        let (home_goals, away_goals) = match fixture.result {
            Some(result) => (
                goals(result.goals_home_team),
                goals(result.goals_away_team),
            ),
            None => (None, None),
        };

        out.push(Match {
            match_id,
            league_id,
            date,
            time,
            home: fixture.home_team_name.unwrap_or_default(),
            away: fixture.away_team_name.unwrap_or_default(),
            home_goals,
            away_goals,
            match_day: fixture
                .matchday
                .and_then(|day| u32::try_from(day).ok())
                .unwrap_or(0),
        });
    }
    Ok(out)
}

/// Splits an RFC 3339 kickoff into `YYYY-MM-DD` and `HH:MM` in `tz`.
/// Unparseable timestamps are split textually around the `T`.
pub fn split_kickoff<Tz>(raw: &str, tz: &Tz) -> Option<(String, String)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(cleaned) {
        let local = parsed.with_timezone(tz);
        return Some((
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M").to_string(),
        ));
    }

    let (date, time) = cleaned.split_once(['T', ' ']).unwrap_or((cleaned, ""));
    let time = time.trim_end_matches('Z').chars().take(5).collect::<String>();
    Some((date.to_string(), time))
}

/// Last path segment of a feed link, e.g. `.../fixtures/147075` → 147075.
pub fn id_from_href(href: &str) -> Option<u64> {
    href.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u64>().ok())
}

fn goals(raw: Option<i64>) -> Option<u32> {
    raw.and_then(|value| u32::try_from(value).ok())
}
