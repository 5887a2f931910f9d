use std::fmt::Display;

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeDelta, TimeZone};

use crate::fixtures_fetch::parse_fixtures_json;
use crate::scores_db::Match;

const DEMO_FIXTURES: &str = include_str!("../data/demo_fixtures.json");
const DEMO_PAGES: usize = 5;

/// Demo match ids start here, far above anything the feed hands out.
pub const DEMO_ID_BASE: u64 = 1 << 48;

/// Bundled fixtures used when the feed has nothing for the requested window.
///
/// Entry `i` is moved onto `today + (i % 5) - 2` so every day page has rows.
/// Its id becomes `DEMO_ID_BASE + id * 100 + i`, which keeps rebased copies
/// apart from each other and from live rows.
pub fn demo_matches<Tz>(today: NaiveDate, tz: &Tz) -> Result<Vec<Match>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let parsed = parse_fixtures_json(DEMO_FIXTURES, tz).context("bundled demo fixtures")?;
    let mut out = Vec::with_capacity(parsed.len());
    for (idx, mut m) in parsed.into_iter().enumerate() {
        let offset = (idx % DEMO_PAGES) as i64 - 2;
        let Some(date) = today.checked_add_signed(TimeDelta::days(offset)) else {
            continue;
        };
        m.date = date.format("%Y-%m-%d").to_string();
        m.match_id = m
            .match_id
            .checked_mul(100)
            .and_then(|id| id.checked_add(idx as u64))
            .and_then(|id| id.checked_add(DEMO_ID_BASE))
            .context("demo match id overflow")?;
        out.push(m);
    }
    Ok(out)
}
