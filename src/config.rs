use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::http_cache::app_cache_dir;

pub const DEFAULT_API_BASE: &str = "http://api.football-data.org/alpha/";
const DEFAULT_TIME_FRAMES: &[&str] = &["n2", "p2"];
// Premier League, Serie A, 1. Bundesliga, 2. Bundesliga, Primera Division.
const DEFAULT_LEAGUE_IDS: &[u32] = &[398, 401, 394, 395, 399];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub api_key: Option<String>,
    pub time_frames: Vec<String>,
    pub league_ids: Vec<u32>,
    pub poll: Duration,
    pub net_timeout: Duration,
    pub demo_fallback: bool,
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            time_frames: DEFAULT_TIME_FRAMES.iter().map(|s| s.to_string()).collect(),
            league_ids: DEFAULT_LEAGUE_IDS.to_vec(),
            poll: Duration::from_secs(300),
            net_timeout: Duration::from_secs(3),
            demo_fallback: true,
            db_path: default_db_path(),
        }
    }
}

impl Config {
    /// Reads the process environment. Call after `dotenvy` has loaded any
    /// `.env.local` / `.env` files.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = opt_env("SCORES_API_BASE")
            .map(normalize_base)
            .unwrap_or(defaults.api_base);
        let api_key = opt_env("FOOTBALL_DATA_API_KEY");
        let time_frames = opt_env("SCORES_TIME_FRAMES")
            .map(|raw| parse_frames(&raw))
            .filter(|frames| !frames.is_empty())
            .unwrap_or(defaults.time_frames);
        let league_ids = match env::var("SCORES_LEAGUE_IDS") {
            Ok(raw) => parse_ids(&raw),
            Err(_) => defaults.league_ids,
        };
        let poll = Duration::from_secs(
            env::var("SCORES_POLL_SECS")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(300)
                .max(30),
        );
        let net_timeout = Duration::from_secs(
            env::var("SCORES_NET_TIMEOUT_SECS")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(3)
                .clamp(1, 30),
        );
        let demo_fallback = opt_env("SCORES_DEMO_FALLBACK")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(true);
        let db_path = opt_env("SCORES_DB")
            .map(PathBuf::from)
            .or(defaults.db_path);

        Self {
            api_base,
            api_key,
            time_frames,
            league_ids,
            poll,
            net_timeout,
            demo_fallback,
            db_path,
        }
    }

    pub fn accepts_league(&self, league_id: u32) -> bool {
        self.league_ids.is_empty() || self.league_ids.contains(&league_id)
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("scores.sqlite"))
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn normalize_base(raw: String) -> String {
    if raw.ends_with('/') {
        raw
    } else {
        format!("{raw}/")
    }
}

fn parse_frames(raw: &str) -> Vec<String> {
    raw.split([',', ';', ' '])
        .map(str::trim)
        .filter(|frame| is_time_frame(frame))
        .map(str::to_string)
        .collect()
}

/// `n<days>` or `p<days>`, as the feed accepts them.
fn is_time_frame(frame: &str) -> bool {
    let mut chars = frame.chars();
    matches!(chars.next(), Some('n' | 'p'))
        && !chars.as_str().is_empty()
        && chars.as_str().chars().all(|ch| ch.is_ascii_digit())
}

pub fn parse_ids(raw: &str) -> Vec<u32> {
    let mut out = Vec::new();
    for id in raw
        .split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|id| *id != 0)
    {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
