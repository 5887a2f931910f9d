use chrono::NaiveDate;

use crate::scores_db::Match;

pub const CHAMPIONS_LEAGUE: u32 = 362;
pub const SHARE_HASHTAG: &str = "#Football_Scores";

pub fn league_name(league_id: u32) -> &'static str {
    match league_id {
        351 | 394 => "1. Bundesliga",
        395 => "2. Bundesliga",
        403 => "3. Bundesliga",
        354 | 398 => "Premier League",
        357 | 401 => "Serie A",
        358 | 399 => "Primera Division",
        400 => "Segunda Division",
        396 => "Ligue 1",
        397 => "Ligue 2",
        402 => "Primeira Liga",
        404 => "Eredivisie",
        CHAMPIONS_LEAGUE => "UEFA Champions League",
        _ => "Unknown league",
    }
}

/// Champions League match days map onto tournament stages; every other
/// competition just shows the number.
pub fn match_day_label(match_day: u32, league_id: u32) -> String {
    if league_id != CHAMPIONS_LEAGUE {
        return format!("Matchday : {match_day}");
    }
    match match_day {
        0..=6 => format!("Group Stages, Matchday : {match_day}"),
        7 | 8 => "First Knockout round".to_string(),
        9 | 10 => "QuarterFinal".to_string(),
        11 | 12 => "SemiFinal".to_string(),
        _ => "Final".to_string(),
    }
}

pub fn score_text(home: Option<u32>, away: Option<u32>) -> String {
    match (home, away) {
        (Some(home), Some(away)) => format!("{home} - {away}"),
        _ => " - ".to_string(),
    }
}

pub fn share_text(m: &Match) -> String {
    format!(
        "{} {} {} {SHARE_HASHTAG}",
        m.home,
        score_text(m.home_goals, m.away_goals),
        m.away
    )
}

/// Short badge standing in for the club crest.
pub fn team_crest(name: &str) -> String {
    let badge = match name.trim() {
        "Arsenal FC" | "Arsenal London FC" => "ARS",
        "Chelsea FC" => "CHE",
        "Everton FC" => "EVE",
        "Leicester City" | "Leicester City FC" => "LEI",
        "Manchester United FC" => "MUN",
        "Manchester City FC" => "MCI",
        "Stoke City FC" => "STK",
        "Sunderland AFC" => "SUN",
        "Swansea City" | "Swansea City FC" => "SWA",
        "Tottenham Hotspur FC" => "TOT",
        "West Bromwich Albion" | "West Bromwich Albion FC" => "WBA",
        "West Ham United FC" => "WHU",
        _ => return abbreviate_team(name),
    };
    badge.to_string()
}

/// "Today", "Tomorrow", "Yesterday", otherwise the weekday name.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match date.signed_duration_since(today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%A").to_string(),
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn abbreviate_team(name: &str) -> String {
    const CLUB_TOKENS: &[&str] = &["FC", "AFC", "CF", "SV", "AS", "SC", "AC"];

    let trimmed = name.trim();
    if trimmed.chars().count() <= 3 {
        return trimmed.to_uppercase();
    }
    let words: Vec<&str> = trimmed
        .split_whitespace()
        .filter(|word| !CLUB_TOKENS.contains(word))
        .collect();
    let mut abbr = String::new();
    for word in &words {
        if let Some(ch) = word.chars().next() {
            abbr.push(ch);
        }
        if abbr.chars().count() >= 3 {
            break;
        }
    }
    if abbr.chars().count() >= 2 {
        return abbr.to_uppercase();
    }
    let base = words.first().copied().unwrap_or(trimmed);
    base.chars().take(3).collect::<String>().to_uppercase()
}
