use std::path::PathBuf;

use anyhow::{Context, Result};

use football_scores::config::Config;
use football_scores::refresh::{RefreshOutcome, refresh_scores};
use football_scores::scores_db;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    let db_path = parse_db_path_arg()
        .or_else(|| config.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let mut conn = scores_db::open_db(&db_path)?;

    let report = refresh_scores(&mut conn, &config)?;
    println!("Scores refresh: {}", report.outcome.label());
    println!("DB: {}", db_path.display());
    println!("Time frames: {}", config.time_frames.join(","));
    match report.outcome {
        RefreshOutcome::Offline => {
            eprintln!("No network connection to {}", config.api_base);
        }
        RefreshOutcome::Empty => println!("Feed returned no matches for the configured leagues"),
        RefreshOutcome::Stored { upserted, demo } => {
            println!("Matches upserted: {upserted}{}", if demo { " (demo)" } else { "" });
        }
    }
    println!("Matches stored: {}", scores_db::count_matches(&conn)?);
    if !report.errors.is_empty() {
        println!("  errors: {}", report.errors.len());
        for err in report.errors.iter().take(6) {
            println!("   - {err}");
        }
    }

    if report.outcome == RefreshOutcome::Offline {
        std::process::exit(2);
    }
    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
