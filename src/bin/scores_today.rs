use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use football_scores::config::Config;
use football_scores::refresh::{RefreshOutcome, refresh_scores};
use football_scores::scores_db;
use football_scores::widget::{render_today, today_summary};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let db_path = parse_db_path_arg(&args)
        .or_else(|| config.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let mut conn = scores_db::open_db(&db_path)?;

    if args.iter().any(|arg| arg == "--refresh") {
        match refresh_scores(&mut conn, &config) {
            Ok(report) if report.outcome == RefreshOutcome::Offline => {
                eprintln!("offline: showing stored scores");
            }
            Ok(_) => {}
            Err(err) => eprintln!("refresh failed: {err:#}"),
        }
    }

    let summary = today_summary(&conn, Local::now().date_naive())?;
    if args.iter().any(|arg| arg == "--line") {
        match summary {
            Some(summary) => println!("{}", summary.one_line()),
            None => println!("-"),
        }
        return Ok(());
    }
    for line in render_today(summary.as_ref()) {
        println!("{line}");
    }
    Ok(())
}

fn parse_db_path_arg(args: &[String]) -> Option<PathBuf> {
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
