use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;

use crate::config::Config;
use crate::refresh::refresh_scores;
use crate::scores_db;
use crate::state::{Delta, ProviderCommand};
use crate::widget;

const COMMAND_WAIT: Duration = Duration::from_millis(500);

/// Starts the worker that owns the database. It refreshes on start and every
/// `config.poll`, answers commands in between, and exits once the command
/// sender is dropped.
pub fn spawn_provider(
    config: Config,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut conn = match open_store(&config, &tx) {
            Ok(conn) => conn,
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Database unavailable: {err:#}")));
                return;
            }
        };

        let mut last_refresh: Option<Instant> = None;
        loop {
            let due = last_refresh
                .map(|at| at.elapsed() >= config.poll)
                .unwrap_or(true);
            if due {
                run_refresh(&mut conn, &config, &tx);
                last_refresh = Some(Instant::now());
            }

            match cmd_rx.recv_timeout(COMMAND_WAIT) {
                Ok(ProviderCommand::Refresh) => {
                    run_refresh(&mut conn, &config, &tx);
                    last_refresh = Some(Instant::now());
                }
                Ok(ProviderCommand::LoadDay { date }) => load_day(&conn, date, &tx),
                Ok(ProviderCommand::LoadToday) => load_today(&conn, &tx),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn open_store(config: &Config, tx: &Sender<Delta>) -> Result<Connection> {
    if let Some(path) = config.db_path.as_deref() {
        return scores_db::open_db(path);
    }
    let _ = tx.send(Delta::Log(
        "[WARN] No cache directory; scores kept in memory".to_string(),
    ));
    let conn = Connection::open_in_memory()?;
    scores_db::init_schema(&conn)?;
    Ok(conn)
}

fn run_refresh(conn: &mut Connection, config: &Config, tx: &Sender<Delta>) {
    let _ = tx.send(Delta::RefreshStarted);
    match refresh_scores(conn, config) {
        Ok(report) => {
            let at = Local::now().format("%H:%M").to_string();
            let _ = tx.send(Delta::RefreshFinished { report, at });
        }
        Err(err) => {
            let _ = tx.send(Delta::RefreshFailed(format!("{err:#}")));
        }
    }
}

fn load_day(conn: &Connection, date: String, tx: &Sender<Delta>) {
    match scores_db::matches_on_date(conn, &date) {
        Ok(matches) => {
            let _ = tx.send(Delta::SetDay { date, matches });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Load {date} failed: {err:#}")));
        }
    }
}

fn load_today(conn: &Connection, tx: &Sender<Delta>) {
    match widget::today_summary(conn, Local::now().date_naive()) {
        Ok(summary) => {
            let _ = tx.send(Delta::SetToday(summary));
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Today panel failed: {err:#}")));
        }
    }
}
