use std::collections::VecDeque;

use chrono::{NaiveDate, TimeDelta};

use crate::labels::{day_key, day_label, share_text};
use crate::refresh::{RefreshOutcome, RefreshReport};
use crate::scores_db::Match;
use crate::widget::TodaySummary;

pub const DAY_PAGES: usize = 5;
pub const TODAY_PAGE: usize = 2;
const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Retry,
    Ok,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub today: NaiveDate,
    pub day_page: usize,
    pub matches: Vec<Match>,
    /// Date key the rows in `matches` were loaded for.
    pub matches_date: Option<String>,
    pub selected: usize,
    pub detail_match_id: Option<u64>,
    pub today_summary: Option<TodaySummary>,
    pub offline_dialog: Option<DialogButton>,
    pub refreshing: bool,
    pub last_refresh: Option<String>,
    pub last_outcome: Option<RefreshOutcome>,
    pub reload_pending: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            day_page: TODAY_PAGE,
            matches: Vec::with_capacity(32),
            matches_date: None,
            selected: 0,
            detail_match_id: None,
            today_summary: None,
            offline_dialog: None,
            refreshing: false,
            last_refresh: None,
            last_outcome: None,
            reload_pending: false,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn page_date(&self, page: usize) -> NaiveDate {
        let offset = page as i64 - TODAY_PAGE as i64;
        self.today
            .checked_add_signed(TimeDelta::days(offset))
            .unwrap_or(self.today)
    }

    pub fn current_date(&self) -> NaiveDate {
        self.page_date(self.day_page)
    }

    pub fn current_day_key(&self) -> String {
        day_key(self.current_date())
    }

    /// Day offset of the current page relative to today (-2..=2).
    pub fn day_offset(&self) -> i64 {
        self.day_page as i64 - TODAY_PAGE as i64
    }

    pub fn set_day_offset(&mut self, offset: i64) {
        let page = (TODAY_PAGE as i64 + offset).clamp(0, DAY_PAGES as i64 - 1);
        self.day_page = page as usize;
    }

    pub fn page_labels(&self) -> Vec<String> {
        (0..DAY_PAGES)
            .map(|page| day_label(self.page_date(page), self.today))
            .collect()
    }

    pub fn next_day(&mut self) -> bool {
        if self.day_page + 1 >= DAY_PAGES {
            return false;
        }
        self.show_page(self.day_page + 1);
        true
    }

    pub fn prev_day(&mut self) -> bool {
        if self.day_page == 0 {
            return false;
        }
        self.show_page(self.day_page - 1);
        true
    }

    pub fn jump_to_today(&mut self) -> bool {
        if self.day_page == TODAY_PAGE {
            return false;
        }
        self.show_page(TODAY_PAGE);
        true
    }

    /// Switches page and drops the rows of the previous one until the new
    /// day's rows arrive.
    fn show_page(&mut self, page: usize) {
        self.day_page = page;
        self.selected = 0;
        self.matches.clear();
        self.matches_date = None;
    }

    /// Moves the pages when the wall clock crosses midnight.
    pub fn roll_today(&mut self, today: NaiveDate) -> bool {
        if today == self.today {
            return false;
        }
        self.today = today;
        true
    }

    pub fn select_next(&mut self) {
        let total = self.matches.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.matches.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.matches.len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches.get(self.selected)
    }

    /// Expands the selected row, or collapses it when it is already open.
    pub fn toggle_detail(&mut self) {
        let Some(id) = self.selected_match().map(|m| m.match_id) else {
            return;
        };
        if self.detail_match_id == Some(id) {
            self.detail_match_id = None;
        } else {
            self.detail_match_id = Some(id);
        }
    }

    pub fn is_detail_open(&self, match_id: u64) -> bool {
        self.detail_match_id == Some(match_id)
    }

    pub fn share_selected(&self) -> Option<String> {
        self.selected_match().map(share_text)
    }

    pub fn toggle_dialog_focus(&mut self) {
        self.offline_dialog = match self.offline_dialog {
            Some(DialogButton::Retry) => Some(DialogButton::Ok),
            Some(DialogButton::Ok) => Some(DialogButton::Retry),
            None => None,
        };
    }

    pub fn dismiss_dialog(&mut self) {
        self.offline_dialog = None;
    }

    /// Returns true once after new data was stored.
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_pending)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetDay { date: String, matches: Vec<Match> },
    SetToday(Option<TodaySummary>),
    RefreshStarted,
    RefreshFinished { report: RefreshReport, at: String },
    RefreshFailed(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Refresh,
    LoadDay { date: String },
    LoadToday,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetDay { date, matches } => {
            if date != state.current_day_key() {
                return;
            }
            let selected_id = if state.matches_date.as_deref() == Some(date.as_str()) {
                state.selected_match().map(|m| m.match_id)
            } else {
                None
            };
            state.matches = matches;
            state.matches_date = Some(date);
            if let Some(id) = selected_id
                && let Some(pos) = state.matches.iter().position(|m| m.match_id == id)
            {
                state.selected = pos;
            }
            state.clamp_selection();
        }
        Delta::SetToday(summary) => {
            state.today_summary = summary;
        }
        Delta::RefreshStarted => {
            state.refreshing = true;
        }
        Delta::RefreshFinished { report, at } => {
            state.refreshing = false;
            match report.outcome {
                RefreshOutcome::Stored { upserted, demo } => {
                    state.last_refresh = Some(at);
                    state.reload_pending = true;
                    let source = if demo { "demo fixtures" } else { "feed" };
                    state.push_log(format!("[INFO] Stored {upserted} matches from {source}"));
                }
                RefreshOutcome::Empty => {
                    state.last_refresh = Some(at);
                }
                RefreshOutcome::Offline => open_offline_dialog(state),
            }
            for err in report.errors.iter().take(3) {
                state.push_log(format!("[WARN] {err}"));
            }
            state.last_outcome = Some(report.outcome);
        }
        Delta::RefreshFailed(err) => {
            state.refreshing = false;
            state.push_log(format!("[WARN] Refresh failed: {err}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn open_offline_dialog(state: &mut AppState) {
    if state.offline_dialog.is_none() {
        state.offline_dialog = Some(DialogButton::Retry);
        state.push_log("[WARN] No network connection");
    }
}
