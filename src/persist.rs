use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_cache::app_cache_dir;
use crate::state::AppState;

const UI_FILE: &str = "ui_state.json";
const UI_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
struct UiStateFile {
    version: u32,
    #[serde(default)]
    day_offset: i64,
    #[serde(default)]
    detail_match_id: Option<u64>,
}

pub fn load_into_state(state: &mut AppState) {
    if let Some(path) = ui_state_path() {
        load_from(&path, state);
    }
}

pub fn save_from_state(state: &AppState) {
    if let Some(path) = ui_state_path() {
        save_to(&path, state);
    }
}

/// Restores the day page and expanded match. Missing, unreadable or
/// other-version files leave the state untouched.
pub fn load_from(path: &Path, state: &mut AppState) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let Ok(file) = serde_json::from_str::<UiStateFile>(&raw) else {
        return;
    };
    if file.version != UI_VERSION {
        return;
    }
    state.set_day_offset(file.day_offset);
    state.detail_match_id = file.detail_match_id;
}

pub fn save_to(path: &Path, state: &AppState) {
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let file = UiStateFile {
        version: UI_VERSION,
        day_offset: state.day_offset(),
        detail_match_id: state.detail_match_id,
    };
    if let Ok(json) = serde_json::to_string(&file) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, path);
        }
    }
}

fn ui_state_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(UI_FILE))
}
