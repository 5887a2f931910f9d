use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ETAG, HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 2;
const CACHE_DIR: &str = "football_scores";
const CACHE_FILE: &str = "http_cache.json";
/// Feed bodies not revalidated for this long are dropped on the next write.
const MAX_ENTRY_AGE_SECS: u64 = 2 * 24 * 60 * 60;

static CACHE: Mutex<Option<FeedCache>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct FeedCache {
    version: u32,
    bodies: HashMap<String, CachedBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedBody {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    stored_at: u64,
}

impl CachedBody {
    fn validators(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(etag) = self.etag.as_deref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = self.last_modified.as_deref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
        req
    }
}

/// GET `url`, revalidating against the last stored body. A 304 answers with
/// the stored body; any other non-success status is an error.
pub fn fetch_json_cached(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
) -> Result<String> {
    let stored = lock_cache().as_ref().and_then(|c| c.bodies.get(url).cloned());

    let mut req = client.get(url);
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }
    if let Some(stored) = stored.as_ref() {
        req = stored.validators(req);
    }

    let resp = req.send().with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        let mut stored = stored.ok_or_else(|| anyhow!("304 for {url} with nothing stored"))?;
        stored.stored_at = now_secs();
        let body = stored.body.clone();
        remember(url, stored);
        return Ok(body);
    }

    let headers = resp.headers().clone();
    let body = resp.text().context("read feed body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {body}"));
    }

    remember(
        url,
        CachedBody {
            body: body.clone(),
            etag: header_text(&headers, ETAG),
            last_modified: header_text(&headers, LAST_MODIFIED),
            stored_at: now_secs(),
        },
    );
    Ok(body)
}

/// Per-user cache directory shared by the database, the HTTP cache and the
/// saved UI state.
pub fn app_cache_dir() -> Option<PathBuf> {
    let xdg = std::env::var("XDG_CACHE_HOME").unwrap_or_default();
    if !xdg.trim().is_empty() {
        return Some(PathBuf::from(xdg).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok().filter(|h| !h.trim().is_empty())?;
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn lock_cache() -> MutexGuard<'static, Option<FeedCache>> {
    let mut guard = CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_none() {
        *guard = Some(read_cache_file());
    }
    guard
}

fn remember(url: &str, body: CachedBody) {
    let mut guard = lock_cache();
    let cache = guard.get_or_insert_with(FeedCache::default);
    cache.version = CACHE_VERSION;
    cache.bodies.insert(url.to_string(), body);
    prune_stale(&mut cache.bodies, now_secs(), MAX_ENTRY_AGE_SECS);
    let _ = write_cache_file(cache);
}

fn prune_stale(bodies: &mut HashMap<String, CachedBody>, now: u64, max_age: u64) {
    bodies.retain(|_, entry| now.saturating_sub(entry.stored_at) <= max_age);
}

fn read_cache_file() -> FeedCache {
    cache_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|raw| serde_json::from_str::<FeedCache>(&raw).ok())
        .filter(|cache| cache.version == CACHE_VERSION)
        .unwrap_or_default()
}

fn write_cache_file(cache: &FeedCache) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create cache dir")?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(stored_at: u64) -> CachedBody {
        CachedBody {
            body: "{}".to_string(),
            etag: Some("\"abc\"".to_string()),
            last_modified: None,
            stored_at,
        }
    }

    #[test]
    fn stale_bodies_are_evicted() {
        let mut bodies = HashMap::new();
        bodies.insert("fixtures?timeFrame=n2".to_string(), body(1_000));
        bodies.insert("fixtures?timeFrame=p2".to_string(), body(9_000));
        bodies.insert("fixtures?timeFrame=n7".to_string(), body(10_000));

        prune_stale(&mut bodies, 10_000, 5_000);

        let mut kept: Vec<_> = bodies.keys().cloned().collect();
        kept.sort();
        assert_eq!(kept, vec!["fixtures?timeFrame=n7", "fixtures?timeFrame=p2"]);
    }

    #[test]
    fn clock_skew_keeps_entries() {
        let mut bodies = HashMap::new();
        bodies.insert("fixtures?timeFrame=n2".to_string(), body(20_000));
        prune_stale(&mut bodies, 10_000, 5_000);
        assert_eq!(bodies.len(), 1);
    }
}
