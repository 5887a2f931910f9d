pub mod config;
pub mod connectivity;
pub mod demo_feed;
pub mod fixtures_fetch;
pub mod http_cache;
pub mod http_client;
pub mod labels;
pub mod persist;
pub mod provider;
pub mod refresh;
pub mod scores_db;
pub mod state;
pub mod widget;
