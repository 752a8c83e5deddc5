//! Client settings shared by the controller and the CLI.

use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::DEFAULT_QUIET_PERIOD;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without the `/api/...` path.
    pub base_url: String,
    /// Quiet period a keystroke must be followed by before suggestions are fetched.
    pub quiet_period: Duration,
    pub request_timeout: Duration,
    /// Commit a search as soon as a suggestion is picked.
    pub search_on_select: bool,
    /// Where the theme preference is persisted.
    pub theme_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            quiet_period: DEFAULT_QUIET_PERIOD,
            request_timeout: Duration::from_secs(10),
            search_on_select: false,
            theme_path: PathBuf::from(".alumni-search/theme.json"),
        }
    }
}
