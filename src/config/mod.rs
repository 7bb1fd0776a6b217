//! Scraper configuration.
//!
//! Configuration is built in code; nothing is read from files or the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Site searched when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Scraper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Site base URL; search URLs and record links are built from it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for each page request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Last page number a search will request
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// How long the producer waits for the consumer to take a record.
    /// `None` (the default) waits for as long as the consumer holds the stream.
    /// When the wait runs out the stream ends with [`SearchError::Abandoned`].
    ///
    /// [`SearchError::Abandoned`]: crate::search::SearchError::Abandoned
    #[serde(default = "default_handoff_timeout")]
    pub handoff_timeout_secs: Option<u64>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_pages: default_max_pages(),
            handoff_timeout_secs: default_handoff_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ScraperConfig {
    /// Set the site base URL (a trailing slash is dropped)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the page ceiling
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set the handoff timeout in seconds (`None` disables it)
    pub fn handoff_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.handoff_timeout_secs = secs;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL without a trailing slash, however the config was built
    pub fn site_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn handoff_timeout(&self) -> Option<Duration> {
        self.handoff_timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_pages() -> u32 {
    100
}

fn default_handoff_timeout() -> Option<u64> {
    None
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}
