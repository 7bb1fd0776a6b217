//! Mock page fetcher for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{PageFetcher, SearchError};

/// Empty listing served for pages that were not configured
const EMPTY_PAGE: &str = "<html><body></body></html>";

/// Canned outcome for one page
#[derive(Debug, Clone)]
pub enum MockPage {
    /// A 200 response with this body
    Html(String),
    /// A response with this (non-200) status
    Status(u16),
    /// The request itself fails
    TransportFailure(String),
    /// The body cannot be read
    ParseFailure(String),
}

/// A fetcher that serves predefined pages and records what it was asked for.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<u32, MockPage>>,
    requests: Mutex<Vec<(String, u32)>>,
    delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `outcome` for `page`
    pub fn with_page(self, page: u32, outcome: MockPage) -> Self {
        self.set_page(page, outcome);
        self
    }

    /// Wait this long before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_page(&self, page: u32, outcome: MockPage) {
        lock(&self.pages).insert(page, outcome);
    }

    /// Page numbers requested so far, in request order
    pub fn requested_pages(&self) -> Vec<u32> {
        lock(&self.requests).iter().map(|(_, page)| *page).collect()
    }

    /// Search URLs requested so far, in request order
    pub fn requested_urls(&self) -> Vec<String> {
        lock(&self.requests)
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, search_url: &str, page: u32) -> Result<String, SearchError> {
        lock(&self.requests).push((search_url.to_string(), page));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = lock(&self.pages).get(&page).cloned();
        match outcome {
            None => Ok(EMPTY_PAGE.to_string()),
            Some(MockPage::Html(body)) => Ok(body),
            Some(MockPage::Status(status)) => Err(SearchError::Status { page, status }),
            Some(MockPage::TransportFailure(message)) => {
                Err(SearchError::Transport { page, message })
            }
            Some(MockPage::ParseFailure(message)) => Err(SearchError::Parse { page, message }),
        }
    }
}
