//! Page fetching and document parsing.

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::Html;
use std::fmt;
use tracing::debug;

use super::query::page_url;
use super::SearchError;
use crate::config::ScraperConfig;
use crate::utils::HttpClient;

/// Fetches one page of a search listing.
///
/// Implementations return the page body; any failure is terminal for the
/// search that asked for it.
#[async_trait]
pub trait PageFetcher: Send + Sync + fmt::Debug {
    /// Fetch 1-based `page` of the listing at `search_url`
    async fn fetch_page(&self, search_url: &str, page: u32) -> Result<String, SearchError>;
}

/// Fetches pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: HttpClient,
}

impl HttpFetcher {
    /// Create a fetcher with the default 10 second timeout
    pub fn new() -> Result<Self, SearchError> {
        Self::from_config(&ScraperConfig::default())
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: HttpClient::from_config(config)?,
        })
    }

    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, search_url: &str, page: u32) -> Result<String, SearchError> {
        let url = page_url(search_url, page);
        debug!(page, url = %url, "Requesting search page");

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| SearchError::Transport {
                page,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            // Dropping the response here releases the connection
            return Err(SearchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| SearchError::Parse {
            page,
            message: e.to_string(),
        })
    }
}

/// Parse a fetched page into a document tree
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}
