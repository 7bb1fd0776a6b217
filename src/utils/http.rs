//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;

use crate::config::ScraperConfig;
use crate::search::SearchError;

/// Shared HTTP client configured from [`ScraperConfig`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client with the default configuration (10 second timeout)
    pub fn new() -> Result<Self, SearchError> {
        Self::from_config(&ScraperConfig::default())
    }

    /// Create a client using the timeout and user agent from `config`
    pub fn from_config(config: &ScraperConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SearchError::Client(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url)
    }
}
