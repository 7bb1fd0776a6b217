//! Paginated search over the site's HTML result listings.
//!
//! A search walks the listing page by page, extracts one record per result
//! block and streams the records to the caller as they are ready. Each
//! search runs as its own tokio task and owns its page cursor, result
//! counter and current page exclusively.
//!
//! # Stream termination
//!
//! A [`RecordStream`] ends in one of three ways:
//!
//! 1. The result cap is reached: exactly `max_results` records are followed by
//!    one [`SearchError::CapReached`] item.
//! 2. A page fails to load or read: one [`SearchError::Transport`],
//!    [`SearchError::Status`] or [`SearchError::Parse`] item follows the
//!    records already delivered.
//! 3. The page ceiling is reached: the stream simply ends.
//! 4. A handoff timeout is configured and the consumer did not take a record
//!    in time: the records already queued are followed by one
//!    [`SearchError::Abandoned`] item.
//!
//! Nothing is retried. Pages without result blocks are skipped silently.
//!
//! # Example
//!
//! ```rust,no_run
//! use github_scraper::models::SortOption;
//! use github_scraper::search::Scraper;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scraper = Scraper::new()?;
//! let mut stream = scraper.search_repositories(SortOption::REPOSITORY_MOST_STARS, "go", 20);
//! while let Some(item) = stream.next().await {
//!     match item {
//!         Ok(repo) => println!("{} {}", repo.name, repo.stars),
//!         Err(e) if e.is_cap_reached() => break,
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod fetch;
pub mod mock;
mod query;

pub use fetch::{parse_document, HttpFetcher, PageFetcher};
pub use mock::{MockFetcher, MockPage};
pub use query::{build_search_url, page_url};

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::config::ScraperConfig;
use crate::extractors::{
    CommitExtractor, Extractor, IssueExtractor, RepositoryExtractor, UserExtractor,
};
use crate::models::{Commit, Issue, Repository, SearchRequest, SortOption, User};
use crate::utils::RecordStream;
use engine::{EngineSettings, Outlet};

/// Errors produced by a search.
///
/// Every variant except [`SearchError::InvalidSelector`] and
/// [`SearchError::Client`] arrives in-band as the last item of a stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Network failure: DNS, connection, timeout
    #[error("Failed to load page {page}: {message}")]
    Transport { page: u32, message: String },

    /// The page answered with a status other than 200
    #[error("Failed to load page {page}: HTTP status {status}")]
    Status { page: u32, status: u16 },

    /// The page body could not be read into a document
    #[error("Failed to read page {page}: {message}")]
    Parse { page: u32, message: String },

    /// The result cap was reached. Not a failure.
    #[error("Max results reached ({max_results})")]
    CapReached { max_results: usize },

    /// The consumer did not take a record within the handoff timeout, so the
    /// search stopped early
    #[error("Search abandoned: no record taken within {timeout_secs}s")]
    Abandoned { timeout_secs: u64 },

    /// An extractor selector failed to compile
    #[error("Invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },

    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl SearchError {
    /// Whether this is the benign cap sentinel
    pub fn is_cap_reached(&self) -> bool {
        matches!(self, SearchError::CapReached { .. })
    }

    /// Whether this is a real failure rather than the cap sentinel
    pub fn is_failure(&self) -> bool {
        !self.is_cap_reached()
    }

    /// Page the error occurred on, for page-level failures
    pub fn page(&self) -> Option<u32> {
        match self {
            SearchError::Transport { page, .. }
            | SearchError::Status { page, .. }
            | SearchError::Parse { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Entry point for searches.
///
/// Construct one explicitly and share it; there is no global instance.
/// Searches spawn tokio tasks and must be started inside a tokio runtime.
#[derive(Debug)]
pub struct Scraper<F: PageFetcher + 'static = HttpFetcher> {
    config: ScraperConfig,
    fetcher: Arc<F>,
    repositories: Arc<dyn Extractor<Record = Repository>>,
    commits: Arc<dyn Extractor<Record = Commit>>,
    issues: Arc<dyn Extractor<Record = Issue>>,
    users: Arc<dyn Extractor<Record = User>>,
}

impl<F: PageFetcher + 'static> Clone for Scraper<F> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            fetcher: Arc::clone(&self.fetcher),
            repositories: Arc::clone(&self.repositories),
            commits: Arc::clone(&self.commits),
            issues: Arc::clone(&self.issues),
            users: Arc::clone(&self.users),
        }
    }
}

impl Scraper<HttpFetcher> {
    /// Create a scraper for github.com with the default configuration
    pub fn new() -> Result<Self, SearchError> {
        Self::with_config(ScraperConfig::default())
    }

    /// Create an HTTP scraper from `config`
    pub fn with_config(config: ScraperConfig) -> Result<Self, SearchError> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Scraper::with_fetcher(fetcher, config)
    }
}

impl<F: PageFetcher + 'static> Scraper<F> {
    /// Create a scraper that loads pages through `fetcher`
    pub fn with_fetcher(fetcher: F, config: ScraperConfig) -> Result<Self, SearchError> {
        Self::with_shared_fetcher(Arc::new(fetcher), config)
    }

    /// Like [`Scraper::with_fetcher`], for a fetcher the caller keeps a handle to
    pub fn with_shared_fetcher(fetcher: Arc<F>, config: ScraperConfig) -> Result<Self, SearchError> {
        let base_url = config.site_url().to_string();
        Ok(Self {
            repositories: Arc::new(RepositoryExtractor::new(base_url.as_str())?),
            commits: Arc::new(CommitExtractor::new(base_url.as_str())?),
            issues: Arc::new(IssueExtractor::new(base_url.as_str())?),
            users: Arc::new(UserExtractor::new(base_url)?),
            config,
            fetcher,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Replace the repository extractor (e.g. for a newer markup version)
    pub fn with_repository_extractor<E>(mut self, extractor: E) -> Self
    where
        E: Extractor<Record = Repository> + 'static,
    {
        self.repositories = Arc::new(extractor);
        self
    }

    /// Replace the commit extractor
    pub fn with_commit_extractor<E>(mut self, extractor: E) -> Self
    where
        E: Extractor<Record = Commit> + 'static,
    {
        self.commits = Arc::new(extractor);
        self
    }

    /// Replace the issue extractor
    pub fn with_issue_extractor<E>(mut self, extractor: E) -> Self
    where
        E: Extractor<Record = Issue> + 'static,
    {
        self.issues = Arc::new(extractor);
        self
    }

    /// Replace the user extractor
    pub fn with_user_extractor<E>(mut self, extractor: E) -> Self
    where
        E: Extractor<Record = User> + 'static,
    {
        self.users = Arc::new(extractor);
        self
    }

    /// Stream repositories matching `query`
    pub fn search_repositories(
        &self,
        sort: SortOption,
        query: &str,
        max_results: usize,
    ) -> RecordStream<Repository> {
        let request = SearchRequest::new(query, self.repositories.kind())
            .sort(sort)
            .max_results(max_results);
        self.search(Arc::clone(&self.repositories), request)
    }

    /// Stream commits matching `query`
    pub fn search_commits(
        &self,
        sort: SortOption,
        query: &str,
        max_results: usize,
    ) -> RecordStream<Commit> {
        let request = SearchRequest::new(query, self.commits.kind())
            .sort(sort)
            .max_results(max_results);
        self.search(Arc::clone(&self.commits), request)
    }

    /// Stream issues and pull requests matching `query`
    pub fn search_issues(
        &self,
        sort: SortOption,
        query: &str,
        max_results: usize,
    ) -> RecordStream<Issue> {
        let request = SearchRequest::new(query, self.issues.kind())
            .sort(sort)
            .max_results(max_results);
        self.search(Arc::clone(&self.issues), request)
    }

    /// Stream users matching `query`. Organizations are skipped and do not
    /// count toward `max_results`.
    pub fn search_users(&self, sort: SortOption, query: &str, max_results: usize) -> RecordStream<User> {
        let request = SearchRequest::new(query, self.users.kind())
            .sort(sort)
            .max_results(max_results);
        self.search(Arc::clone(&self.users), request)
    }

    /// Run `request` with an arbitrary extractor.
    ///
    /// The listing walked is `request.kind`; the extractor decides what a
    /// result block looks like on it.
    pub fn search<E>(&self, extractor: Arc<E>, request: SearchRequest) -> RecordStream<E::Record>
    where
        E: Extractor + ?Sized + 'static,
    {
        let (sender, receiver) = mpsc::channel(1);
        let (abandon_tx, abandon_rx) = oneshot::channel();
        let settings = EngineSettings::from_config(&self.config);
        let outlet = Outlet::new(sender, abandon_tx, settings.handoff_timeout);
        let producer = tokio::spawn(engine::run(
            Arc::clone(&self.fetcher),
            extractor,
            request,
            settings,
            outlet,
        ));
        RecordStream::new(receiver, abandon_rx, producer)
    }
}
