//! The pagination loop behind every search.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use super::fetch::{parse_document, PageFetcher};
use super::query::build_search_url;
use super::SearchError;
use crate::config::ScraperConfig;
use crate::extractors::Extractor;
use crate::models::SearchRequest;

/// Per-search settings taken from [`ScraperConfig`]
#[derive(Debug, Clone)]
pub(crate) struct EngineSettings {
    pub base_url: String,
    pub max_pages: u32,
    pub handoff_timeout: Option<Duration>,
}

impl EngineSettings {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            base_url: config.site_url().to_string(),
            max_pages: config.max_pages,
            handoff_timeout: config.handoff_timeout(),
        }
    }
}

/// The producer's end of a record stream.
///
/// Items go to the consumer through a one-slot channel. If a handoff timeout
/// is set and runs out, the abandonment is reported on a side channel that
/// the stream reads once the records already queued are drained.
#[derive(Debug)]
pub(crate) struct Outlet<T> {
    sender: mpsc::Sender<Result<T, SearchError>>,
    abandoned: Option<oneshot::Sender<SearchError>>,
    handoff_timeout: Option<Duration>,
}

impl<T> Outlet<T> {
    pub fn new(
        sender: mpsc::Sender<Result<T, SearchError>>,
        abandoned: oneshot::Sender<SearchError>,
        handoff_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sender,
            abandoned: Some(abandoned),
            handoff_timeout,
        }
    }

    /// Resolves once the consumer has closed or dropped the stream
    async fn closed(&self) {
        self.sender.closed().await
    }

    /// Hand one item to the consumer. Returns `false` when the search must
    /// stop because the consumer is gone or did not take the item in time.
    async fn deliver(&mut self, item: Result<T, SearchError>) -> bool {
        let sent = match self.handoff_timeout {
            Some(limit) => match timeout(limit, self.sender.send(item)).await {
                Ok(sent) => sent,
                Err(_) => {
                    warn!(
                        timeout_secs = limit.as_secs(),
                        "Consumer stopped reading, abandoning search"
                    );
                    if let Some(abandoned) = self.abandoned.take() {
                        // The consumer may already be gone
                        let _ = abandoned.send(SearchError::Abandoned {
                            timeout_secs: limit.as_secs(),
                        });
                    }
                    return false;
                }
            },
            None => self.sender.send(item).await,
        };

        if sent.is_err() {
            debug!("Stream dropped by consumer");
            return false;
        }
        true
    }
}

/// Walk the listing for `request`, sending each record through `outlet`.
///
/// Pages are fetched strictly one after another. A page's document is parsed
/// and dropped before any of its records are handed off, and at most
/// `max_results` records are ever sent.
pub(crate) async fn run<F, E>(
    fetcher: Arc<F>,
    extractor: Arc<E>,
    request: SearchRequest,
    settings: EngineSettings,
    mut outlet: Outlet<E::Record>,
) where
    F: PageFetcher + ?Sized,
    E: Extractor + ?Sized,
{
    let search_url = build_search_url(
        &settings.base_url,
        &request.query,
        request.kind,
        &request.sort,
    );
    let max_results = request.max_results;
    let mut emitted = 0usize;

    info!(
        kind = %request.kind,
        query = %request.query,
        max_results,
        "Starting search"
    );

    for page in 1..=settings.max_pages {
        if emitted >= max_results {
            outlet
                .deliver(Err(SearchError::CapReached { max_results }))
                .await;
            return;
        }

        let fetched = tokio::select! {
            biased;
            _ = outlet.closed() => {
                debug!(page, "Stream cancelled while a page was in flight");
                return;
            }
            result = fetcher.fetch_page(&search_url, page) => result,
        };

        let body = match fetched {
            Ok(body) => body,
            Err(err) => {
                warn!(page, error = %err, "Search stopped");
                outlet.deliver(Err(err)).await;
                return;
            }
        };

        let records = extract_page(&*extractor, &body, max_results - emitted);
        drop(body);

        if records.is_empty() {
            debug!(page, "No result blocks on page");
            continue;
        }

        for record in records {
            if !outlet.deliver(Ok(record)).await {
                return;
            }
            emitted += 1;

            if emitted == max_results {
                info!(emitted, "Result cap reached");
                outlet
                    .deliver(Err(SearchError::CapReached { max_results }))
                    .await;
                return;
            }
        }
    }

    warn!(
        emitted,
        max_pages = settings.max_pages,
        "Page ceiling reached, search finished"
    );
}

/// Parse one page and extract at most `limit` records in document order.
///
/// Skipped blocks do not count toward `limit`.
pub(crate) fn extract_page<E>(extractor: &E, body: &str, limit: usize) -> Vec<E::Record>
where
    E: Extractor + ?Sized,
{
    let document = parse_document(body);
    let blocks = extractor.locate_blocks(&document);
    let found = blocks.len();

    let records: Vec<_> = blocks
        .into_iter()
        .filter_map(|block| extractor.extract(block))
        .take(limit)
        .collect();

    trace!(found, extracted = records.len(), "Extracted page");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use crate::extractors::{RepositoryExtractor, UserExtractor};
    use crate::models::{Repository, SearchKind, SortOption};
    use crate::search::{MockFetcher, MockPage, Scraper};

    fn repo_page(names: &[&str]) -> String {
        let items: String = names
            .iter()
            .map(|name| {
                format!(
                    r#"<li class="repo-list-item"><div class="mt-n1">
                         <div class="f4"><a href="/{name}">{name}</a></div>
                       </div></li>"#
                )
            })
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    fn user_page(entries: &[(&str, bool)]) -> String {
        let items: String = entries
            .iter()
            .map(|(login, person)| {
                let follow = if *person { r#"<span class="follow"></span>"# } else { "" };
                format!(
                    r#"<div class="user-list-item"><div class="f4"><a href="/{login}">{login}</a></div>{follow}</div>"#
                )
            })
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    fn scraper(fetcher: MockFetcher, max_pages: u32) -> Scraper<MockFetcher> {
        let config = ScraperConfig::default().max_pages(max_pages);
        Scraper::with_fetcher(fetcher, config).unwrap()
    }

    fn names(items: &[Result<Repository, SearchError>]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .map(|repo| repo.name.clone())
            .collect()
    }

    #[test]
    fn test_extract_page_respects_limit() {
        let extractor = RepositoryExtractor::new("https://github.com").unwrap();
        let body = repo_page(&["a/1", "a/2", "a/3"]);
        let records = extract_page(&extractor, &body, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "/a/1");
        assert_eq!(records[1].name, "/a/2");
    }

    #[test]
    fn test_extract_page_skips_do_not_count() {
        let extractor = UserExtractor::new("https://github.com").unwrap();
        let body = user_page(&[("org", false), ("alice", true), ("bob", true)]);
        let records = extract_page(&extractor, &body, 2);
        let logins: Vec<_> = records.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_pages_stream_in_order() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["p1/a", "p1/b"])))
            .with_page(2, MockPage::Html(repo_page(&["p2/a"])))
            .with_page(3, MockPage::Html(repo_page(&["p3/a"])));
        let scraper = scraper(fetcher, 3);

        let items = scraper
            .search_repositories(SortOption::DEFAULT, "go", 10)
            .collect_all()
            .await;

        assert_eq!(names(&items), vec!["/p1/a", "/p1/b", "/p2/a", "/p3/a"]);
        // Ceiling reached without hitting the cap: no sentinel
        assert!(items.iter().all(|item| item.is_ok()));
        assert_eq!(scraper.fetcher().requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_cap_truncates_mid_page() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["a", "b"])))
            .with_page(2, MockPage::Html(repo_page(&["c", "d", "e"])));
        let scraper = scraper(fetcher, 5);

        let items = scraper
            .search_repositories(SortOption::DEFAULT, "go", 3)
            .collect_all()
            .await;

        assert_eq!(items.len(), 4);
        assert_eq!(names(&items), vec!["/a", "/b", "/c"]);
        assert_eq!(items[3], Err(SearchError::CapReached { max_results: 3 }));
        assert_eq!(scraper.fetcher().requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_cap_at_page_boundary_does_not_fetch_more() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["a", "b"])))
            .with_page(2, MockPage::Html(repo_page(&["c"])));
        let scraper = scraper(fetcher, 5);

        let items = scraper
            .search_repositories(SortOption::DEFAULT, "go", 2)
            .collect_all()
            .await;

        assert_eq!(names(&items), vec!["/a", "/b"]);
        assert!(items[2].as_ref().unwrap_err().is_cap_reached());
        assert_eq!(scraper.fetcher().requested_pages(), vec![1]);
    }

    #[tokio::test]
    async fn test_zero_max_results() {
        let scraper = scraper(MockFetcher::new(), 5);
        let items = scraper
            .search_repositories(SortOption::DEFAULT, "go", 0)
            .collect_all()
            .await;

        assert_eq!(items, vec![Err(SearchError::CapReached { max_results: 0 })]);
        assert!(scraper.fetcher().requested_pages().is_empty());
    }

    #[tokio::test]
    async fn test_status_failure_stops_stream() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["a", "b"])))
            .with_page(2, MockPage::Status(500))
            .with_page(3, MockPage::Html(repo_page(&["c"])));
        let scraper = scraper(fetcher, 5);

        let items = scraper
            .search_repositories(SortOption::DEFAULT, "go", 10)
            .collect_all()
            .await;

        assert_eq!(names(&items), vec!["/a", "/b"]);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], Err(SearchError::Status { page: 2, status: 500 }));
        assert_eq!(scraper.fetcher().requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_transport_and_parse_failures() {
        let fetcher = MockFetcher::new().with_page(1, MockPage::TransportFailure("connection refused".into()));
        let items = scraper(fetcher, 5)
            .search_repositories(SortOption::DEFAULT, "go", 10)
            .collect_all()
            .await;
        assert_eq!(
            items,
            vec![Err(SearchError::Transport {
                page: 1,
                message: "connection refused".into()
            })]
        );

        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["a"])))
            .with_page(2, MockPage::ParseFailure("truncated body".into()));
        let items = scraper(fetcher, 5)
            .search_repositories(SortOption::DEFAULT, "go", 10)
            .collect_all()
            .await;
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            Err(SearchError::Parse {
                page: 2,
                message: "truncated body".into()
            })
        );
    }

    #[tokio::test]
    async fn test_empty_pages_are_skipped() {
        let fetcher = MockFetcher::new()
            .with_page(2, MockPage::Html(repo_page(&["late"])));
        let scraper = scraper(fetcher, 4);

        let items = scraper
            .search_repositories(SortOption::DEFAULT, "go", 10)
            .collect_all()
            .await;

        assert_eq!(names(&items), vec!["/late"]);
        assert_eq!(items.len(), 1);
        assert_eq!(scraper.fetcher().requested_pages(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_organizations_do_not_count_toward_cap() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(user_page(&[("org1", false), ("alice", true)])))
            .with_page(2, MockPage::Html(user_page(&[("org2", false), ("bob", true), ("carol", true)])));
        let scraper = scraper(fetcher, 5);

        for _ in 0..2 {
            let items = scraper
                .search_users(SortOption::DEFAULT, "x", 2)
                .collect_all()
                .await;
            let logins: Vec<_> = items
                .iter()
                .filter_map(|item| item.as_ref().ok())
                .map(|user| user.login.clone())
                .collect();
            assert_eq!(logins, vec!["alice", "bob"]);
            assert!(items[2].as_ref().unwrap_err().is_cap_reached());
        }
    }

    #[tokio::test]
    async fn test_requests_use_built_url() {
        let scraper = scraper(MockFetcher::new(), 1);
        scraper
            .search_repositories(SortOption::REPOSITORY_MOST_STARS, "tokio", 5)
            .collect_all()
            .await;

        assert_eq!(
            scraper.fetcher().requested_urls(),
            vec!["https://github.com/search?o=desc&q=tokio&s=stars&type=repositories".to_string()]
        );
    }

    #[tokio::test]
    async fn test_generic_search_uses_request_kind() {
        let scraper = scraper(MockFetcher::new(), 1);
        let extractor = Arc::new(RepositoryExtractor::new("https://github.com").unwrap());
        let request = SearchRequest::new("ci", SearchKind::Topics);
        scraper.search(extractor, request).collect_all().await;

        assert_eq!(
            scraper.fetcher().requested_urls(),
            vec!["https://github.com/search?q=ci&type=topics".to_string()]
        );
    }

    #[tokio::test]
    async fn test_dropped_stream_releases_producer() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_page(1, MockPage::Html(repo_page(&["a", "b", "c"])))
                .with_page(2, MockPage::Html(repo_page(&["d"]))),
        );
        let config = ScraperConfig::default().handoff_timeout_secs(None);
        let scraper = Scraper::with_shared_fetcher(Arc::clone(&fetcher), config).unwrap();

        let mut stream = scraper.search_repositories(SortOption::DEFAULT, "go", 10);
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.name, "/a");
        drop(stream);

        // Only the test and the scraper hold the fetcher once the producer is gone
        for _ in 0..100 {
            if Arc::strong_count(&fetcher) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(Arc::strong_count(&fetcher), 2);
        assert_eq!(fetcher.requested_pages(), vec![1]);
    }

    #[tokio::test]
    async fn test_cancel_during_slow_fetch() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_page(1, MockPage::Html(repo_page(&["a"])))
                .with_delay(Duration::from_secs(30)),
        );
        let scraper =
            Scraper::with_shared_fetcher(Arc::clone(&fetcher), ScraperConfig::default()).unwrap();

        let mut stream = scraper.search_repositories(SortOption::DEFAULT, "go", 10);
        tokio::time::sleep(Duration::from_millis(50)).await;
        stream.cancel();
        assert!(stream.next().await.is_none());

        for _ in 0..100 {
            if Arc::strong_count(&fetcher) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(Arc::strong_count(&fetcher), 2);
    }

    #[tokio::test]
    async fn test_handoff_timeout_abandons_search() {
        let fetcher = Arc::new(
            MockFetcher::new().with_page(1, MockPage::Html(repo_page(&["a", "b", "c"]))),
        );
        let config = ScraperConfig::default().handoff_timeout_secs(Some(1));
        let scraper = Scraper::with_shared_fetcher(Arc::clone(&fetcher), config).unwrap();

        // Hold the stream without reading from it
        let mut stream = scraper.search_repositories(SortOption::DEFAULT, "go", 10);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(Arc::strong_count(&fetcher), 2);

        // The record already queued is still there, followed by the abandonment
        let items = stream.collect_all().await;
        assert_eq!(names(&items), vec!["/a"]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Err(SearchError::Abandoned { timeout_secs: 1 }));
    }

    #[tokio::test]
    async fn test_slow_consumer_throttles_without_losing_records() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["a", "b", "c", "d"])));
        let scraper = scraper(fetcher, 1);

        let mut stream = scraper.search_repositories(SortOption::DEFAULT, "go", 10);
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        assert_eq!(names(&items), vec!["/a", "/b", "/c", "/d"]);
        assert!(items.iter().all(|item| item.is_ok()));
    }

    #[tokio::test]
    async fn test_slow_consumer_past_timeout_sees_abandonment() {
        let fetcher = MockFetcher::new()
            .with_page(1, MockPage::Html(repo_page(&["a", "b", "c", "d"])));
        let config = ScraperConfig::default()
            .max_pages(1)
            .handoff_timeout_secs(Some(1));
        let scraper = Scraper::with_fetcher(fetcher, config).unwrap();

        let mut stream = scraper.search_repositories(SortOption::DEFAULT, "go", 10);
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
            tokio::time::sleep(Duration::from_millis(1500)).await;
        }

        // Records already handed off are kept; the truncation is never silent
        assert_eq!(names(&items), vec!["/a", "/b"]);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], Err(SearchError::Abandoned { timeout_secs: 1 }));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_deserialized_base_url() {
        let config = ScraperConfig {
            base_url: "https://github.com/".to_string(),
            max_pages: 1,
            ..ScraperConfig::default()
        };
        let fetcher = MockFetcher::new().with_page(1, MockPage::Html(repo_page(&["golang/go"])));
        let scraper = Scraper::with_fetcher(fetcher, config).unwrap();

        let records = scraper
            .search_repositories(SortOption::DEFAULT, "go", 5)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(records[0].url, "https://github.com/golang/go");
        assert_eq!(
            scraper.fetcher().requested_urls(),
            vec!["https://github.com/search?o=&q=go&s=&type=repositories".to_string()]
        );
    }
}
