//! # GitHub Scraper
//!
//! Streams repositories, commits, issues and users scraped from GitHub's
//! paginated HTML search results.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Records and search parameters (Repository, SortOption, etc.)
//! - [`search`]: The pagination engine, page fetching and the [`Scraper`] entry point
//! - [`extractors`]: Per-kind field extraction, isolated behind the [`Extractor`] trait
//! - [`utils`]: HTTP client, record streams and display helpers
//! - [`config`]: Scraper configuration

pub mod config;
pub mod extractors;
pub mod models;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use config::ScraperConfig;
pub use extractors::Extractor;
pub use models::{Commit, Issue, Repository, SearchKind, SortDirection, SortOption, User};
pub use search::{Scraper, SearchError};
pub use utils::RecordStream;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
