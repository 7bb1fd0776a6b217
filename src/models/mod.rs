//! Core data models for search requests and scraped records.

mod record;
mod search;

pub use record::{Commit, Issue, Repository, User};
pub use search::{SearchKind, SearchRequest, SortDirection, SortOption};
