//! Records extracted from search result blocks.
//!
//! Fields the page does not provide are left empty rather than treated as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository path as linked from the result, e.g. `/rust-lang/rust`
    pub name: String,

    /// Canonical URL (site base URL + name)
    pub url: String,

    pub description: String,

    /// Topic tags in document order, duplicates preserved
    pub topics: Vec<String>,

    /// Star count as displayed (e.g. `12.3k`)
    pub stars: String,

    pub licence: String,

    /// Primary programming language
    pub language: String,

    /// Last update timestamp (ISO 8601, from the `datetime` attribute)
    pub updated_at: String,
}

impl Repository {
    /// Parse [`Repository::updated_at`] if it holds an RFC 3339 timestamp
    pub fn updated_at_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }
}

/// A commit result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit message headline (anchor text)
    pub message: String,

    /// Commit URL (site base URL + anchor target)
    pub url: String,

    /// Repository the commit belongs to, e.g. `owner/repo`
    pub repository: String,

    pub author: String,

    /// Abbreviated commit hash
    pub sha: String,

    /// Commit timestamp (ISO 8601, from the `datetime` attribute)
    pub date: String,
}

impl Commit {
    /// Parse [`Commit::date`] if it holds an RFC 3339 timestamp
    pub fn date_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

/// An issue or pull request result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub url: String,
    pub repository: String,

    /// Issue number as displayed, e.g. `#123`
    pub number: String,

    /// Status label taken from the state icon (`open`, `closed`, `merged`, ...)
    pub status: String,

    pub is_pull_request: bool,

    /// Comment count as displayed
    pub comments: String,

    /// Timestamp from the `datetime` attribute
    pub date: String,
}

/// A user result. Organizations are never emitted as users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub name: String,
    pub url: String,

    /// Avatar URL normalized to a fixed size
    pub avatar_url: String,

    pub bio: String,
    pub location: String,
    pub email: String,
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
