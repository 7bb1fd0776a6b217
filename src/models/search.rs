//! Search request models: result kinds, sort options and the per-call request.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Kind of result listing requested from the search page.
///
/// The string form is the `type=` marker used in the search URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchKind {
    #[serde(rename = "repositories")]
    Repositories,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "commits")]
    Commits,
    #[serde(rename = "issues")]
    Issues,
    #[serde(rename = "discussions")]
    Discussions,
    #[serde(rename = "registrypackages")]
    Packages,
    #[serde(rename = "marketPlace")]
    Marketplace,
    #[serde(rename = "topics")]
    Topics,
    #[serde(rename = "wikis")]
    Wikis,
    #[serde(rename = "users")]
    Users,
}

impl SearchKind {
    /// All kinds known to the search page.
    pub const ALL: [SearchKind; 10] = [
        SearchKind::Repositories,
        SearchKind::Code,
        SearchKind::Commits,
        SearchKind::Issues,
        SearchKind::Discussions,
        SearchKind::Packages,
        SearchKind::Marketplace,
        SearchKind::Topics,
        SearchKind::Wikis,
        SearchKind::Users,
    ];

    /// URL marker for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Repositories => "repositories",
            SearchKind::Code => "code",
            SearchKind::Commits => "commits",
            SearchKind::Issues => "issues",
            SearchKind::Discussions => "discussions",
            SearchKind::Packages => "registrypackages",
            SearchKind::Marketplace => "marketPlace",
            SearchKind::Topics => "topics",
            SearchKind::Wikis => "wikis",
            SearchKind::Users => "users",
        }
    }

    /// Whether the listing accepts a sort field and direction.
    ///
    /// Marketplace and topic listings only take a query.
    pub fn is_sortable(&self) -> bool {
        !matches!(self, SearchKind::Marketplace | SearchKind::Topics)
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown search kind: {}", s))
    }
}

/// Direction of a sort option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
    /// Let the site pick; serializes to an empty `o=` value.
    #[default]
    Unspecified,
}

impl SortDirection {
    /// Value of the `o=` URL parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
            SortDirection::Unspecified => "",
        }
    }
}

/// A sort field plus direction.
///
/// An empty field means relevance ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOption {
    pub field: Cow<'static, str>,
    pub direction: SortDirection,
}

macro_rules! sort_presets {
    ($($(#[$doc:meta])* $name:ident = ($field:literal, $dir:ident, $preset:literal);)*) => {
        impl SortOption {
            $(
                $(#[$doc])*
                pub const $name: SortOption = SortOption::preset_const($field, SortDirection::$dir);
            )*

            /// The preset catalog as `(name, option)` pairs.
            pub fn presets() -> &'static [(&'static str, SortOption)] {
                const PRESETS: &[(&str, SortOption)] = &[$(($preset, SortOption::$name)),*];
                PRESETS
            }
        }
    };
}

sort_presets! {
    /// Relevance ordering
    DEFAULT = ("", Unspecified, "default");
    REPOSITORY_MOST_STARS = ("stars", Descending, "most-stars");
    REPOSITORY_FEWEST_STARS = ("stars", Ascending, "fewest-stars");
    REPOSITORY_MOST_FORKS = ("forks", Descending, "most-forks");
    REPOSITORY_FEWEST_FORKS = ("forks", Ascending, "fewest-forks");
    REPOSITORY_RECENTLY_UPDATED = ("updated", Descending, "recently-updated");
    REPOSITORY_LEAST_RECENTLY_UPDATED = ("updated", Ascending, "least-recently-updated");
    COMMIT_RECENTLY_COMMITTED = ("committer-date", Descending, "recently-committed");
    COMMIT_LEAST_RECENTLY_COMMITTED = ("committer-date", Ascending, "least-recently-committed");
    COMMIT_RECENTLY_AUTHORED = ("author-date", Descending, "recently-authored");
    COMMIT_LEAST_RECENTLY_AUTHORED = ("author-date", Ascending, "least-recently-authored");
    ISSUES_MOST_COMMENTED = ("comments", Descending, "most-commented");
    ISSUES_NEWEST = ("created", Descending, "newest");
    ISSUES_OLDEST = ("created", Ascending, "oldest");
    ISSUES_RECENTLY_UPDATED = ("updated", Descending, "issues-recently-updated");
    ISSUES_LEAST_RECENTLY_UPDATED = ("updated", Ascending, "issues-least-recently-updated");
}

impl SortOption {
    const fn preset_const(field: &'static str, direction: SortDirection) -> Self {
        Self {
            field: Cow::Borrowed(field),
            direction,
        }
    }

    /// Build an arbitrary sort option
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: Cow::Owned(field.into()),
            direction,
        }
    }

    /// Look up a preset by its kebab-case name (e.g. `most-stars`).
    pub fn preset(name: &str) -> Option<SortOption> {
        Self::presets()
            .iter()
            .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
            .map(|(_, option)| option.clone())
    }

    /// Whether this is relevance ordering
    pub fn is_default(&self) -> bool {
        self.field.is_empty() && self.direction == SortDirection::Unspecified
    }
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::DEFAULT
    }
}

/// Parameters of one search call.
///
/// Immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query, passed through verbatim
    pub query: String,

    /// Result listing to walk
    pub kind: SearchKind,

    /// Sort field and direction
    #[serde(default)]
    pub sort: SortOption,

    /// Maximum number of records to emit before the cap sentinel
    pub max_results: usize,
}

impl SearchRequest {
    /// Create a request with relevance ordering and a cap of 10 results
    pub fn new(query: impl Into<String>, kind: SearchKind) -> Self {
        Self {
            query: query.into(),
            kind,
            sort: SortOption::DEFAULT,
            max_results: 10,
        }
    }

    /// Set the sort option
    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set the result cap
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Build the search URL for this request against `base_url`
    pub fn url(&self, base_url: &str) -> String {
        crate::search::build_search_url(base_url, &self.query, self.kind, &self.sort)
    }
}
