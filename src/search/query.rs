//! Search URL construction.

use crate::models::{SearchKind, SortOption};

/// Build the search URL for `query` against `base_url`.
///
/// The query text and sort field are percent-encoded once, as whole values;
/// the structural parts of the URL stay literal. Sortable kinds always carry
/// `o` and `s`, with an empty `o=` when the direction is unspecified. The page
/// parameter is appended by the fetcher.
pub fn build_search_url(
    base_url: &str,
    query: &str,
    kind: SearchKind,
    sort: &SortOption,
) -> String {
    let query = urlencoding::encode(query);

    if !kind.is_sortable() {
        return format!("{}/search?q={}&type={}", base_url, query, kind);
    }

    format!(
        "{}/search?o={}&q={}&s={}&type={}",
        base_url,
        sort.direction.as_param(),
        query,
        urlencoding::encode(&sort.field),
        kind
    )
}

/// Append the 1-based page parameter to a built search URL
pub fn page_url(search_url: &str, page: u32) -> String {
    let separator = if search_url.contains('?') { '&' } else { '?' };
    format!("{}{}p={}", search_url, separator, page)
}
