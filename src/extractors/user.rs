//! User search results.
//!
//! The users listing mixes people and organizations. Only people carry a
//! follow control, so blocks without one are skipped.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{absolute_link, compile, field_attr, field_text, select_blocks};
use super::Extractor;
use crate::models::{SearchKind, User};
use crate::search::SearchError;

/// Query parameter controlling avatar resolution
const AVATAR_SIZE_PARAM: &str = "s";

/// Size every avatar URL is normalized to
pub const AVATAR_SIZE: &str = "460";

/// Extracts [`User`] records from `div.user-list-item` blocks
#[derive(Debug, Clone)]
pub struct UserExtractor {
    base_url: String,
    block: Selector,
    follow: Selector,
    avatar: Selector,
    name: Selector,
    bio: Selector,
    location: Selector,
    email: Selector,
}

impl UserExtractor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            base_url: base_url.into(),
            block: compile("div.user-list-item")?,
            follow: compile("span.follow")?,
            avatar: compile("img.avatar")?,
            name: compile("div.f4 > a")?,
            bio: compile("p.mb-1")?,
            location: compile("div.user-list-meta > span.location")?,
            email: compile("a.muted-link[href^='mailto:']")?,
        })
    }
}

impl Extractor for UserExtractor {
    type Record = User;

    fn kind(&self) -> SearchKind {
        SearchKind::Users
    }

    fn locate_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        select_blocks(document, &self.block)
    }

    fn extract(&self, block: ElementRef<'_>) -> Option<User> {
        // Organizations have no follow control
        block.select(&self.follow).next()?;

        let href = field_attr(block, &self.name, "href");
        let avatar = field_attr(block, &self.avatar, "src");

        Some(User {
            login: href.trim_matches('/').to_string(),
            name: field_text(block, &self.name),
            url: absolute_link(&self.base_url, &href),
            avatar_url: normalize_avatar_url(&avatar, &self.base_url),
            bio: field_text(block, &self.bio),
            location: field_text(block, &self.location),
            email: field_text(block, &self.email),
        })
    }
}

/// Rewrite an avatar URL so its size parameter is [`AVATAR_SIZE`].
///
/// An existing size parameter is overridden in place; otherwise one is
/// appended. Relative URLs are resolved against `base_url`. The rewrite is
/// idempotent. URLs that cannot be parsed are returned unchanged.
pub fn normalize_avatar_url(raw: &str, base_url: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let parsed = Url::parse(raw).or_else(|_| Url::parse(base_url).and_then(|base| base.join(raw)));
    let mut url = match parsed {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut sized = false;
    for (key, value) in url.query_pairs() {
        if key == AVATAR_SIZE_PARAM {
            sized = true;
            pairs.push((key.into_owned(), AVATAR_SIZE.to_string()));
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !sized {
        pairs.push((AVATAR_SIZE_PARAM.to_string(), AVATAR_SIZE.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
