//! Field extractors, one per record kind.
//!
//! This module defines the [`Extractor`] trait, the only place the pagination
//! engine touches page markup. Each extractor knows how to find the repeated
//! result blocks of one listing and how to turn a single block into a record.
//! The selectors are a contract with one version of the site's markup; to
//! follow a markup change, implement [`Extractor`] again and hand the new
//! implementation to [`Scraper`](crate::search::Scraper) through its
//! `with_*_extractor` methods. The engine itself does not change.
//!
//! Extraction never fails. A sub-element that is missing from a block becomes
//! an empty field. An extractor may skip a block entirely by returning `None`
//! (the user extractor does this for organizations).

mod commit;
mod issue;
mod repository;
mod user;

pub use commit::CommitExtractor;
pub use issue::IssueExtractor;
pub use repository::RepositoryExtractor;
pub use user::{normalize_avatar_url, UserExtractor, AVATAR_SIZE};

use scraper::{ElementRef, Html, Selector};
use std::fmt;

use crate::models::SearchKind;
use crate::search::SearchError;

/// Locates result blocks in a page and extracts one record per block.
pub trait Extractor: Send + Sync + fmt::Debug {
    /// Record produced for each block
    type Record: Send + 'static;

    /// Listing this extractor understands
    fn kind(&self) -> SearchKind;

    /// Result blocks of `document`, in document order
    fn locate_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;

    /// Extract the record for one block, or `None` to skip the block
    fn extract(&self, block: ElementRef<'_>) -> Option<Self::Record>;
}

/// Compile a selector, reporting the offending CSS on failure
pub(crate) fn compile(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// All elements of `document` matching `selector`
pub(crate) fn select_blocks<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(selector).collect()
}

/// Whitespace-normalized text of the first match, or an empty string
pub fn field_text(block: ElementRef<'_>, selector: &Selector) -> String {
    block
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Attribute of the first match, or an empty string
pub fn field_attr(block: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    block
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Text of every match, in document order
pub fn field_texts(block: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    block.select(selector).map(element_text).collect()
}

/// Element text with runs of whitespace collapsed to one space
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join a site-relative link onto the base URL
pub(crate) fn absolute_link(base_url: &str, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!("{}{}", base_url, href)
}
