//! Repository search results.

use scraper::{ElementRef, Html, Selector};

use super::{absolute_link, compile, element_text, field_attr, field_text, field_texts, select_blocks};
use super::Extractor;
use crate::models::{Repository, SearchKind};
use crate::search::SearchError;

/// Extracts [`Repository`] records from `li.repo-list-item` blocks
#[derive(Debug, Clone)]
pub struct RepositoryExtractor {
    base_url: String,
    block: Selector,
    link: Selector,
    description: Selector,
    stars: Selector,
    language: Selector,
    meta: Selector,
    updated: Selector,
    topics: Selector,
}

impl RepositoryExtractor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            base_url: base_url.into(),
            block: compile("li.repo-list-item > div.mt-n1")?,
            link: compile("a")?,
            description: compile("p.mb-1")?,
            stars: compile("div.mr-3 > a.muted-link")?,
            language: compile("[itemprop=programmingLanguage]")?,
            meta: compile("div.mr-3")?,
            updated: compile("relative-time")?,
            topics: compile("a.topic-tag")?,
        })
    }

    /// The licence sits in an unlabelled `div.mr-3`; it is the one whose text
    /// ends in "license".
    fn licence(&self, block: ElementRef<'_>) -> String {
        block
            .select(&self.meta)
            .map(element_text)
            .find(|text| text.to_ascii_lowercase().ends_with("license"))
            .unwrap_or_default()
    }
}

impl Extractor for RepositoryExtractor {
    type Record = Repository;

    fn kind(&self) -> SearchKind {
        SearchKind::Repositories
    }

    fn locate_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        select_blocks(document, &self.block)
    }

    fn extract(&self, block: ElementRef<'_>) -> Option<Repository> {
        // The name is the link target, not its (highlighted) display text
        let name = field_attr(block, &self.link, "href");
        let url = absolute_link(&self.base_url, &name);

        Some(Repository {
            url,
            name,
            description: field_text(block, &self.description),
            topics: field_texts(block, &self.topics),
            stars: field_text(block, &self.stars),
            licence: self.licence(block),
            language: field_text(block, &self.language),
            updated_at: field_attr(block, &self.updated, "datetime"),
        })
    }
}
