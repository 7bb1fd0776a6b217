//! Commit search results.

use scraper::{ElementRef, Html, Selector};

use super::{absolute_link, compile, element_text, field_attr, field_text, select_blocks};
use super::Extractor;
use crate::models::{Commit, SearchKind};
use crate::search::SearchError;

/// Extracts [`Commit`] records from `div.commits-list-item` blocks
#[derive(Debug, Clone)]
pub struct CommitExtractor {
    base_url: String,
    block: Selector,
    message: Selector,
    repository: Selector,
    author: Selector,
    sha: Selector,
    date: Selector,
}

impl CommitExtractor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            base_url: base_url.into(),
            block: compile("div.commits-list-item")?,
            message: compile("div.f4 > a")?,
            repository: compile("div.text-small > a.link-gray")?,
            author: compile("a.commit-author")?,
            sha: compile("a.sha")?,
            date: compile("relative-time")?,
        })
    }
}

impl Extractor for CommitExtractor {
    type Record = Commit;

    fn kind(&self) -> SearchKind {
        SearchKind::Commits
    }

    fn locate_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        select_blocks(document, &self.block)
    }

    fn extract(&self, block: ElementRef<'_>) -> Option<Commit> {
        // Message and link both come from the same anchor
        let anchor = block.select(&self.message).next();
        let message = anchor.map(element_text).unwrap_or_default();
        let href = anchor
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();

        Some(Commit {
            message,
            url: absolute_link(&self.base_url, href),
            repository: field_text(block, &self.repository),
            author: field_text(block, &self.author),
            sha: field_text(block, &self.sha),
            date: field_attr(block, &self.date, "datetime"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <html><body><div id="commit_search_results">
      <div class="commits-list-item d-flex flex-column">
        <div class="f4 text-normal">
          <a class="message markdown-title js-navigation-open" href="/golang/go/commit/1a2b3c4d">cmd/go: fix
            module lookup</a>
        </div>
        <div class="text-small"><a class="link-gray" href="/golang/go">golang/go</a></div>
        <div class="d-flex flex-items-center text-small">
          <a class="commit-author user-mention" href="/rsc">rsc</a> committed
          <relative-time datetime="2019-06-01T12:30:00Z">Jun 1, 2019</relative-time>
          <a class="sha text-small" href="/golang/go/commit/1a2b3c4d">1a2b3c4</a>
        </div>
      </div>
      <div class="commits-list-item d-flex flex-column">
        <div class="text-small"><a class="link-gray" href="/x/y">x/y</a></div>
      </div>
    </div></body></html>
    "#;

    #[test]
    fn test_extract_commit() {
        let extractor = CommitExtractor::new("https://github.com").unwrap();
        let doc = Html::parse_document(PAGE);
        let blocks = extractor.locate_blocks(&doc);
        assert_eq!(blocks.len(), 2);

        let commit = extractor.extract(blocks[0]).unwrap();
        assert_eq!(commit.message, "cmd/go: fix module lookup");
        assert_eq!(commit.url, "https://github.com/golang/go/commit/1a2b3c4d");
        assert_eq!(commit.repository, "golang/go");
        assert_eq!(commit.author, "rsc");
        assert_eq!(commit.sha, "1a2b3c4");
        // The machine-readable attribute, not the displayed text
        assert_eq!(commit.date, "2019-06-01T12:30:00Z");
    }

    #[test]
    fn test_extract_commit_without_anchor() {
        let extractor = CommitExtractor::new("https://github.com").unwrap();
        let doc = Html::parse_document(PAGE);
        let blocks = extractor.locate_blocks(&doc);

        let commit = extractor.extract(blocks[1]).unwrap();
        assert_eq!(commit.message, "");
        assert_eq!(commit.url, "");
        assert_eq!(commit.repository, "x/y");
        assert_eq!(commit.date, "");
    }
}
