//! Issue and pull request search results.

use scraper::{ElementRef, Html, Selector};

use super::{absolute_link, compile, field_attr, field_text, select_blocks};
use super::Extractor;
use crate::models::{Issue, SearchKind};
use crate::search::SearchError;

/// Substring of the state icon's class list that marks a pull request
const PULL_REQUEST_MARKER: &str = "git-pull-request";

/// Extracts [`Issue`] records from `div.issue-list-item` blocks
#[derive(Debug, Clone)]
pub struct IssueExtractor {
    base_url: String,
    block: Selector,
    icon: Selector,
    title: Selector,
    repository: Selector,
    number: Selector,
    comments: Selector,
    date: Selector,
}

impl IssueExtractor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            base_url: base_url.into(),
            block: compile("div.issue-list-item")?,
            icon: compile("div.flex-shrink-0 > svg.octicon")?,
            title: compile("div.f4 > a")?,
            repository: compile("a.muted-link.text-bold")?,
            number: compile("span.issue-number")?,
            comments: compile("span.comments")?,
            date: compile("relative-time")?,
        })
    }
}

/// Status label: the third whitespace-separated token of the icon's class list
pub fn issue_status(icon_class: &str) -> String {
    icon_class
        .split_whitespace()
        .nth(2)
        .unwrap_or_default()
        .to_string()
}

/// Whether the icon's class list marks a pull request
pub fn is_pull_request(icon_class: &str) -> bool {
    icon_class.contains(PULL_REQUEST_MARKER)
}

impl Extractor for IssueExtractor {
    type Record = Issue;

    fn kind(&self) -> SearchKind {
        SearchKind::Issues
    }

    fn locate_blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        select_blocks(document, &self.block)
    }

    fn extract(&self, block: ElementRef<'_>) -> Option<Issue> {
        let icon_class = field_attr(block, &self.icon, "class");
        let href = field_attr(block, &self.title, "href");

        Some(Issue {
            title: field_text(block, &self.title),
            url: absolute_link(&self.base_url, &href),
            repository: field_text(block, &self.repository),
            number: field_text(block, &self.number),
            status: issue_status(&icon_class),
            is_pull_request: is_pull_request(&icon_class),
            comments: field_text(block, &self.comments),
            date: field_attr(block, &self.date, "datetime"),
        })
    }
}
