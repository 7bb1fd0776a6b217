//! Terminal display utilities for CLI output.

use comfy_table::{presets, Attribute, Cell, Table};

use crate::models::{Commit, Issue, Repository, User};

/// Records that can be rendered as a table row
pub trait TableRow {
    /// Column headers
    fn headers() -> &'static [&'static str];

    /// Cell values, in header order
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Repository {
    fn headers() -> &'static [&'static str] {
        &["Repository", "Description", "Stars", "Language", "Topics"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.trim_start_matches('/').to_string(),
            truncate_with_ellipsis(&self.description, 50),
            self.stars.clone(),
            self.language.clone(),
            truncate_with_ellipsis(&self.topics.join(", "), 30),
        ]
    }
}

impl TableRow for Commit {
    fn headers() -> &'static [&'static str] {
        &["Message", "Repository", "Author", "Date"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            truncate_with_ellipsis(&self.message, 50),
            self.repository.clone(),
            self.author.clone(),
            self.date.chars().take(10).collect(),
        ]
    }
}

impl TableRow for Issue {
    fn headers() -> &'static [&'static str] {
        &["Title", "Repository", "Number", "Status", "Type"]
    }

    fn cells(&self) -> Vec<String> {
        let kind = if self.is_pull_request { "pull request" } else { "issue" };
        vec![
            truncate_with_ellipsis(&self.title, 50),
            self.repository.clone(),
            self.number.clone(),
            self.status.clone(),
            kind.to_string(),
        ]
    }
}

impl TableRow for User {
    fn headers() -> &'static [&'static str] {
        &["Login", "Name", "Location", "Bio"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.login.clone(),
            self.name.clone(),
            self.location.clone(),
            truncate_with_ellipsis(&self.bio, 40),
        ]
    }
}

/// Render records as a UTF-8 table; the first column is bold
pub fn render_table<T: TableRow>(records: &[T]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(T::headers().to_vec());

    for record in records {
        let mut cells = record.cells().into_iter();
        let mut row = Vec::new();
        if let Some(first) = cells.next() {
            row.push(Cell::new(first).add_attribute(Attribute::Bold));
        }
        row.extend(cells.map(Cell::new));
        table.add_row(row);
    }

    table
}

/// Truncate text to fit within `max_width` display columns.
///
/// Wide characters count as two columns. An ellipsis is appended when the
/// text is cut.
///
/// # Examples
///
/// ```
/// use github_scraper::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let width = |c: char| unicode_width::UnicodeWidthChar::width(c).unwrap_or(1);
    let total: usize = text.chars().map(width).sum();
    if total <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut kept = String::new();
    for c in text.chars() {
        let w = width(c);
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }

    format!("{}...", kept)
}
