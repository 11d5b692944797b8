use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::github::types::PullRequest;

pub const TICKET_MARKER: &str = "### Ticket";

/// Changelog categories, declared in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Added,
        Category::Changed,
        Category::Deprecated,
        Category::Removed,
        Category::Fixed,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Added => "Added",
            Category::Changed => "Changed",
            Category::Deprecated => "Deprecated",
            Category::Removed => "Removed",
            Category::Fixed => "Fixed",
            Category::Security => "Security",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown changelog category: {}", s))
    }
}

/// Bullets per category. Every category is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet(BTreeMap<Category, Vec<String>>);

impl Default for ChangeSet {
    fn default() -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, Vec::new())).collect())
    }
}

impl ChangeSet {
    pub fn get(&self, category: Category) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, category: Category, bullet: String) {
        self.0.entry(category).or_default().push(bullet);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Non-empty categories in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, bullets)| !bullets.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedChange {
    pub ticket: String,
    pub title: String,
    pub changes: ChangeSet,
}

impl ExtractedChange {
    pub fn from_pull_request(pr: &PullRequest) -> Self {
        let body = pr.body.as_deref().unwrap_or_default();
        Self {
            ticket: extract_ticket(body),
            title: pr.title.clone(),
            changes: extract_changelog(body),
        }
    }
}

/// The line following the first `### Ticket` heading, verbatim.
pub fn extract_ticket(body: &str) -> String {
    let mut lines = body.lines();
    while let Some(line) = lines.next() {
        if line.starts_with(TICKET_MARKER) {
            return lines.next().unwrap_or_default().to_string();
        }
    }
    String::new()
}

enum Line<'a> {
    Heading(&'a str),
    Bullet(&'a str),
    Other,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(rest) = line.strip_prefix("### ") {
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if end > 0 {
            return Line::Heading(&rest[..end]);
        }
    }
    match line.strip_prefix("- ") {
        Some(rest) if !rest.is_empty() => Line::Bullet(rest),
        _ => Line::Other,
    }
}

/// Collects `- ` bullets under the `### {Category}` heading they follow.
/// Bullets under unknown headings, or before any heading, are dropped.
pub fn extract_changelog(body: &str) -> ChangeSet {
    let mut changes = ChangeSet::default();
    let mut current: Option<Category> = None;

    for line in body.lines() {
        match classify(line) {
            Line::Heading(word) => current = word.parse().ok(),
            Line::Bullet(text) => {
                if let Some(category) = current {
                    changes.push(category, text.trim().to_string());
                }
            }
            Line::Other => {}
        }
    }

    changes
}
