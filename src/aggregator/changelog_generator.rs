use anyhow::Result;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::changelog_extractor::ExtractedChange;
use super::release_composer::ReleaseNotes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

lazy_static! {
    /// `* {title} by @{user} in {url}` lines of GitHub's generated notes.
    static ref ENTRY_RE: Regex = Regex::new(r"(?m)^\* (.*) by @(.*) in (.*)$").unwrap();
}

fn heading(change: &ExtractedChange) -> String {
    if change.ticket.is_empty() {
        format!("## - {}\n", change.title)
    } else {
        format!("## {} - {}\n", change.ticket, change.title)
    }
}

/// One `##` section per change, in the given order, listing only the
/// categories that have bullets.
pub fn compose_release_body(changes: &[ExtractedChange]) -> String {
    let mut output = String::new();

    for change in changes {
        output.push_str(&heading(change));
        for (category, bullets) in change.changes.iter() {
            output.push_str(&format!("### {}\n", category));
            for bullet in bullets {
                output.push_str(&format!("- {}\n", bullet));
            }
        }
    }

    output
}

/// Reshapes the body returned by GitHub's `generate-notes` endpoint: the
/// "What's Changed" heading becomes the release heading, entries lose their
/// author, and the contributors of every entry are rolled up.
pub fn rewrite_generated_notes(tag: &str, generated: &str) -> String {
    // first two lines are the "generated by" preamble
    let mut notes = generated.lines().skip(2).collect::<Vec<_>>().join("\n");

    notes = notes.replace("\n###", "\n\n###");
    notes = notes.replace("## What's Changed", &format!("## Release {}", tag));

    let contributors: BTreeSet<&str> = ENTRY_RE
        .captures_iter(&notes)
        .filter_map(|cap| cap.get(2).map(|m| m.as_str()))
        .collect();
    let mut roll_up = String::from("### Contributors");
    for contributor in &contributors {
        roll_up.push_str(&format!("\n- @{}", contributor));
    }

    let notes = notes.replace("## New Contributors", &roll_up);

    ENTRY_RE
        .replace_all(&notes, |cap: &Captures| format!("- {} — {}", &cap[1], &cap[3]))
        .into_owned()
}

pub struct ChangelogGenerator {
    format: OutputFormat,
}

impl ChangelogGenerator {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn generate(&self, notes: &ReleaseNotes) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(notes.body.clone()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(notes)?),
            OutputFormat::Html => self.generate_html(notes),
        }
    }

    fn generate_html(&self, notes: &ReleaseNotes) -> Result<String> {
        let parser = pulldown_cmark::Parser::new(&notes.body);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);

        let mut title = String::new();
        pulldown_cmark::escape::escape_html(&mut title, &notes.tag)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Release {}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; max-width: 900px; margin: 0 auto; padding: 20px; }}
        h1, h2, h3 {{ border-bottom: 1px solid #e1e4e8; padding-bottom: 0.3em; }}
        code {{ background: #f6f8fa; padding: 2px 4px; border-radius: 3px; }}
    </style>
</head>
<body>
    {}
</body>
</html>"#,
            title, html
        ))
    }
}
