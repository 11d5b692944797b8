use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::changelog_extractor::ExtractedChange;
use super::changelog_generator::{compose_release_body, rewrite_generated_notes};
use super::pr_fetcher::PullRequestFetcher;
use crate::error::{ReleaseNotesError, Result};
use crate::github::ports::{PullRequestSource, ReleaseRepository};
use crate::github::types::{GenerateNotesRequest, Release, ReleaseUpdate};

/// How the release body is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NotesStrategy {
    /// Ticket and changelog sections parsed from merged pull requests
    #[default]
    PullRequests,
    /// GitHub's own generated notes with a contributors roll-up
    Generated,
}

#[derive(Debug, Clone)]
pub struct NotesRequest {
    pub release_tag: String,
    pub target: String,
    pub previous_tag: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseNotes {
    pub tag: String,
    pub previous_tag: Option<String>,
    pub strategy: NotesStrategy,
    pub body: String,
    pub changes: Vec<ExtractedChange>,
}

#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub name: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

pub struct ReleaseComposer<'a, G> {
    github: &'a G,
    base_branch: String,
}

impl<'a, G> ReleaseComposer<'a, G>
where
    G: PullRequestSource + ReleaseRepository,
{
    pub fn new(github: &'a G, base_branch: impl Into<String>) -> Self {
        Self {
            github,
            base_branch: base_branch.into(),
        }
    }

    pub async fn find_release(&self, tag: &str) -> Result<Option<Release>> {
        let release = self.github.release_by_tag(tag).await?;
        if release.is_none() {
            warn!(tag, "no release found");
        }
        Ok(release)
    }

    /// The release the notes are measured from. An explicit tag must exist;
    /// otherwise it is the newest published release created before `current`
    /// (or the newest one other than `release_tag` when `current` is unknown).
    pub async fn previous_release(
        &self,
        release_tag: &str,
        current: Option<&Release>,
        previous_tag: Option<&str>,
    ) -> Result<Option<Release>> {
        if let Some(tag) = previous_tag {
            return self
                .github
                .release_by_tag(tag)
                .await?
                .map(Some)
                .ok_or_else(|| ReleaseNotesError::ReleaseNotFound(tag.to_string()));
        }

        let releases = self.github.list_releases().await?;
        let previous = releases
            .into_iter()
            .filter(|r| !r.draft && r.tag_name != release_tag)
            .filter(|r| current.map_or(true, |c| r.created_at < c.created_at))
            .max_by_key(|r| r.created_at);

        match &previous {
            Some(release) => debug!(tag = %release.tag_name, "resolved previous release"),
            None => info!("no previous release, including every merged pull request"),
        }
        Ok(previous)
    }

    #[instrument(skip(self, current), fields(tag = %request.release_tag))]
    pub async fn compose(
        &self,
        strategy: NotesStrategy,
        request: &NotesRequest,
        current: Option<&Release>,
    ) -> Result<ReleaseNotes> {
        let previous = self
            .previous_release(&request.release_tag, current, request.previous_tag.as_deref())
            .await?;
        let previous_tag = previous.as_ref().map(|r| r.tag_name.clone());

        let (body, changes) = match strategy {
            NotesStrategy::PullRequests => {
                let cutoff: Option<DateTime<Utc>> = previous.as_ref().map(|r| r.created_at);
                let changes = self.extract_changes(cutoff).await?;
                (compose_release_body(&changes), changes)
            }
            NotesStrategy::Generated => {
                let generated = self
                    .github
                    .generate_notes(&GenerateNotesRequest {
                        tag_name: request.release_tag.clone(),
                        target_commitish: request.target.clone(),
                        previous_tag_name: previous_tag.clone(),
                    })
                    .await?;
                let body = rewrite_generated_notes(&request.release_tag, &generated.body);
                (body, Vec::new())
            }
        };

        Ok(ReleaseNotes {
            tag: request.release_tag.clone(),
            previous_tag,
            strategy,
            body,
            changes,
        })
    }

    async fn extract_changes(&self, cutoff: Option<DateTime<Utc>>) -> Result<Vec<ExtractedChange>> {
        let prs = PullRequestFetcher::new(self.github, self.base_branch.as_str())
            .merged_since(cutoff)
            .await?;

        Ok(prs
            .iter()
            .map(|pr| {
                let change = ExtractedChange::from_pull_request(pr);
                debug!(
                    number = pr.number,
                    ticket = %change.ticket,
                    empty = change.changes.is_empty(),
                    "extracted changelog"
                );
                change
            })
            .collect())
    }

    pub async fn publish(
        &self,
        release: &Release,
        notes: &ReleaseNotes,
        options: &PublishOptions,
    ) -> Result<Release> {
        if notes.body.is_empty() {
            warn!(tag = %release.tag_name, "release body is empty, leaving it untouched");
        }

        let update = ReleaseUpdate::new(options.name.clone(), Some(notes.body.clone()))
            .draft(options.draft)
            .prerelease(options.prerelease);
        let updated = self.github.update_release(release.id, &update).await?;

        info!(
            name = updated.name.as_deref().unwrap_or(&updated.tag_name),
            "Release updated successfully"
        );
        Ok(updated)
    }
}
