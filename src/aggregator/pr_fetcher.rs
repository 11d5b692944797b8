use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::Result;
use crate::github::ports::PullRequestSource;
use crate::github::types::PullRequest;

/// Whether a pull request was merged strictly after `cutoff`. Unmerged pull
/// requests never qualify; no cutoff admits every merged one.
pub fn merged_after(pr: &PullRequest, cutoff: Option<DateTime<Utc>>) -> bool {
    match (pr.merged_at, cutoff) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(merged_at), Some(cutoff)) => merged_at > cutoff,
    }
}

pub struct PullRequestFetcher<'a, S> {
    source: &'a S,
    base_branch: String,
}

impl<'a, S: PullRequestSource> PullRequestFetcher<'a, S> {
    pub fn new(source: &'a S, base_branch: impl Into<String>) -> Self {
        Self {
            source,
            base_branch: base_branch.into(),
        }
    }

    /// Walks pages until an empty one and keeps the pull requests merged
    /// after `cutoff`, in the order the API returned them.
    pub async fn merged_since(&self, cutoff: Option<DateTime<Utc>>) -> Result<Vec<PullRequest>> {
        let mut merged = Vec::new();
        let mut page = 1;

        loop {
            let prs = self.source.closed_pulls_page(&self.base_branch, page).await?;
            if prs.is_empty() {
                break;
            }

            let before = merged.len();
            merged.extend(prs.into_iter().filter(|pr| merged_after(pr, cutoff)));
            debug!(page, kept = merged.len() - before, "processed pull request page");

            page += 1;
        }

        info!(
            count = merged.len(),
            base = %self.base_branch,
            "collected merged pull requests"
        );
        Ok(merged)
    }
}
