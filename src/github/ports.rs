use super::types::{GenerateNotesRequest, GeneratedNotes, PullRequest, Release, ReleaseUpdate};
use crate::error::Result;

/// Source of closed pull requests, one page at a time.
#[allow(async_fn_in_trait)]
pub trait PullRequestSource {
    /// Page `page` (1-based) of closed pull requests targeting `base`.
    /// An empty page means there is nothing left.
    async fn closed_pulls_page(&self, base: &str, page: u32) -> Result<Vec<PullRequest>>;
}

/// Release lookup and mutation.
#[allow(async_fn_in_trait)]
pub trait ReleaseRepository {
    /// `Ok(None)` when no release carries `tag`.
    async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>>;

    async fn list_releases(&self) -> Result<Vec<Release>>;

    async fn update_release(&self, id: u64, update: &ReleaseUpdate) -> Result<Release>;

    async fn generate_notes(&self, request: &GenerateNotesRequest) -> Result<GeneratedNotes>;
}
