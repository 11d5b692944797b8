use octocrab::Octocrab;
use tracing::debug;

use super::ports::{PullRequestSource, ReleaseRepository};
use super::types::{
    GenerateNotesRequest, GeneratedNotes, PullRequest, PullsQuery, Release, ReleaseUpdate,
};
use crate::error::{ReleaseNotesError, Result};

pub const PAGE_SIZE: u8 = 100;

pub struct GitHubClient {
    client: Octocrab,
    org: String,
    repo: String,
}

impl GitHubClient {
    pub async fn new(token: String, org: String, repo: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(ReleaseNotesError::Client)?;
        Ok(Self::from_octocrab(client, org, repo))
    }

    pub fn from_octocrab(client: Octocrab, org: String, repo: String) -> Self {
        Self { client, org, repo }
    }

    #[cfg(test)]
    pub(crate) fn for_mock_server(url: &str) -> Self {
        let client = Octocrab::builder()
            .base_uri(url)
            .unwrap()
            .personal_token("test-token".to_string())
            .build()
            .unwrap();
        Self::from_octocrab(client, "acme".to_string(), "widgets".to_string())
    }

    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{}", self.org, self.repo, path)
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.message.contains("Not Found"))
}

impl PullRequestSource for GitHubClient {
    async fn closed_pulls_page(&self, base: &str, page: u32) -> Result<Vec<PullRequest>> {
        debug!(page, base, "requesting closed pull requests");
        let query = PullsQuery {
            state: "closed",
            base,
            per_page: PAGE_SIZE,
            page,
        };

        self.client
            .get(self.route("pulls"), Some(&query))
            .await
            .map_err(|e| ReleaseNotesError::fetch(format!("pull requests page {}", page), e))
    }
}

impl ReleaseRepository for GitHubClient {
    async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let result: octocrab::Result<Release> = self
            .client
            .get(self.route(&format!("releases/tags/{}", tag)), None::<&()>)
            .await;

        match result {
            Ok(release) => Ok(Some(release)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(ReleaseNotesError::fetch(format!("release {}", tag), e)),
        }
    }

    async fn list_releases(&self) -> Result<Vec<Release>> {
        self.client
            .get(self.route("releases"), Some(&[("per_page", PAGE_SIZE)]))
            .await
            .map_err(|e| ReleaseNotesError::fetch("releases", e))
    }

    async fn update_release(&self, id: u64, update: &ReleaseUpdate) -> Result<Release> {
        self.client
            .patch(self.route(&format!("releases/{}", id)), Some(update))
            .await
            .map_err(|source| ReleaseNotesError::RemoteUpdate { id, source })
    }

    async fn generate_notes(&self, request: &GenerateNotesRequest) -> Result<GeneratedNotes> {
        self.client
            .post(self.route("releases/generate-notes"), Some(request))
            .await
            .map_err(|e| ReleaseNotesError::fetch("generated release notes", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> GitHubClient {
        GitHubClient::for_mock_server(&server.url())
    }

    fn release_json(id: u64, tag: &str, created_at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "tag_name": tag,
            "name": tag,
            "body": null,
            "draft": false,
            "prerelease": false,
            "created_at": created_at,
            "published_at": created_at,
            "target_commitish": "main"
        })
    }

    #[tokio::test]
    async fn fetches_release_by_tag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/widgets/releases/tags/v1.0.0")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(release_json(42, "v1.0.0", "2024-01-15T00:00:00Z").to_string())
            .create_async()
            .await;

        let release = client_for(&server)
            .release_by_tag("v1.0.0")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(release.id, 42);
        assert_eq!(release.tag_name, "v1.0.0");
    }

    #[tokio::test]
    async fn missing_release_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/releases/tags/nope")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#)
            .create_async()
            .await;

        let release = client_for(&server).release_by_tag("nope").await.unwrap();
        assert!(release.is_none());
    }

    #[tokio::test]
    async fn requests_closed_pulls_with_paging_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/widgets/pulls")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "closed".into()),
                Matcher::UrlEncoded("base".into(), "master".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([{
                    "number": 3,
                    "title": "Fix bug",
                    "body": "### Fixed\n- bug one",
                    "merged_at": "2024-02-01T10:00:00Z"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let page = client_for(&server)
            .closed_pulls_page("master", 2)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Fix bug");
    }

    #[tokio::test]
    async fn rejected_pulls_page_is_a_fetch_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/pulls")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .closed_pulls_page("master", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseNotesError::RemoteFetch { .. }));
    }

    #[tokio::test]
    async fn malformed_pulls_page_is_a_fetch_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/pulls")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .closed_pulls_page("master", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseNotesError::RemoteFetch { .. }));
    }

    #[tokio::test]
    async fn patches_release_with_only_set_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/repos/acme/widgets/releases/42")
            .match_body(Matcher::Json(json!({
                "body": "## ABC-1 - Fix bug\n",
                "draft": false,
                "prerelease": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(release_json(42, "v1.0.0", "2024-01-15T00:00:00Z").to_string())
            .create_async()
            .await;

        let update = ReleaseUpdate::new(None, Some("## ABC-1 - Fix bug\n".to_string()))
            .draft(false)
            .prerelease(false);
        let release = client_for(&server)
            .update_release(42, &update)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(release.id, 42);
    }

    #[tokio::test]
    async fn rejected_patch_is_an_update_error() {
        let mut server = Server::new_async().await;
        server
            .mock("PATCH", "/repos/acme/widgets/releases/42")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Validation Failed","documentation_url":"https://docs.github.com"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .update_release(42, &ReleaseUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseNotesError::RemoteUpdate { id: 42, .. }));
    }

    #[tokio::test]
    async fn posts_generate_notes_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/acme/widgets/releases/generate-notes")
            .match_body(Matcher::Json(json!({
                "tag_name": "v2.0.0",
                "target_commitish": "main",
                "previous_tag_name": "v1.0.0"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "name": "v2.0.0", "body": "## What's Changed" }).to_string())
            .create_async()
            .await;

        let request = GenerateNotesRequest {
            tag_name: "v2.0.0".to_string(),
            target_commitish: "main".to_string(),
            previous_tag_name: Some("v1.0.0".to_string()),
        };
        let notes = client_for(&server).generate_notes(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(notes.body, "## What's Changed");
    }
}
