use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub target_commitish: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Payload of `PATCH /repos/{org}/{repo}/releases/{id}`. Unset fields are
/// left untouched on GitHub's side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<bool>,
}

impl ReleaseUpdate {
    /// Empty strings count as "not provided".
    pub fn new(name: Option<String>, body: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            body: body.filter(|b| !b.is_empty()),
            draft: None,
            prerelease: None,
        }
    }

    pub fn draft(mut self, draft: bool) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = Some(prerelease);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateNotesRequest {
    pub tag_name: String,
    pub target_commitish: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_tag_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedNotes {
    pub body: String,
}

/// Query string for the closed pull request listing.
#[derive(Debug, Serialize)]
pub(crate) struct PullsQuery<'a> {
    pub state: &'a str,
    pub base: &'a str,
    pub per_page: u8,
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn release_update_omits_unset_fields() {
        let update = ReleaseUpdate::new(None, Some("notes".to_string())).draft(false);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "body": "notes", "draft": false })
        );
    }

    #[test]
    fn release_update_treats_empty_strings_as_absent() {
        let update = ReleaseUpdate::new(Some(String::new()), Some(String::new()));
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));
    }

    #[test]
    fn pull_request_without_merge_time() {
        let pr: PullRequest = serde_json::from_value(json!({
            "number": 7,
            "title": "Close without merging",
            "body": null,
            "merged_at": null,
            "state": "closed"
        }))
        .unwrap();

        assert!(pr.merged_at.is_none());
        assert!(pr.body.is_none());
    }
}
