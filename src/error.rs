use thiserror::Error;

/// Errors that end a release-notes run.
#[derive(Debug, Error)]
pub enum ReleaseNotesError {
    /// Neither `GITHUB_TOKEN` nor the gh CLI produced a token
    #[error("You must provide a GitHub access token via GITHUB_TOKEN or have the gh CLI installed")]
    CredentialMissing,

    /// The gh CLI ran but its output could not be used
    #[error("Failed to retrieve a token from the GitHub CLI: {0}")]
    CredentialDiscovery(String),

    /// A read endpoint answered with an error or an unexpected payload
    #[error("Error fetching {what}: {source}")]
    RemoteFetch {
        what: String,
        #[source]
        source: octocrab::Error,
    },

    /// The release PATCH was rejected
    #[error("Error updating release {id}: {source}")]
    RemoteUpdate {
        id: u64,
        #[source]
        source: octocrab::Error,
    },

    #[error("Release with tag '{0}' not found")]
    ReleaseNotFound(String),

    #[error("Failed to build GitHub client: {0}")]
    Client(#[source] octocrab::Error),
}

impl ReleaseNotesError {
    pub fn fetch(what: impl Into<String>, source: octocrab::Error) -> Self {
        Self::RemoteFetch {
            what: what.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReleaseNotesError>;
