use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregator::changelog_generator::OutputFormat;
use crate::aggregator::NotesStrategy;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub defaults: DefaultsConfig,
    pub output: OutputConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub org: String,
    pub repo: String,
    pub base_branch: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub release_tag: String,
    pub target: String,
    pub strategy: NotesStrategy,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    pub draft: bool,
    pub prerelease: bool,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            org: "amirraouf".to_string(),
            repo: "gh-release-automation".to_string(),
            base_branch: "master".to_string(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            release_tag: "main".to_string(),
            target: "main".to_string(),
            strategy: NotesStrategy::PullRequests,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            enabled: true,
            draft: false,
            prerelease: false,
        }
    }
}
