use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod aggregator;
mod config;
mod error;
mod github;

use aggregator::changelog_generator::{ChangelogGenerator, OutputFormat};
use aggregator::{NotesRequest, NotesStrategy, PublishOptions, ReleaseComposer};
use config::Config;
use error::ReleaseNotesError;
use github::token::{CredentialProvider, TokenChain};
use github::GitHubClient;

#[derive(Parser)]
#[command(name = "release-notes")]
#[command(about = "Generate release notes from merged pull requests and publish them to a GitHub release")]
struct Cli {
    /// Tag of the release to generate notes for
    release_tag: Option<String>,

    /// Branch or commit the release points at
    target: Option<String>,

    /// Tag of the previous release (defaults to the most recent release)
    previous_tag: Option<String>,

    /// GitHub token; falls back to the gh CLI session when unset
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Organization or user owning the repository
    #[arg(long, env = "GITHUB_ORG")]
    org: Option<String>,

    /// Repository name
    #[arg(long, env = "GITHUB_REPO")]
    repo: Option<String>,

    /// Base branch the pull requests were merged into
    #[arg(long)]
    base: Option<String>,

    /// Config file (defaults to ./release-notes.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How to build the release body
    #[arg(short, long, value_enum)]
    strategy: Option<NotesStrategy>,

    /// Output format
    #[arg(short = 'f', long)]
    format: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the notes without updating the release
    #[arg(long)]
    no_publish: bool,

    /// Mark the release as a draft when publishing
    #[arg(long)]
    draft: bool,

    /// Mark the release as a prerelease when publishing
    #[arg(long)]
    prerelease: bool,

    /// New release title
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let org = cli.org.unwrap_or(config.github.org);
    let repo = cli.repo.unwrap_or(config.github.repo);
    let base_branch = cli.base.unwrap_or(config.github.base_branch);
    let strategy = cli.strategy.unwrap_or(config.defaults.strategy);
    let format = cli.format.unwrap_or(config.output.format);
    let output = cli.output.or(config.output.path);
    let publish = config.publish.enabled && !cli.no_publish;
    let options = PublishOptions {
        name: cli.name,
        draft: cli.draft || config.publish.draft,
        prerelease: cli.prerelease || config.publish.prerelease,
    };
    let request = NotesRequest {
        release_tag: cli.release_tag.unwrap_or(config.defaults.release_tag),
        target: cli.target.unwrap_or(config.defaults.target),
        previous_tag: cli.previous_tag,
    };

    let token = TokenChain::standard(cli.token).get_credential()?;
    let github_client = GitHubClient::new(token, org.clone(), repo.clone()).await?;
    let composer = ReleaseComposer::new(&github_client, base_branch);

    info!(%org, %repo, tag = %request.release_tag, ?strategy, "generating release notes");

    let current = match composer.find_release(&request.release_tag).await? {
        None if publish => {
            return Err(ReleaseNotesError::ReleaseNotFound(request.release_tag.clone()).into())
        }
        release => release,
    };

    let notes = composer.compose(strategy, &request, current.as_ref()).await?;
    let content = ChangelogGenerator::new(format).generate(&notes)?;

    if let Some(output_path) = output {
        std::fs::write(&output_path, &content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        info!(path = %output_path.display(), "Release notes written successfully");
    } else {
        println!("{}", content.trim_end());
    }

    if let Some(release) = current.as_ref().filter(|_| publish) {
        composer.publish(release, &notes, &options).await?;
    }

    Ok(())
}
