//! GitHub credential discovery.
//!
//! A token comes from `GITHUB_TOKEN` (or `--token`) when set, otherwise from
//! the session stored by the `gh` CLI.

use std::io::ErrorKind;
use std::process::Command;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::{ReleaseNotesError, Result};

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"Token:\s(.*)").unwrap();
}

pub trait CredentialProvider {
    fn get_credential(&self) -> Result<String>;
}

/// A token handed over explicitly, typically from the environment.
pub struct StaticToken(pub Option<String>);

impl CredentialProvider for StaticToken {
    fn get_credential(&self) -> Result<String> {
        self.0
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ReleaseNotesError::CredentialMissing)
    }
}

/// Reads the token out of `gh auth status --show-token`.
pub struct GhCliToken {
    program: String,
    args: Vec<String>,
}

impl Default for GhCliToken {
    fn default() -> Self {
        Self::with_command("gh", Vec::<String>::new())
    }
}

impl GhCliToken {
    /// `program` is run with `args` followed by `auth status --show-token`.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl CredentialProvider for GhCliToken {
    fn get_credential(&self) -> Result<String> {
        let output = match Command::new(&self.program)
            .args(&self.args)
            .args(["auth", "status", "--show-token"])
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ReleaseNotesError::CredentialMissing)
            }
            Err(e) => return Err(ReleaseNotesError::CredentialDiscovery(e.to_string())),
        };

        // gh >= 2.40 reports on stdout, older releases on stderr
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ReleaseNotesError::CredentialDiscovery(format!(
                "`{} auth status` exited with {}:\n{}{}",
                self.program, output.status, stdout, stderr
            )));
        }

        parse_status_token(&stdout)
            .or_else(|| parse_status_token(&stderr))
            .ok_or_else(|| {
                ReleaseNotesError::CredentialDiscovery(format!(
                    "no token found in GitHub CLI output:\n{}{}",
                    stdout, stderr
                ))
            })
    }
}

/// Tries each provider in order; the first token wins.
pub struct TokenChain(Vec<Box<dyn CredentialProvider>>);

impl TokenChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self(providers)
    }

    pub fn standard(explicit: Option<String>) -> Self {
        Self::new(vec![
            Box::new(StaticToken(explicit)),
            Box::new(GhCliToken::default()),
        ])
    }
}

impl CredentialProvider for TokenChain {
    fn get_credential(&self) -> Result<String> {
        for provider in &self.0 {
            match provider.get_credential() {
                Ok(token) => return Ok(token),
                Err(ReleaseNotesError::CredentialMissing) => {
                    debug!("credential source empty, trying the next one");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(ReleaseNotesError::CredentialMissing)
    }
}

pub fn parse_status_token(output: &str) -> Option<String> {
    TOKEN_RE
        .captures(output)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .filter(|token| !token.is_empty())
}
