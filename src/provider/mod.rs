//! Git hosting provider abstraction
//!
//! This module provides:
//! - The [`Provider`] trait covering every host operation refup needs
//! - Repository and remote file descriptions
//! - A factory building the right implementation from configuration
//!
//! Implementations exist for GitHub, GitLab and Azure DevOps. Each one is
//! a thin REST adapter over the shared [`HttpClient`].

mod azure;
mod client;
mod github;
mod gitlab;

pub use azure::AzureProvider;
pub use client::HttpClient;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;

use crate::domain::FileChange;
use crate::error::{ConfigError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported Git hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    GitHub,
    GitLab,
    Azure,
}

impl ProviderKind {
    /// Environment variable consulted for the access token by default
    pub fn default_token_var(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "GITHUB_TOKEN",
            ProviderKind::GitLab => "GITLAB_TOKEN",
            ProviderKind::Azure => "AZURE_DEVOPS_PAT",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::GitHub => write!(f, "github"),
            ProviderKind::GitLab => write!(f, "gitlab"),
            ProviderKind::Azure => write!(f, "azure"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(ProviderKind::GitHub),
            "gitlab" => Ok(ProviderKind::GitLab),
            "azure" | "azure-devops" | "azuredevops" => Ok(ProviderKind::Azure),
            _ => Err(ConfigError::unknown_provider(s)),
        }
    }
}

/// A repository on the hosting side
///
/// `id` is the provider-specific identifier used in API routes: the
/// `owner/name` pair on GitHub, the numeric project id on GitLab, and
/// `organization/repository-guid` on Azure DevOps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Provider-specific identifier used in API routes
    pub id: String,
    /// Short repository name
    pub name: String,
    /// Default branch name
    pub default_branch: String,
}

impl Repository {
    /// Creates a new repository description
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            default_branch: default_branch.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A file discovered in a repository tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Repository-relative path
    pub path: String,
}

impl RemoteFile {
    /// Creates a new remote file description
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Operations refup needs from a Git hosting service
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name for error messages and logs
    fn name(&self) -> &'static str;

    /// Lists all repositories in an organization or group
    async fn discover_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError>;

    /// Lists files on the default branch whose path ends with `suffix`
    async fn list_files(
        &self,
        repo: &Repository,
        suffix: &str,
    ) -> Result<Vec<RemoteFile>, ProviderError>;

    /// Fetches the content of a file on the default branch
    async fn get_file_content(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<String, ProviderError>;

    /// Returns true if a file exists on the default branch
    async fn has_file(&self, repo: &Repository, path: &str) -> Result<bool, ProviderError> {
        match self.get_file_content(repo, path).await {
            Ok(_) => Ok(true),
            Err(ProviderError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Lists tag names, newest first
    async fn get_tags(&self, repo: &Repository) -> Result<Vec<String>, ProviderError>;

    /// Creates `branch` off `base` carrying `changes` in a single commit
    async fn create_branch_with_changes(
        &self,
        repo: &Repository,
        branch: &str,
        base: &str,
        changes: &[FileChange],
        message: &str,
    ) -> Result<(), ProviderError>;

    /// Opens a pull request and returns its URL
    async fn create_pull_request(
        &self,
        repo: &Repository,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<String, ProviderError>;

    /// Returns true if an open pull request already exists for `branch`
    async fn pull_request_exists(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<bool, ProviderError>;
}

/// Creates the provider implementation for a kind
pub fn create_provider(
    kind: ProviderKind,
    host: Option<&str>,
    token: impl Into<String>,
) -> Result<Box<dyn Provider>, ProviderError> {
    let client = HttpClient::new()?;
    Ok(match kind {
        ProviderKind::GitHub => Box::new(GitHubProvider::new(client, host, token)),
        ProviderKind::GitLab => Box::new(GitLabProvider::new(client, host, token)),
        ProviderKind::Azure => Box::new(AzureProvider::new(client, host, token)),
    })
}
