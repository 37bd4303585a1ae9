//! Azure DevOps REST API provider
//!
//! Organizations are given as `organization/project`; a bare name is used
//! for both halves. Repository ids embed the organization
//! (`organization/repository-guid`) so repo-scoped routes can be built
//! without extra state. Branch creation is two calls: a ref update placing
//! the new branch at the base commit, then a push with the file changes.

use crate::domain::{ChangeType, FileChange};
use crate::error::ProviderError;
use crate::provider::{HttpClient, Provider, RemoteFile, Repository};
use crate::version;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "7.1";
const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

/// Provider implementation for Azure DevOps
pub struct AzureProvider {
    client: HttpClient,
    base_url: String,
    auth: String,
}

impl AzureProvider {
    /// Creates a provider against dev.azure.com, or an on-premises host when given
    pub fn new(client: HttpClient, host: Option<&str>, token: impl Into<String>) -> Self {
        let host = host.unwrap_or("dev.azure.com");
        // PATs go over basic auth with an empty user name.
        let auth = format!("Basic {}", STANDARD.encode(format!(":{}", token.into())));
        Self {
            client,
            base_url: format!("https://{host}"),
            auth,
        }
    }

    fn headers(&self) -> [(&str, &str); 1] {
        [("Authorization", self.auth.as_str())]
    }

    /// Splits an `organization/project` entry; a bare name serves as both
    fn split_org(org: &str) -> (&str, &str) {
        match org.split_once('/') {
            Some((organization, project)) => (organization, project),
            None => (org, org),
        }
    }

    /// Builds a repository-scoped API route from the embedded organization
    fn repo_url(&self, repo: &Repository, path_and_query: &str) -> String {
        let (organization, repo_id) = repo
            .id
            .split_once('/')
            .unwrap_or((repo.id.as_str(), repo.id.as_str()));
        format!(
            "{}/{}/_apis/git/repositories/{}{}",
            self.base_url, organization, repo_id, path_and_query
        )
    }

    /// Reads the commit id a branch points at
    async fn branch_sha(&self, repo: &Repository, branch: &str) -> Result<String, ProviderError> {
        let url = self.repo_url(
            repo,
            &format!("/refs?filter=heads/{branch}&api-version={API_VERSION}"),
        );
        let refs: ValueList<RefItem> = self
            .client
            .get_json(&url, &self.headers(), &repo.name, self.name())
            .await?;
        // The filter is prefix-based, so pick the exact ref.
        let wanted = format!("refs/heads/{branch}");
        refs.value
            .into_iter()
            .find(|r| r.name == wanted)
            .map(|r| r.object_id)
            .ok_or_else(|| ProviderError::not_found(wanted, self.name()))
    }
}

#[async_trait]
impl Provider for AzureProvider {
    fn name(&self) -> &'static str {
        "Azure DevOps"
    }

    async fn discover_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError> {
        let (organization, project) = Self::split_org(org);
        let url = format!(
            "{}/{}/{}/_apis/git/repositories?api-version={}",
            self.base_url, organization, project, API_VERSION
        );
        let repos: ValueList<RepoItem> = self
            .client
            .get_json(&url, &self.headers(), org, self.name())
            .await?;
        Ok(repos
            .value
            .into_iter()
            .map(|r| {
                let default_branch = r
                    .default_branch
                    .as_deref()
                    .and_then(|name| name.strip_prefix("refs/heads/"))
                    .unwrap_or("main")
                    .to_string();
                Repository::new(format!("{organization}/{}", r.id), r.name, default_branch)
            })
            .collect())
    }

    async fn list_files(
        &self,
        repo: &Repository,
        suffix: &str,
    ) -> Result<Vec<RemoteFile>, ProviderError> {
        let url = self.repo_url(
            repo,
            &format!("/items?recursionLevel=full&api-version={API_VERSION}"),
        );
        let items: ValueList<ItemEntry> = self
            .client
            .get_json(&url, &self.headers(), &repo.name, self.name())
            .await?;
        Ok(items
            .value
            .into_iter()
            .filter(|item| !item.is_folder && item.path.ends_with(suffix))
            .map(|item| RemoteFile::new(item.path.trim_start_matches('/')))
            .collect())
    }

    async fn get_file_content(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<String, ProviderError> {
        let full_path = format!("/{}", path.trim_start_matches('/'));
        let url = self.repo_url(
            repo,
            &format!(
                "/items?path={}&includeContent=true&$format=json&api-version={}",
                urlencoding::encode(&full_path),
                API_VERSION
            ),
        );
        let item: ItemContent = self
            .client
            .get_json(&url, &self.headers(), path, self.name())
            .await?;
        Ok(item.content)
    }

    async fn get_tags(&self, repo: &Repository) -> Result<Vec<String>, ProviderError> {
        let url = self.repo_url(repo, &format!("/refs?filter=tags/&api-version={API_VERSION}"));
        let refs: ValueList<RefItem> = self
            .client
            .get_json(&url, &self.headers(), &repo.name, self.name())
            .await?;
        let mut names: Vec<String> = refs
            .value
            .into_iter()
            .map(|r| r.name.trim_start_matches("refs/tags/").to_string())
            .collect();
        names.sort_by(|a, b| version::compare(b, a));
        Ok(names)
    }

    async fn create_branch_with_changes(
        &self,
        repo: &Repository,
        branch: &str,
        base: &str,
        changes: &[FileChange],
        message: &str,
    ) -> Result<(), ProviderError> {
        let base_sha = self.branch_sha(repo, base).await?;
        let ref_name = format!("refs/heads/{branch}");

        let _: serde_json::Value = self
            .client
            .post_json(
                &self.repo_url(repo, &format!("/refs?api-version={API_VERSION}")),
                &self.headers(),
                &[RefWrite {
                    name: &ref_name,
                    old_object_id: ZERO_SHA,
                    new_object_id: &base_sha,
                }],
                branch,
                self.name(),
            )
            .await?;

        let push_changes: Vec<PushChange> = changes
            .iter()
            .map(|change| PushChange {
                change_type: match change.change_type {
                    ChangeType::Edit => "edit",
                    ChangeType::Add => "add",
                    ChangeType::Delete => "delete",
                },
                item: PushItem {
                    path: format!("/{}", change.path.trim_start_matches('/')),
                },
                new_content: match change.change_type {
                    ChangeType::Delete => None,
                    _ => Some(PushContent {
                        content: &change.content,
                        content_type: "rawtext",
                    }),
                },
            })
            .collect();
        let _: serde_json::Value = self
            .client
            .post_json(
                &self.repo_url(repo, &format!("/pushes?api-version={API_VERSION}")),
                &self.headers(),
                &NewPush {
                    ref_updates: [RefUpdate {
                        name: &ref_name,
                        old_object_id: &base_sha,
                    }],
                    commits: [PushCommit {
                        comment: message,
                        changes: push_changes,
                    }],
                },
                branch,
                self.name(),
            )
            .await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &Repository,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<String, ProviderError> {
        let pull: PullCreated = self
            .client
            .post_json(
                &self.repo_url(repo, &format!("/pullrequests?api-version={API_VERSION}")),
                &self.headers(),
                &NewPull {
                    source_ref_name: &format!("refs/heads/{source_branch}"),
                    target_ref_name: &format!("refs/heads/{target_branch}"),
                    title,
                    description,
                },
                &repo.name,
                self.name(),
            )
            .await?;
        Ok(format!(
            "{}/pullrequest/{}",
            pull.repository.web_url, pull.pull_request_id
        ))
    }

    async fn pull_request_exists(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<bool, ProviderError> {
        let url = self.repo_url(
            repo,
            &format!(
                "/pullrequests?searchCriteria.sourceRefName=refs/heads/{}&searchCriteria.status=active&api-version={}",
                branch, API_VERSION
            ),
        );
        let open: ValueList<serde_json::Value> = self
            .client
            .get_json(&url, &self.headers(), &repo.name, self.name())
            .await?;
        Ok(!open.value.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ValueList<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RepoItem {
    id: String,
    name: String,
    #[serde(rename = "defaultBranch")]
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    path: String,
    #[serde(rename = "isFolder", default)]
    is_folder: bool,
}

#[derive(Debug, Deserialize)]
struct ItemContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RefItem {
    name: String,
    #[serde(rename = "objectId")]
    object_id: String,
}

#[derive(Debug, Serialize)]
struct RefWrite<'a> {
    name: &'a str,
    #[serde(rename = "oldObjectId")]
    old_object_id: &'a str,
    #[serde(rename = "newObjectId")]
    new_object_id: &'a str,
}

#[derive(Debug, Serialize)]
struct NewPush<'a> {
    #[serde(rename = "refUpdates")]
    ref_updates: [RefUpdate<'a>; 1],
    commits: [PushCommit<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RefUpdate<'a> {
    name: &'a str,
    #[serde(rename = "oldObjectId")]
    old_object_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PushCommit<'a> {
    comment: &'a str,
    changes: Vec<PushChange<'a>>,
}

#[derive(Debug, Serialize)]
struct PushChange<'a> {
    #[serde(rename = "changeType")]
    change_type: &'a str,
    item: PushItem,
    #[serde(rename = "newContent", skip_serializing_if = "Option::is_none")]
    new_content: Option<PushContent<'a>>,
}

#[derive(Debug, Serialize)]
struct PushItem {
    path: String,
}

#[derive(Debug, Serialize)]
struct PushContent<'a> {
    content: &'a str,
    #[serde(rename = "contentType")]
    content_type: &'a str,
}

#[derive(Debug, Serialize)]
struct NewPull<'a> {
    #[serde(rename = "sourceRefName")]
    source_ref_name: &'a str,
    #[serde(rename = "targetRefName")]
    target_ref_name: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullCreated {
    #[serde(rename = "pullRequestId")]
    pull_request_id: u64,
    repository: PullRepo,
}

#[derive(Debug, Deserialize)]
struct PullRepo {
    #[serde(rename = "webUrl")]
    web_url: String,
}
