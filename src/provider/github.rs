//! GitHub REST API provider
//!
//! Talks to github.com or a GitHub Enterprise host (`/api/v3`). Branch
//! creation goes through the Git Data API: blobs, then a tree on top of
//! the base commit, then a commit, then the branch ref.

use crate::domain::{ChangeType, FileChange};
use crate::error::ProviderError;
use crate::provider::{HttpClient, Provider, RemoteFile, Repository};
use crate::version;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const PER_PAGE: usize = 100;

/// Provider implementation for GitHub and GitHub Enterprise
pub struct GitHubProvider {
    client: HttpClient,
    base_url: String,
    auth: String,
}

impl GitHubProvider {
    /// Creates a provider against github.com, or an Enterprise host when given
    pub fn new(client: HttpClient, host: Option<&str>, token: impl Into<String>) -> Self {
        let base_url = match host {
            Some(host) => format!("https://{host}/api/v3"),
            None => "https://api.github.com".to_string(),
        };
        Self {
            client,
            base_url,
            auth: format!("Bearer {}", token.into()),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> [(&str, &str); 2] {
        [
            ("Authorization", self.auth.as_str()),
            ("Accept", "application/vnd.github+json"),
        ]
    }

    fn raw_headers(&self) -> [(&str, &str); 2] {
        [
            ("Authorization", self.auth.as_str()),
            ("Accept", "application/vnd.github.raw+json"),
        ]
    }

    /// Follows page-numbered list endpoints until a short page arrives
    async fn get_paged<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        resource: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let sep = if path_and_query.contains('?') { '&' } else { '?' };
            let url = self.api_url(&format!("{path_and_query}{sep}per_page={PER_PAGE}&page={page}"));
            let batch: Vec<T> = self
                .client
                .get_json(&url, &self.headers(), resource, self.name())
                .await?;
            let done = batch.len() < PER_PAGE;
            all.extend(batch);
            if done {
                return Ok(all);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    async fn discover_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError> {
        let repos: Vec<RepoResponse> = self
            .get_paged(&format!("/orgs/{org}/repos"), org)
            .await?;
        Ok(repos
            .into_iter()
            .map(|r| {
                Repository::new(
                    r.full_name,
                    r.name,
                    r.default_branch.unwrap_or_else(|| "main".to_string()),
                )
            })
            .collect())
    }

    async fn list_files(
        &self,
        repo: &Repository,
        suffix: &str,
    ) -> Result<Vec<RemoteFile>, ProviderError> {
        let url = self.api_url(&format!(
            "/repos/{}/git/trees/{}?recursive=1",
            repo.id, repo.default_branch
        ));
        let tree: TreeResponse = self
            .client
            .get_json(&url, &self.headers(), &repo.id, self.name())
            .await?;
        Ok(tree
            .tree
            .into_iter()
            .filter(|item| item.kind == "blob" && item.path.ends_with(suffix))
            .map(|item| RemoteFile::new(item.path))
            .collect())
    }

    async fn get_file_content(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<String, ProviderError> {
        let url = self.api_url(&format!(
            "/repos/{}/contents/{}?ref={}",
            repo.id, path, repo.default_branch
        ));
        self.client
            .get_text(&url, &self.raw_headers(), path, self.name())
            .await
    }

    async fn get_tags(&self, repo: &Repository) -> Result<Vec<String>, ProviderError> {
        let tags: Vec<TagResponse> = self
            .get_paged(&format!("/repos/{}/tags", repo.id), &repo.id)
            .await?;
        let mut names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
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
        let name = self.name();
        let base_ref: RefResponse = self
            .client
            .get_json(
                &self.api_url(&format!("/repos/{}/git/ref/heads/{}", repo.id, base)),
                &self.headers(),
                &repo.id,
                name,
            )
            .await?;
        let base_sha = base_ref.object.sha;
        let base_commit: CommitResponse = self
            .client
            .get_json(
                &self.api_url(&format!("/repos/{}/git/commits/{}", repo.id, base_sha)),
                &self.headers(),
                &repo.id,
                name,
            )
            .await?;

        let mut entries = Vec::with_capacity(changes.len());
        for change in changes {
            let sha = match change.change_type {
                ChangeType::Edit | ChangeType::Add => {
                    let blob: ShaRef = self
                        .client
                        .post_json(
                            &self.api_url(&format!("/repos/{}/git/blobs", repo.id)),
                            &self.headers(),
                            &NewBlob {
                                content: &change.content,
                                encoding: "utf-8",
                            },
                            &change.path,
                            name,
                        )
                        .await?;
                    Some(blob.sha)
                }
                // A null blob sha drops the file from the tree.
                ChangeType::Delete => None,
            };
            entries.push(TreeEntry {
                path: &change.path,
                mode: "100644",
                kind: "blob",
                sha,
            });
        }

        let tree: ShaRef = self
            .client
            .post_json(
                &self.api_url(&format!("/repos/{}/git/trees", repo.id)),
                &self.headers(),
                &NewTree {
                    base_tree: &base_commit.tree.sha,
                    tree: entries,
                },
                &repo.id,
                name,
            )
            .await?;
        let commit: ShaRef = self
            .client
            .post_json(
                &self.api_url(&format!("/repos/{}/git/commits", repo.id)),
                &self.headers(),
                &NewCommit {
                    message,
                    tree: &tree.sha,
                    parents: [base_sha.as_str()],
                },
                &repo.id,
                name,
            )
            .await?;
        let _: serde_json::Value = self
            .client
            .post_json(
                &self.api_url(&format!("/repos/{}/git/refs", repo.id)),
                &self.headers(),
                &NewRef {
                    git_ref: format!("refs/heads/{branch}"),
                    sha: &commit.sha,
                },
                branch,
                name,
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
        let pull: PullResponse = self
            .client
            .post_json(
                &self.api_url(&format!("/repos/{}/pulls", repo.id)),
                &self.headers(),
                &NewPull {
                    title,
                    head: source_branch,
                    base: target_branch,
                    body: description,
                },
                &repo.id,
                self.name(),
            )
            .await?;
        Ok(pull.html_url)
    }

    async fn pull_request_exists(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<bool, ProviderError> {
        let owner = repo.id.split('/').next().unwrap_or_default();
        let url = self.api_url(&format!(
            "/repos/{}/pulls?head={}:{}&state=open",
            repo.id, owner, branch
        ));
        let pulls: Vec<serde_json::Value> = self
            .client
            .get_json(&url, &self.headers(), &repo.id, self.name())
            .await?;
        Ok(!pulls.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    name: String,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ShaRef,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Serialize)]
struct NewBlob<'a> {
    content: &'a str,
    encoding: &'a str,
}

#[derive(Debug, Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct TreeEntry<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    sha: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewCommit<'a> {
    message: &'a str,
    tree: &'a str,
    parents: [&'a str; 1],
}

#[derive(Debug, Serialize)]
struct NewRef<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct NewPull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}
