//! GitLab REST API provider
//!
//! Talks to gitlab.com or a self-managed host (`/api/v4`). Branch creation
//! uses the commits endpoint, which creates the branch and applies every
//! file action in one call via `start_branch`.

use crate::domain::{ChangeType, FileChange};
use crate::error::ProviderError;
use crate::provider::{HttpClient, Provider, RemoteFile, Repository};
use crate::version;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const PER_PAGE: usize = 100;

/// Provider implementation for GitLab and self-managed GitLab
pub struct GitLabProvider {
    client: HttpClient,
    base_url: String,
    token: String,
}

impl GitLabProvider {
    /// Creates a provider against gitlab.com, or a self-managed host when given
    pub fn new(client: HttpClient, host: Option<&str>, token: impl Into<String>) -> Self {
        let host = host.unwrap_or("gitlab.com");
        Self {
            client,
            base_url: format!("https://{host}/api/v4"),
            token: token.into(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> [(&str, &str); 1] {
        [("PRIVATE-TOKEN", self.token.as_str())]
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
impl Provider for GitLabProvider {
    fn name(&self) -> &'static str {
        "GitLab"
    }

    async fn discover_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError> {
        let group = urlencoding::encode(org);
        let projects: Vec<ProjectResponse> = self
            .get_paged(&format!("/groups/{group}/projects"), org)
            .await?;
        Ok(projects
            .into_iter()
            .map(|p| {
                Repository::new(
                    p.id.to_string(),
                    p.path,
                    p.default_branch.unwrap_or_else(|| "main".to_string()),
                )
            })
            .collect())
    }

    async fn list_files(
        &self,
        repo: &Repository,
        suffix: &str,
    ) -> Result<Vec<RemoteFile>, ProviderError> {
        let items: Vec<TreeItem> = self
            .get_paged(
                &format!(
                    "/projects/{}/repository/tree?recursive=true&ref={}",
                    repo.id, repo.default_branch
                ),
                &repo.name,
            )
            .await?;
        Ok(items
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
        let encoded = urlencoding::encode(path);
        let url = self.api_url(&format!(
            "/projects/{}/repository/files/{}/raw?ref={}",
            repo.id, encoded, repo.default_branch
        ));
        self.client
            .get_text(&url, &self.headers(), path, self.name())
            .await
    }

    async fn get_tags(&self, repo: &Repository) -> Result<Vec<String>, ProviderError> {
        let tags: Vec<TagResponse> = self
            .get_paged(&format!("/projects/{}/repository/tags", repo.id), &repo.name)
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
        let actions: Vec<CommitAction> = changes
            .iter()
            .map(|change| CommitAction {
                action: match change.change_type {
                    ChangeType::Edit => "update",
                    ChangeType::Add => "create",
                    ChangeType::Delete => "delete",
                },
                file_path: &change.path,
                content: match change.change_type {
                    ChangeType::Delete => None,
                    _ => Some(&change.content),
                },
            })
            .collect();
        let _: serde_json::Value = self
            .client
            .post_json(
                &self.api_url(&format!("/projects/{}/repository/commits", repo.id)),
                &self.headers(),
                &NewCommit {
                    branch,
                    start_branch: base,
                    commit_message: message,
                    actions,
                },
                &repo.name,
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
        let merge_request: MergeRequestResponse = self
            .client
            .post_json(
                &self.api_url(&format!("/projects/{}/merge_requests", repo.id)),
                &self.headers(),
                &NewMergeRequest {
                    source_branch,
                    target_branch,
                    title,
                    description,
                },
                &repo.name,
                self.name(),
            )
            .await?;
        Ok(merge_request.web_url)
    }

    async fn pull_request_exists(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<bool, ProviderError> {
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests?source_branch={}&state=opened",
            repo.id, branch
        ));
        let open: Vec<serde_json::Value> = self
            .client
            .get_json(&url, &self.headers(), &repo.name, self.name())
            .await?;
        Ok(!open.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    id: u64,
    path: String,
    default_branch: Option<String>,
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

#[derive(Debug, Serialize)]
struct NewCommit<'a> {
    branch: &'a str,
    start_branch: &'a str,
    commit_message: &'a str,
    actions: Vec<CommitAction<'a>>,
}

#[derive(Debug, Serialize)]
struct CommitAction<'a> {
    action: &'a str,
    file_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct NewMergeRequest<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct MergeRequestResponse {
    web_url: String,
}
