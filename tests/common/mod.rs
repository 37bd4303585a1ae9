//! Shared mock provider for integration tests
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use refup::config::Settings;
use refup::domain::FileChange;
use refup::error::ProviderError;
use refup::provider::{Provider, ProviderKind, RemoteFile, Repository};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Call record for `create_branch_with_changes`
#[derive(Debug, Clone)]
pub struct CreateBranchCall {
    pub repo: String,
    pub branch: String,
    pub base: String,
    pub message: String,
    pub changes: Vec<FileChange>,
}

/// Call record for `create_pull_request`
#[derive(Debug, Clone)]
pub struct CreatePrCall {
    pub repo: String,
    pub branch: String,
    pub base: String,
    pub title: String,
    pub description: String,
}

#[derive(Default)]
struct MockState {
    repos: Mutex<HashMap<String, Vec<Repository>>>,
    // (repo, path, content) in insertion order so listings are deterministic
    files: Mutex<Vec<(String, String, String)>>,
    tags: Mutex<HashMap<String, Vec<String>>>,
    open_prs: Mutex<Vec<(String, String)>>,
    // Error injection
    fail_discovery_org: Mutex<Option<String>>,
    fail_branch_repo: Mutex<Option<String>>,
    // Call tracking
    tag_calls: AtomicUsize,
    branch_calls: Mutex<Vec<CreateBranchCall>>,
    pr_calls: Mutex<Vec<CreatePrCall>>,
}

/// Mock hosting provider for orchestrator-level tests
///
/// State lives behind an `Arc`, so the clone handed to the orchestrator and
/// the original kept by the test observe the same calls.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<MockState>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // === Fixture setup ===

    /// Register a repository under an organization
    pub fn add_repo(&self, org: &str, name: &str) {
        self.state
            .repos
            .lock()
            .unwrap()
            .entry(org.to_string())
            .or_default()
            .push(Repository::new(format!("{}/{}", org, name), name, "main"));
    }

    /// Put a file on a repository's default branch
    pub fn add_file(&self, repo: &str, path: &str, content: &str) {
        self.state.files.lock().unwrap().push((
            repo.to_string(),
            path.to_string(),
            content.to_string(),
        ));
    }

    /// Set the tag list (newest first) for a repository
    pub fn set_tags(&self, repo: &str, tags: &[&str]) {
        self.state
            .tags
            .lock()
            .unwrap()
            .insert(repo.to_string(), tags.iter().map(|t| t.to_string()).collect());
    }

    /// Mark an upgrade branch as already having an open PR
    pub fn set_open_pr(&self, repo: &str, branch: &str) {
        self.state
            .open_prs
            .lock()
            .unwrap()
            .push((repo.to_string(), branch.to_string()));
    }

    // === Error injection ===

    /// Make discovery fail for one organization
    pub fn fail_discovery(&self, org: &str) {
        *self.state.fail_discovery_org.lock().unwrap() = Some(org.to_string());
    }

    /// Make branch creation fail for one repository
    pub fn fail_branch_creation(&self, repo: &str) {
        *self.state.fail_branch_repo.lock().unwrap() = Some(repo.to_string());
    }

    // === Call verification ===

    /// Number of `get_tags` calls across the run
    pub fn tag_fetches(&self) -> usize {
        self.state.tag_calls.load(Ordering::SeqCst)
    }

    /// All recorded branch creations
    pub fn created_branches(&self) -> Vec<CreateBranchCall> {
        self.state.branch_calls.lock().unwrap().clone()
    }

    /// All recorded pull request creations
    pub fn created_prs(&self) -> Vec<CreatePrCall> {
        self.state.pr_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn discover_repositories(&self, org: &str) -> Result<Vec<Repository>, ProviderError> {
        if self.state.fail_discovery_org.lock().unwrap().as_deref() == Some(org) {
            return Err(ProviderError::network(org, "mock", "injected failure"));
        }
        self.state
            .repos
            .lock()
            .unwrap()
            .get(org)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(org, "mock"))
    }

    async fn list_files(
        &self,
        repo: &Repository,
        suffix: &str,
    ) -> Result<Vec<RemoteFile>, ProviderError> {
        Ok(self
            .state
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, path, _)| r == &repo.name && path.ends_with(suffix))
            .map(|(_, path, _)| RemoteFile::new(path.clone()))
            .collect())
    }

    async fn get_file_content(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<String, ProviderError> {
        self.state
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|(r, p, _)| r == &repo.name && p == path)
            .map(|(_, _, content)| content.clone())
            .ok_or_else(|| ProviderError::not_found(path, "mock"))
    }

    async fn get_tags(&self, repo: &Repository) -> Result<Vec<String>, ProviderError> {
        self.state.tag_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .tags
            .lock()
            .unwrap()
            .get(&repo.name)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(&repo.name, "mock"))
    }

    async fn create_branch_with_changes(
        &self,
        repo: &Repository,
        branch: &str,
        base: &str,
        changes: &[FileChange],
        message: &str,
    ) -> Result<(), ProviderError> {
        if self.state.fail_branch_repo.lock().unwrap().as_deref() == Some(repo.name.as_str()) {
            return Err(ProviderError::network(&repo.name, "mock", "injected failure"));
        }
        self.state
            .branch_calls
            .lock()
            .unwrap()
            .push(CreateBranchCall {
                repo: repo.name.clone(),
                branch: branch.to_string(),
                base: base.to_string(),
                message: message.to_string(),
                changes: changes.to_vec(),
            });
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
        let mut calls = self.state.pr_calls.lock().unwrap();
        calls.push(CreatePrCall {
            repo: repo.name.clone(),
            branch: source_branch.to_string(),
            base: target_branch.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        });
        Ok(format!("https://mock.host/{}/pull/{}", repo.name, calls.len()))
    }

    async fn pull_request_exists(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<bool, ProviderError> {
        Ok(self
            .state
            .open_prs
            .lock()
            .unwrap()
            .iter()
            .any(|(r, b)| r == &repo.name && b == branch))
    }
}

/// Settings for a run over one organization with mock-friendly defaults
pub fn test_settings(org: &str) -> Settings {
    Settings {
        provider: ProviderKind::GitHub,
        host: None,
        orgs: vec![org.to_string()],
        base_branch: None,
        changelog: false,
        runtime_scripts: false,
        dry_run: false,
        token: "test-token".to_string(),
    }
}
