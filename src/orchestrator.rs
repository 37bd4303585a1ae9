//! Run orchestration across organizations and repositories
//!
//! This module provides:
//! - Workflow coordination: discover → scan → plan → patch → pull request
//! - Organization traversal with partial continuation on failure
//! - Dry-run mode and open-PR deduplication
//! - Optional changelog and runtime script enrichment of upgrade branches

use crate::changelog;
use crate::config::Settings;
use crate::domain::{FileChange, PlannedUpgrade, RepoOutcome, RunSummary, UpgradeTask};
use crate::error::ProviderError;
use crate::patch;
use crate::plan::{ScannedFile, UpgradePlanner};
use crate::pr;
use crate::progress::ScanProgress;
use crate::provider::{create_provider, Provider, Repository};
use crate::resolve::VersionResolver;
use crate::runtime;
use crate::scan;

/// Coordinates a full scan-and-upgrade run
pub struct Orchestrator {
    /// Resolved runtime settings
    settings: Settings,
    /// Hosting provider the run talks to
    provider: Box<dyn Provider>,
}

impl Orchestrator {
    /// Creates an orchestrator with the provider named in the settings
    pub fn new(settings: Settings) -> Result<Self, ProviderError> {
        let provider = create_provider(
            settings.provider,
            settings.host.as_deref(),
            settings.token.clone(),
        )?;
        Ok(Self { settings, provider })
    }

    /// Creates an orchestrator with a custom provider (for testing)
    pub fn with_provider(settings: Settings, provider: Box<dyn Provider>) -> Self {
        Self { settings, provider }
    }

    /// Runs the upgrade workflow over every configured organization
    ///
    /// Failures never abort the run: a failed discovery becomes an
    /// organization-level error, a failed repository a `Failed` outcome,
    /// and processing moves on to the next item.
    pub async fn run(&self, show_progress: bool) -> RunSummary {
        let mut progress = ScanProgress::new(show_progress);
        let mut summary = RunSummary::new(self.settings.dry_run);

        for org in &self.settings.orgs {
            progress.discovering(org);
            let repos = match self.provider.discover_repositories(org).await {
                Ok(repos) => repos,
                Err(e) => {
                    progress.finish_and_clear();
                    summary.add_error(format!("discovery failed for {}: {}", org, e));
                    continue;
                }
            };
            progress.finish_and_clear();

            // One planner per org so tag lookups are shared across its repos
            let mut planner =
                UpgradePlanner::new(VersionResolver::new(self.provider.as_ref(), &repos));

            progress.start_org(org, repos.len() as u64);
            for repo in &repos {
                progress.scanning(&repo.name);
                let outcome = match self.process_repo(org, repo, &mut planner).await {
                    Ok(outcome) => outcome,
                    Err(e) => RepoOutcome::failed(org, &repo.name, e.to_string()),
                };
                summary.add(outcome);
                progress.inc();
            }
            progress.finish_and_clear();
        }

        summary
    }

    /// Processes one repository from scan to pull request
    async fn process_repo(
        &self,
        org: &str,
        repo: &Repository,
        planner: &mut UpgradePlanner<'_>,
    ) -> Result<RepoOutcome, ProviderError> {
        let files = self.scan_repo(repo).await?;
        let plan = planner.plan(&files).await;

        if plan.is_empty() {
            return Ok(RepoOutcome::no_upgrades(org, &repo.name, plan.skips));
        }

        let upgrades: Vec<PlannedUpgrade> =
            plan.tasks.iter().map(PlannedUpgrade::from_task).collect();

        let branch = pr::branch_name(&plan.tasks);
        if self.provider.pull_request_exists(repo, &branch).await? {
            return Ok(RepoOutcome::pr_already_open(
                org, &repo.name, upgrades, plan.skips, branch,
            ));
        }

        if self.settings.dry_run {
            return Ok(RepoOutcome::dry_run(org, &repo.name, upgrades, plan.skips));
        }

        let mut changes = patch::apply_upgrades(&plan.tasks);
        if self.settings.changelog {
            if let Some(change) = self.changelog_change(repo, &plan.tasks).await? {
                changes.push(change);
            }
        }
        if self.settings.runtime_scripts {
            let scripts =
                runtime::detect_runtime_updates(self.provider.as_ref(), repo).await?;
            changes.extend(scripts);
        }

        let base = self
            .settings
            .base_branch
            .clone()
            .unwrap_or_else(|| repo.default_branch.clone());

        self.provider
            .create_branch_with_changes(
                repo,
                &branch,
                &base,
                &changes,
                &pr::commit_message(&plan.tasks),
            )
            .await?;
        let url = self
            .provider
            .create_pull_request(
                repo,
                &branch,
                &base,
                &pr::pr_title(&plan.tasks),
                &pr::pr_description(&plan.tasks),
            )
            .await?;

        Ok(RepoOutcome::upgraded(org, &repo.name, upgrades, plan.skips, url))
    }

    /// Lists candidate files and scans them for pinned references
    ///
    /// Files without any pinned reference are dropped here, so the planner
    /// only ever sees files that matter.
    async fn scan_repo(&self, repo: &Repository) -> Result<Vec<ScannedFile>, ProviderError> {
        let mut files = Vec::new();
        for suffix in scan::SCAN_SUFFIXES {
            for remote in self.provider.list_files(repo, suffix).await? {
                let content = self.provider.get_file_content(repo, &remote.path).await?;
                let dependencies = scan::scan(&content, &remote.path);
                if !dependencies.is_empty() {
                    files.push(ScannedFile::new(remote.path, content, dependencies));
                }
            }
        }
        Ok(files)
    }

    /// Builds the changelog edit for the planned tasks, if the repo keeps one
    async fn changelog_change(
        &self,
        repo: &Repository,
        tasks: &[UpgradeTask],
    ) -> Result<Option<FileChange>, ProviderError> {
        let content = match self
            .provider
            .get_file_content(repo, changelog::CHANGELOG_FILE)
            .await
        {
            Ok(content) => content,
            Err(ProviderError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let entries: Vec<String> = tasks.iter().map(pr::changelog_entry).collect();
        let updated = changelog::insert_entries(&content, &entries);
        if updated == content {
            return Ok(None);
        }
        Ok(Some(FileChange::edit(changelog::CHANGELOG_FILE, updated)))
    }
}
