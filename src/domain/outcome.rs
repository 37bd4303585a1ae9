//! Skip and outcome structures for run reporting

use super::{Dependency, DependencyKind, UpgradeTask};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a scanned dependency was not turned into an upgrade task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No versions could be resolved for the dependency's source
    NoVersionsResolved,
    /// The newest resolved version equals the current version
    AlreadyLatest,
    /// The newest resolved version does not order above the current version
    NotNewer,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoVersionsResolved => write!(f, "no versions resolved"),
            SkipReason::AlreadyLatest => write!(f, "already latest"),
            SkipReason::NotNewer => write!(f, "not newer than current"),
        }
    }
}

/// A dependency the planner looked at and decided to leave alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDependency {
    /// The dependency that was skipped
    pub dependency: Dependency,
    /// Why it was skipped
    pub reason: SkipReason,
}

impl SkippedDependency {
    /// Creates a new skipped dependency record
    pub fn new(dependency: Dependency, reason: SkipReason) -> Self {
        Self { dependency, reason }
    }
}

impl fmt::Display for SkippedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dependency, self.reason)
    }
}

/// A compact record of one applied (or planned) upgrade
///
/// Unlike [`UpgradeTask`] this carries no file content, so it is cheap to
/// keep around for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedUpgrade {
    /// Label of the upgraded dependency
    pub name: String,
    /// Module or image
    pub kind: DependencyKind,
    /// Version before the upgrade
    pub current_version: String,
    /// Version after the upgrade
    pub new_version: String,
    /// File the reference lives in
    pub file_path: String,
}

impl PlannedUpgrade {
    /// Creates a report record from an upgrade task
    pub fn from_task(task: &UpgradeTask) -> Self {
        Self {
            name: task.dependency.name.clone(),
            kind: task.dependency.kind,
            current_version: task.dependency.current_version.clone(),
            new_version: task.new_version.clone(),
            file_path: task.dependency.file_path.clone(),
        }
    }
}

impl fmt::Display for PlannedUpgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({})",
            self.name, self.current_version, self.new_version, self.kind
        )
    }
}

/// Terminal state of one repository after a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepoStatus {
    /// A pull request was opened
    Upgraded { pr_url: String },
    /// Upgrades were planned but not pushed
    DryRun,
    /// Nothing to upgrade
    NoUpgrades,
    /// An upgrade pull request for the same branch is already open
    PrAlreadyOpen { branch: String },
    /// A provider call failed while processing the repository
    Failed { message: String },
}

impl RepoStatus {
    /// Returns true if processing this repository failed
    pub fn is_failed(&self) -> bool {
        matches!(self, RepoStatus::Failed { .. })
    }

    /// Returns true if a pull request was opened
    pub fn is_upgraded(&self) -> bool {
        matches!(self, RepoStatus::Upgraded { .. })
    }
}

/// Everything that happened to one repository during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOutcome {
    /// Organization or group the repository belongs to
    pub org: String,
    /// Repository name
    pub repo: String,
    /// Upgrades that were planned for this repository
    pub upgrades: Vec<PlannedUpgrade>,
    /// Dependencies that were looked at but skipped
    pub skips: Vec<SkippedDependency>,
    /// Terminal state
    pub status: RepoStatus,
}

impl RepoOutcome {
    /// Creates an outcome for a repository that got a pull request
    pub fn upgraded(
        org: impl Into<String>,
        repo: impl Into<String>,
        upgrades: Vec<PlannedUpgrade>,
        skips: Vec<SkippedDependency>,
        pr_url: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            upgrades,
            skips,
            status: RepoStatus::Upgraded {
                pr_url: pr_url.into(),
            },
        }
    }

    /// Creates an outcome for a dry run with planned upgrades
    pub fn dry_run(
        org: impl Into<String>,
        repo: impl Into<String>,
        upgrades: Vec<PlannedUpgrade>,
        skips: Vec<SkippedDependency>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            upgrades,
            skips,
            status: RepoStatus::DryRun,
        }
    }

    /// Creates an outcome for a repository with nothing to do
    pub fn no_upgrades(
        org: impl Into<String>,
        repo: impl Into<String>,
        skips: Vec<SkippedDependency>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            upgrades: Vec::new(),
            skips,
            status: RepoStatus::NoUpgrades,
        }
    }

    /// Creates an outcome for a repository whose upgrade branch already has a PR
    pub fn pr_already_open(
        org: impl Into<String>,
        repo: impl Into<String>,
        upgrades: Vec<PlannedUpgrade>,
        skips: Vec<SkippedDependency>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            upgrades,
            skips,
            status: RepoStatus::PrAlreadyOpen {
                branch: branch.into(),
            },
        }
    }

    /// Creates an outcome for a repository that failed mid-processing
    pub fn failed(
        org: impl Into<String>,
        repo: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            upgrades: Vec::new(),
            skips: Vec::new(),
            status: RepoStatus::Failed {
                message: message.into(),
            },
        }
    }

    /// Returns the `org/repo` display name
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}

/// Aggregated result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Per-repository outcomes, in processing order
    pub outcomes: Vec<RepoOutcome>,
    /// Organization-level failures (discovery errors and the like)
    pub errors: Vec<String>,
    /// Whether the run was a dry run
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates an empty summary
    pub fn new(dry_run: bool) -> Self {
        Self {
            outcomes: Vec::new(),
            errors: Vec::new(),
            dry_run,
        }
    }

    /// Records a repository outcome
    pub fn add(&mut self, outcome: RepoOutcome) {
        self.outcomes.push(outcome);
    }

    /// Records an organization-level error
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Number of repositories processed
    pub fn repos_processed(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of repositories with at least one planned upgrade
    pub fn repos_with_upgrades(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.upgrades.is_empty())
            .count()
    }

    /// Total number of planned upgrades across all repositories
    pub fn total_upgrades(&self) -> usize {
        self.outcomes.iter().map(|o| o.upgrades.len()).sum()
    }

    /// Total number of skipped dependencies across all repositories
    pub fn total_skips(&self) -> usize {
        self.outcomes.iter().map(|o| o.skips.len()).sum()
    }

    /// Number of pull requests actually opened
    pub fn prs_opened(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.is_upgraded())
            .count()
    }

    /// Returns true if any repository failed or any org-level error occurred
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty() || self.outcomes.iter().any(|o| o.status.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_upgrade() -> PlannedUpgrade {
        PlannedUpgrade {
            name: "net".to_string(),
            kind: DependencyKind::Module,
            current_version: "v1.0.0".to_string(),
            new_version: "v2.0.0".to_string(),
            file_path: "main.tf".to_string(),
        }
    }

    fn sample_skip() -> SkippedDependency {
        SkippedDependency::new(
            Dependency::module("dns", "git::https://host/org/mod-dns", "v3.0.0", "main.tf", 9),
            SkipReason::AlreadyLatest,
        )
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(format!("{}", SkipReason::NoVersionsResolved), "no versions resolved");
        assert_eq!(format!("{}", SkipReason::AlreadyLatest), "already latest");
        assert_eq!(format!("{}", SkipReason::NotNewer), "not newer than current");
    }

    #[test]
    fn test_skip_reason_serialization() {
        let json = serde_json::to_string(&SkipReason::NoVersionsResolved).unwrap();
        assert_eq!(json, "\"no_versions_resolved\"");
    }

    #[test]
    fn test_skipped_dependency_display() {
        let text = format!("{}", sample_skip());
        assert!(text.contains("dns@v3.0.0"));
        assert!(text.contains("already latest"));
    }

    #[test]
    fn test_repo_status_predicates() {
        let upgraded = RepoStatus::Upgraded {
            pr_url: "https://host/pr/1".to_string(),
        };
        assert!(upgraded.is_upgraded());
        assert!(!upgraded.is_failed());

        let failed = RepoStatus::Failed {
            message: "boom".to_string(),
        };
        assert!(failed.is_failed());
        assert!(!failed.is_upgraded());
    }

    #[test]
    fn test_repo_status_tagged_serialization() {
        let status = RepoStatus::PrAlreadyOpen {
            branch: "chore/upgrade-mod-net-v2.0.0".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"type\":\"pr_already_open\""));
        assert!(json.contains("chore/upgrade-mod-net-v2.0.0"));
    }

    #[test]
    fn test_outcome_full_name() {
        let outcome = RepoOutcome::no_upgrades("platform", "service-api", vec![]);
        assert_eq!(outcome.full_name(), "platform/service-api");
    }

    #[test]
    fn test_summary_counters() {
        let mut summary = RunSummary::new(false);
        summary.add(RepoOutcome::upgraded(
            "platform",
            "infra-live",
            vec![sample_upgrade()],
            vec![sample_skip()],
            "https://host/pr/1",
        ));
        summary.add(RepoOutcome::no_upgrades("platform", "service-api", vec![]));

        assert_eq!(summary.repos_processed(), 2);
        assert_eq!(summary.repos_with_upgrades(), 1);
        assert_eq!(summary.total_upgrades(), 1);
        assert_eq!(summary.total_skips(), 1);
        assert_eq!(summary.prs_opened(), 1);
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_summary_has_failures_on_failed_repo() {
        let mut summary = RunSummary::new(false);
        summary.add(RepoOutcome::failed("platform", "infra-live", "HTTP 500"));
        assert!(summary.has_failures());
    }

    #[test]
    fn test_summary_has_failures_on_org_error() {
        let mut summary = RunSummary::new(true);
        summary.add_error("discovery failed for platform");
        assert!(summary.has_failures());
    }
}
