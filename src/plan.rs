//! Upgrade planning
//!
//! The planner walks scanned dependencies in file order, resolves each
//! source once, and splits the result into upgrade tasks and skips.

use crate::domain::{Dependency, SkipReason, SkippedDependency, UpgradeTask};
use crate::resolve::VersionResolver;
use crate::version;

/// A scanned file together with the dependencies found in it
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: String,
    pub content: String,
    pub dependencies: Vec<Dependency>,
}

impl ScannedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        dependencies: Vec<Dependency>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            dependencies,
        }
    }
}

/// The planner's verdict over one repository's scanned files
#[derive(Debug, Default)]
pub struct Plan {
    pub tasks: Vec<UpgradeTask>,
    pub skips: Vec<SkippedDependency>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Turns scanned dependencies into upgrade tasks
pub struct UpgradePlanner<'a> {
    resolver: VersionResolver<'a>,
}

impl<'a> UpgradePlanner<'a> {
    pub fn new(resolver: VersionResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Plans upgrades for a repository's scanned files
    ///
    /// Dependencies are visited in scan order. A dependency is skipped when
    /// its source resolves to no versions, when the newest version equals
    /// the current reference, or when the newest version does not order
    /// strictly above it.
    pub async fn plan(&mut self, files: &[ScannedFile]) -> Plan {
        let mut plan = Plan::default();
        for file in files {
            for dep in &file.dependencies {
                let tags = self.resolver.tags_for(&dep.source).await;
                let Some(latest) = tags.first() else {
                    plan.skips
                        .push(SkippedDependency::new(dep.clone(), SkipReason::NoVersionsResolved));
                    continue;
                };
                if latest == &dep.current_version {
                    plan.skips
                        .push(SkippedDependency::new(dep.clone(), SkipReason::AlreadyLatest));
                    continue;
                }
                if !version::is_newer(&dep.current_version, latest) {
                    plan.skips
                        .push(SkippedDependency::new(dep.clone(), SkipReason::NotNewer));
                    continue;
                }
                plan.tasks
                    .push(UpgradeTask::new(dep.clone(), latest, &file.content));
            }
        }
        plan
    }
}
