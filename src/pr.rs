//! Branch, commit, and pull request text synthesis
//!
//! All strings derive deterministically from the upgrade tasks so a repeated
//! run against an unchanged repository reproduces the same branch name and
//! the open-PR check can short-circuit it.

use crate::domain::{DependencyKind, UpgradeTask};
use crate::resolve;

/// Task count up to which the description renders a full table
pub const DESCRIPTION_TABLE_LIMIT: usize = 10;

/// Short dependency name used in branch names and titles
fn short_name(task: &UpgradeTask) -> &str {
    resolve::repo_name(&task.dependency.source)
}

/// Branch name for a set of upgrade tasks
pub fn branch_name(tasks: &[UpgradeTask]) -> String {
    match tasks {
        [task] => format!("chore/upgrade-{}-{}", short_name(task), task.new_version),
        _ => format!("chore/upgrade-{}-dependencies", tasks.len()),
    }
}

/// Commit message for a set of upgrade tasks
pub fn commit_message(tasks: &[UpgradeTask]) -> String {
    match tasks {
        [task] => format!("chore: upgrade {} to {}", short_name(task), task.new_version),
        _ => format!("chore: upgrade {} dependencies", tasks.len()),
    }
}

/// Pull request title for a set of upgrade tasks
pub fn pr_title(tasks: &[UpgradeTask]) -> String {
    match tasks {
        [task] => format!("Upgrade {} to {}", short_name(task), task.new_version),
        _ => format!("Upgrade {} dependencies", tasks.len()),
    }
}

/// Pull request description
///
/// Up to [`DESCRIPTION_TABLE_LIMIT`] tasks get a Markdown table with one row
/// per upgrade; beyond that the description collapses to per-kind counts.
pub fn pr_description(tasks: &[UpgradeTask]) -> String {
    if tasks.len() <= DESCRIPTION_TABLE_LIMIT {
        description_table(tasks)
    } else {
        description_summary(tasks)
    }
}

fn description_table(tasks: &[UpgradeTask]) -> String {
    let mut out = String::from("This PR upgrades the following dependencies:\n\n");
    out.push_str("| Name | Kind | Current | New | File |\n");
    out.push_str("| --- | --- | --- | --- | --- |\n");
    for task in tasks {
        let dep = &task.dependency;
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            dep.name, dep.kind, dep.current_version, task.new_version, dep.file_path
        ));
    }
    out
}

fn description_summary(tasks: &[UpgradeTask]) -> String {
    let modules = tasks
        .iter()
        .filter(|t| t.dependency.kind == DependencyKind::Module)
        .count();
    let images = tasks.len() - modules;
    format!(
        "This PR upgrades {} dependencies:\n\n- {} module reference(s)\n- {} image reference(s)\n",
        tasks.len(),
        modules,
        images
    )
}

/// Changelog bullet describing one upgraded dependency
pub fn changelog_entry(task: &UpgradeTask) -> String {
    let dep = &task.dependency;
    match dep.kind {
        DependencyKind::Module => format!(
            "- Upgrade module `{}` from `{}` to `{}`",
            dep.name, dep.current_version, task.new_version
        ),
        DependencyKind::Image => format!(
            "- Bump image `{}` from `{}` to `{}`",
            dep.name, dep.current_version, task.new_version
        ),
    }
}
