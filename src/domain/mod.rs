//! Core domain models for refup
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency references found in infrastructure and build files
//! - Upgrade tasks pairing a dependency with its target version
//! - File change descriptions handed to the hosting provider
//! - Skip and outcome structures for run reporting

mod change;
mod dependency;
mod outcome;

pub use change::{ChangeType, FileChange};
pub use dependency::{Dependency, DependencyKind, UpgradeTask};
pub use outcome::{
    PlannedUpgrade, RepoOutcome, RepoStatus, RunSummary, SkipReason, SkippedDependency,
};
