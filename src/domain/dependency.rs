//! Dependency reference structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of reference a dependency was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// A versioned module source in an infrastructure file
    Module,
    /// A tagged container image assignment in a build file
    Image,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Module => write!(f, "module"),
            DependencyKind::Image => write!(f, "image"),
        }
    }
}

/// A pinned dependency reference found during scanning
///
/// `source` is the version-free locator (module source URL without the
/// `?ref=` query, or the image name without the tag). `current_version`
/// is never empty; references without a resolvable version are dropped
/// at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Label under which the reference appears (block label or assignment key)
    pub name: String,
    /// Version-free locator of the dependency
    pub source: String,
    /// Currently pinned version or tag
    pub current_version: String,
    /// Path of the file the reference was found in
    pub file_path: String,
    /// 1-based line number of the reference
    pub line: usize,
    /// Whether this is a module or an image reference
    pub kind: DependencyKind,
}

impl Dependency {
    /// Creates a new dependency reference
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        current_version: impl Into<String>,
        file_path: impl Into<String>,
        line: usize,
        kind: DependencyKind,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            current_version: current_version.into(),
            file_path: file_path.into(),
            line,
            kind,
        }
    }

    /// Creates a new module reference
    pub fn module(
        name: impl Into<String>,
        source: impl Into<String>,
        current_version: impl Into<String>,
        file_path: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::new(name, source, current_version, file_path, line, DependencyKind::Module)
    }

    /// Creates a new image reference
    pub fn image(
        name: impl Into<String>,
        source: impl Into<String>,
        current_version: impl Into<String>,
        file_path: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::new(name, source, current_version, file_path, line, DependencyKind::Image)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({}) [{}:{}]",
            self.name, self.current_version, self.kind, self.file_path, self.line
        )
    }
}

/// A planned upgrade of a single dependency
///
/// Tasks are only constructed after the planner has established that
/// `new_version` is strictly newer than the dependency's current version.
/// `file_content` carries the original text of the containing file so the
/// patch engine can rewrite it without re-fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTask {
    /// The dependency being upgraded
    pub dependency: Dependency,
    /// Version the dependency will be moved to
    pub new_version: String,
    /// Original content of the file containing the reference
    pub file_content: String,
}

impl UpgradeTask {
    /// Creates a new upgrade task
    pub fn new(
        dependency: Dependency,
        new_version: impl Into<String>,
        file_content: impl Into<String>,
    ) -> Self {
        Self {
            dependency,
            new_version: new_version.into(),
            file_content: file_content.into(),
        }
    }
}

impl fmt::Display for UpgradeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.dependency.name, self.dependency.current_version, self.new_version
        )
    }
}
