//! Runtime update script generation
//!
//! Some repositories carry application dependencies the engine does not
//! parse. For those, a small shell script invoking the ecosystem's native
//! package manager is added to the upgrade branch, so the repository owner
//! can refresh them with one command.

use crate::domain::FileChange;
use crate::error::ProviderError;
use crate::provider::{Provider, Repository};
use std::fmt;

/// Application ecosystems recognized by manifest probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Node,
    Python,
    Go,
}

impl Ecosystem {
    /// All recognized ecosystems, in probe order
    pub fn all() -> [Ecosystem; 3] {
        [Ecosystem::Node, Ecosystem::Python, Ecosystem::Go]
    }

    /// Manifest file whose presence marks the ecosystem
    pub fn manifest(self) -> &'static str {
        match self {
            Ecosystem::Node => "package.json",
            Ecosystem::Python => "pyproject.toml",
            Ecosystem::Go => "go.mod",
        }
    }

    /// Update command for the ecosystem's package manager
    pub fn update_command(self) -> &'static str {
        match self {
            Ecosystem::Node => "npm update",
            Ecosystem::Python => "pip install --upgrade -e .",
            Ecosystem::Go => "go get -u ./...\ngo mod tidy",
        }
    }

    /// Repository path the update script is written to
    pub fn script_path(self) -> String {
        format!("scripts/refup-update-{}.sh", self)
    }

    /// Complete script content
    pub fn update_script(self) -> String {
        format!("#!/bin/sh\nset -e\n\n{}\n", self.update_command())
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ecosystem::Node => write!(f, "node"),
            Ecosystem::Python => write!(f, "python"),
            Ecosystem::Go => write!(f, "go"),
        }
    }
}

/// Probes a repository's manifests and returns one script add per ecosystem
pub async fn detect_runtime_updates(
    provider: &dyn Provider,
    repo: &Repository,
) -> Result<Vec<FileChange>, ProviderError> {
    let mut changes = Vec::new();
    for eco in Ecosystem::all() {
        if provider.has_file(repo, eco.manifest()).await? {
            changes.push(FileChange::add(eco.script_path(), eco.update_script()));
        }
    }
    Ok(changes)
}
