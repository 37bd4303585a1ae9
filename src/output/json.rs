//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run summary
//! - Structured repository-by-repository upgrade/skip information

use crate::domain::{PlannedUpgrade, RepoOutcome, RepoStatus, RunSummary, SkipReason};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Convert a repository outcome to its JSON representation
    fn repo_to_json(&self, outcome: &RepoOutcome) -> JsonRepo {
        let skips: Vec<JsonSkip> = if self.verbosity == Verbosity::Verbose {
            outcome
                .skips
                .iter()
                .map(|skip| JsonSkip {
                    name: skip.dependency.name.clone(),
                    version: skip.dependency.current_version.clone(),
                    file: skip.dependency.file_path.clone(),
                    reason: skip.reason,
                })
                .collect()
        } else {
            Vec::new()
        };

        JsonRepo {
            org: outcome.org.clone(),
            repo: outcome.repo.clone(),
            status: outcome.status.clone(),
            upgrades: outcome.upgrades.clone(),
            skips,
        }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    /// Whether this was a dry-run
    dry_run: bool,
    /// Summary statistics
    summary: JsonTotals,
    /// Per-repository results
    repositories: Vec<JsonRepo>,
    /// Organization-level errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of run totals
#[derive(Serialize)]
struct JsonTotals {
    /// Number of repositories processed
    repositories: usize,
    /// Total number of planned upgrades
    upgrades: usize,
    /// Total number of skipped dependencies
    skips: usize,
    /// Number of pull requests opened
    prs_opened: usize,
}

/// JSON representation of one repository outcome
#[derive(Serialize)]
struct JsonRepo {
    /// Organization or group name
    org: String,
    /// Repository name
    repo: String,
    /// Terminal status
    status: RepoStatus,
    /// Planned upgrades
    upgrades: Vec<PlannedUpgrade>,
    /// Skipped dependencies (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
}

/// JSON representation of a skipped dependency
#[derive(Serialize)]
struct JsonSkip {
    /// Dependency label
    name: String,
    /// Current version
    version: String,
    /// File the reference lives in
    file: String,
    /// Skip reason
    reason: SkipReason,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: summary.dry_run,
            summary: JsonTotals {
                repositories: summary.repos_processed(),
                upgrades: summary.total_upgrades(),
                skips: summary.total_skips(),
                prs_opened: summary.prs_opened(),
            },
            repositories: summary
                .outcomes
                .iter()
                .map(|o| self.repo_to_json(o))
                .collect(),
            errors: summary.errors.clone(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_repo(
        &self,
        outcome: &RepoOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = self.repo_to_json(outcome);
        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
