//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-repository upgrade lines with old and new versions
//! - Skipped dependency display with reasons (verbose mode)
//! - Terminal status per repository (PR opened, dry run, failure)
//! - Closing totals for the whole run

use crate::domain::{PlannedUpgrade, RepoOutcome, RepoStatus, RunSummary};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            if self.color {
                format!("{} ", "(dry-run)".cyan())
            } else {
                "(dry-run) ".to_string()
            }
        } else {
            String::new()
        }
    }

    /// Render a repository's terminal status
    fn status_line(&self, status: &RepoStatus) -> String {
        match status {
            RepoStatus::Upgraded { pr_url } => {
                if self.color {
                    format!("PR opened: {}", pr_url.bright_white().bold())
                } else {
                    format!("PR opened: {}", pr_url)
                }
            }
            RepoStatus::DryRun => "would open a PR".to_string(),
            RepoStatus::NoUpgrades => "up to date".to_string(),
            RepoStatus::PrAlreadyOpen { branch } => {
                format!("PR already open for branch {}", branch)
            }
            RepoStatus::Failed { message } => {
                if self.color {
                    format!("{}: {}", "failed".red().bold(), message)
                } else {
                    format!("failed: {}", message)
                }
            }
        }
    }

    /// Format a single upgrade line
    fn format_upgrade_line(
        &self,
        upgrade: &PlannedUpgrade,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.color {
            let name_display = format!("{:width$}", upgrade.name, width = max_name_len);
            writeln!(
                writer,
                "  {} {} {} {} ({})",
                name_display,
                upgrade.current_version.dimmed(),
                "->".dimmed(),
                upgrade.new_version.bright_white().bold(),
                upgrade.kind
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} ({})",
                upgrade.name,
                upgrade.current_version,
                upgrade.new_version,
                upgrade.kind,
                width = max_name_len
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        for outcome in &summary.outcomes {
            self.format_repo(outcome, writer)?;
        }

        for error in &summary.errors {
            if self.color {
                writeln!(writer, "{} {}", "error:".red().bold(), error)?;
            } else {
                writeln!(writer, "error: {}", error)?;
            }
        }

        let prefix = self.dry_run_prefix();
        let repos = summary.repos_processed();
        let upgrades = summary.total_upgrades();
        let prs = summary.prs_opened();
        let skips = summary.total_skips();
        if self.color {
            writeln!(
                writer,
                "{}{} repositories scanned: {} upgrades, {} PRs opened, {} skipped",
                prefix,
                repos.to_string().bold(),
                upgrades.to_string().green(),
                prs.to_string().green(),
                skips.to_string().dimmed()
            )
        } else {
            writeln!(
                writer,
                "{}{} repositories scanned: {} upgrades, {} PRs opened, {} skipped",
                prefix, repos, upgrades, prs, skips
            )
        }
    }

    fn format_repo(
        &self,
        outcome: &RepoOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        let show_skips = self.verbosity == Verbosity::Verbose && !outcome.skips.is_empty();
        // Repositories with nothing to report stay silent unless verbose.
        if outcome.upgrades.is_empty()
            && !outcome.status.is_failed()
            && self.verbosity != Verbosity::Verbose
        {
            return Ok(());
        }

        let prefix = self.dry_run_prefix();
        let name = outcome.full_name();
        if self.color {
            writeln!(writer, "{}{}", prefix, name.bold())?;
        } else {
            writeln!(writer, "{}{}", prefix, name)?;
        }

        let max_name_len = outcome
            .upgrades
            .iter()
            .map(|u| u.name.len())
            .max()
            .unwrap_or(0);
        for upgrade in &outcome.upgrades {
            self.format_upgrade_line(upgrade, max_name_len, writer)?;
        }

        if show_skips {
            for skip in &outcome.skips {
                if self.color {
                    writeln!(writer, "  {}", format!("{}", skip).dimmed())?;
                } else {
                    writeln!(writer, "  {}", skip)?;
                }
            }
        }

        writeln!(writer, "  => {}", self.status_line(&outcome.status))
    }
}
