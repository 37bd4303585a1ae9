//! CLI argument parsing module for refup

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Dependency upgrade bot for infrastructure-as-code repositories
#[derive(Parser, Debug, Clone)]
#[command(
    name = "refup",
    version,
    about = "Scans org repositories for pinned module and image references and opens upgrade PRs"
)]
pub struct CliArgs {
    /// Path to the config file (default: refup.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // Connection options
    /// Hosting provider: github, gitlab, or azure
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider host for self-managed installations
    #[arg(long)]
    pub host: Option<String>,

    /// Organization to scan (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub org: Vec<String>,

    /// Base branch for upgrade PRs (default: each repository's default branch)
    #[arg(long)]
    pub base_branch: Option<String>,

    // Behavior options
    /// Dry run mode - report upgrades without creating branches or PRs
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Record upgrades in each repository's CHANGELOG.md
    #[arg(long)]
    pub changelog: bool,

    /// Add package manager update scripts for detected runtimes
    #[arg(long)]
    pub runtime_scripts: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["refup"]);
        assert!(args.config.is_none());
        assert!(args.provider.is_none());
        assert!(args.host.is_none());
        assert!(args.org.is_empty());
        assert!(args.base_branch.is_none());
        assert!(!args.dry_run);
        assert!(!args.changelog);
        assert!(!args.runtime_scripts);
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_provider_and_host() {
        let args = CliArgs::parse_from(["refup", "--provider", "gitlab", "--host", "git.acme.io"]);
        assert_eq!(args.provider.as_deref(), Some("gitlab"));
        assert_eq!(args.host.as_deref(), Some("git.acme.io"));
    }

    #[test]
    fn test_org_multiple() {
        let args = CliArgs::parse_from(["refup", "--org", "acme", "--org", "acme-labs"]);
        assert_eq!(args.org, vec!["acme", "acme-labs"]);
    }

    #[test]
    fn test_config_path() {
        let args = CliArgs::parse_from(["refup", "--config", "/etc/refup.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/refup.toml")));
    }

    #[test]
    fn test_dry_run_flags() {
        let args = CliArgs::parse_from(["refup", "-n"]);
        assert!(args.dry_run);

        let args = CliArgs::parse_from(["refup", "--dry-run"]);
        assert!(args.dry_run);
    }

    #[test]
    fn test_changelog_flag() {
        let args = CliArgs::parse_from(["refup", "--changelog"]);
        assert!(args.changelog);
    }

    #[test]
    fn test_runtime_scripts_flag() {
        let args = CliArgs::parse_from(["refup", "--runtime-scripts"]);
        assert!(args.runtime_scripts);
    }

    #[test]
    fn test_base_branch() {
        let args = CliArgs::parse_from(["refup", "--base-branch", "develop"]);
        assert_eq!(args.base_branch.as_deref(), Some("develop"));
    }

    #[test]
    fn test_output_flags() {
        let args = CliArgs::parse_from(["refup", "--json"]);
        assert!(args.json);

        let args = CliArgs::parse_from(["refup", "--verbose"]);
        assert!(args.verbose);

        let args = CliArgs::parse_from(["refup", "-q"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "refup",
            "--provider",
            "github",
            "--org",
            "acme",
            "--base-branch",
            "main",
            "-n",
            "--changelog",
            "--verbose",
        ]);
        assert_eq!(args.provider.as_deref(), Some("github"));
        assert_eq!(args.org, vec!["acme"]);
        assert_eq!(args.base_branch.as_deref(), Some("main"));
        assert!(args.dry_run);
        assert!(args.changelog);
        assert!(args.verbose);
        assert!(!args.quiet);
    }
}
