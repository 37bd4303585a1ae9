//! Progress display for repository scans
//!
//! Wraps indicatif so the orchestrator can show which organization is being
//! discovered and which repository is being scanned, without interleaving
//! with formatter output.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a scan run
pub struct ScanProgress {
    /// Whether progress display is enabled (disabled in quiet and JSON modes)
    enabled: bool,
    /// Current progress bar
    bar: Option<ProgressBar>,
}

impl ScanProgress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner while repositories of an organization are discovered
    pub fn discovering(&mut self, org: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.set_message(format!("Discovering repositories in {}...", org));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Start a per-repository bar for one organization
    pub fn start_org(&mut self, org: &str, repos: u64) {
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new(repos);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} {msg} [{bar:28.cyan/blue}] {pos}/{len} repos")
                .expect("Invalid template")
                .progress_chars("█▓▒░"),
        );
        bar.set_message(format!("Scanning {}", org));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Show which repository is currently being scanned
    pub fn scanning(&self, repo: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("Scanning {}", repo));
        }
    }

    /// Mark one repository as done
    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Clear the current bar so formatter output starts on a clean line
    pub fn finish_and_clear(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        self.bar = None;
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new(true)
    }
}
