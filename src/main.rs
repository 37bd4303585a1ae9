//! refup - Pinned dependency upgrader CLI tool
//!
//! Scans every repository of the configured organizations for pinned
//! module and image references and opens upgrade pull requests where a
//! newer tag exists:
//! - Infrastructure files (`.tf` module blocks)
//! - Build files (`.bzl` image assignments)

use clap::Parser;
use refup::cli::CliArgs;
use refup::config::Settings;
use refup::orchestrator::Orchestrator;
use refup::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = Settings::resolve(&args)?;

    // Print run info in verbose mode
    if args.verbose {
        eprintln!("refup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Provider: {}", settings.provider);
        eprintln!("Organizations: {}", settings.orgs.join(", "));
        if settings.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::new(settings)?;

    // Progress bars would interleave with streamed JSON
    let show_progress = !args.quiet && !args.json;
    let summary = orchestrator.run(show_progress).await;

    // Create output formatter based on CLI options
    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.dry_run);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;

    // Partial failures surface through the exit code
    if summary.has_failures() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
