//! MKV Cleaner CLI
//!
//! Renames MKV files from scene-style names and keeps only the audio and
//! subtitle tracks in the configured languages.

use clap::Parser;
use mkv_cleaner::cli::{
    args::{Cli, Commands},
    commands::{parse, plan, process},
};
use mkv_cleaner::models::config::{self, Config};
use mkv_cleaner::preflight;
use mkv_cleaner::services::mkvmerge::Mkvmerge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let loaded = config::load_config(cli.config.as_deref());

    // Run the appropriate command
    match cli.command {
        Commands::Parse { filenames } => {
            parse::parse_filenames(&filenames);
        }

        Commands::Plan {
            path,
            json,
            output,
            overrides,
        } => {
            let config = overrides.apply(loaded);
            if !cli.skip_preflight && !json {
                run_preflight_checks(&config)?;
            }
            plan::plan(&config, &path, json, output.as_deref()).await?;
        }

        Commands::Process { path, overrides } => {
            let config = overrides.apply(loaded);
            if !cli.skip_preflight {
                run_preflight_checks(&config)?;
            }
            process::process(&config, &path).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("mkv_cleaner=debug")
    } else {
        EnvFilter::new("mkv_cleaner=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
fn run_preflight_checks(config: &Config) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let mkvmerge = Mkvmerge::new(&config.paths.mkvmerge_path);
    let results =
        preflight::run_preflight_checks(&mkvmerge, config.subtitles.convert_to.is_some());
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
