//! Process command implementation.
//!
//! Runs the batch on a blocking worker while the foreground polls the shared
//! status for the progress bar. Ctrl-C requests a stop at the next file.

use crate::core::executor::{BatchReport, Executor, ExecutorConfig};
use crate::core::scanner;
use crate::core::status::StatusTracker;
use crate::models::config::Config;
use crate::services::mkvmerge::Mkvmerge;
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Execute the process command.
pub async fn process(config: &Config, path: &Path) -> Result<()> {
    let scan = scanner::scan_path(path, config.paths.output_folder.as_deref())?;
    if scan.files.is_empty() {
        println!("{}", "No MKV files found.".yellow());
        return Ok(());
    }

    println!("{}", "[EXEC] Processing MKV files...".bold().cyan());
    println!("  {} {}", "Source:".bold(), path.display());
    println!("  {} {}", "Files:".bold(), scan.files.len());
    println!();

    let status = Arc::new(StatusTracker::new());
    let mkvmerge = Mkvmerge::new(&config.paths.mkvmerge_path);
    let executor = Executor::new(
        ExecutorConfig::from(config),
        mkvmerge.clone(),
        mkvmerge,
        Arc::clone(&status),
    );

    let files = scan.files.clone();
    let mut worker = tokio::task::spawn_blocking(move || executor.run(&files));

    let pb = ProgressBar::new(scan.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut printed = 0;
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    let report: BatchReport = loop {
        tokio::select! {
            joined = &mut worker => {
                break joined.map_err(|e| crate::Error::other(e.to_string()))??;
            }
            _ = tokio::signal::ctrl_c() => {
                if status.request_stop() {
                    pb.println(format!("{}", "Stop requested, finishing current file...".yellow()));
                }
            }
            _ = interval.tick() => {
                printed = refresh(&pb, &status, printed);
            }
        }
    };
    refresh(&pb, &status, printed);
    pb.finish_and_clear();

    print_summary(&report);
    Ok(())
}

/// Sync the bar with the latest snapshot and print new log lines.
fn refresh(pb: &ProgressBar, status: &StatusTracker, printed: usize) -> usize {
    let snapshot = status.snapshot();
    pb.set_position(snapshot.processed_count as u64);
    if let Some(ref current) = snapshot.current_file {
        pb.set_message(current.clone());
    }

    for line in snapshot.log_entries.iter().skip(printed) {
        if line.starts_with('✗') {
            pb.println(format!("  {}", line.red()));
        } else if line.starts_with('✓') {
            pb.println(format!("  {}", line.green()));
        } else {
            pb.println(format!("  {}", line));
        }
    }
    snapshot.log_entries.len()
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("{}", "[Summary]".bold().green());
    println!("  {} {}", "Succeeded:".bold(), report.success_count());
    println!("  {} {}", "Failed:".bold(), report.error_count());
    if report.stopped {
        println!("  {}", "Stopped before all files were processed".yellow());
    }

    for outcome in report.outcomes.iter().filter(|o| o.is_success()) {
        if let Some(ref plan) = outcome.plan {
            println!("  {} {}", "->".cyan(), plan.output_path.display());
        }
    }
}
