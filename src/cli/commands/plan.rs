//! Plan command implementation.
//!
//! Scans the input, probes every file and prints what `process` would do.
//! Nothing is written unless `--output` is given.

use crate::core::executor::{Executor, ExecutorConfig};
use crate::core::planner;
use crate::core::scanner;
use crate::core::status::StatusTracker;
use crate::models::config::Config;
use crate::models::plan::RemuxPlan;
use crate::services::mkvmerge::Mkvmerge;
use crate::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

/// Execute the plan command.
pub async fn plan(config: &Config, path: &Path, json: bool, output: Option<&Path>) -> Result<()> {
    let scan = scanner::scan_path(path, config.paths.output_folder.as_deref())?;
    if scan.files.is_empty() {
        println!("{}", "No MKV files found.".yellow());
        return Ok(());
    }

    if !json {
        println!("{}", "📋 Planning remux...".bold().cyan());
        println!("  {} {}", "Source:".bold(), path.display());
        println!("  {} {}", "Files:".bold(), scan.files.len());
        println!();
    }

    let mkvmerge = Mkvmerge::new(&config.paths.mkvmerge_path);
    let executor = Executor::new(
        ExecutorConfig::from(config),
        mkvmerge.clone(),
        mkvmerge,
        Arc::new(StatusTracker::new()),
    );

    let files = scan.files.clone();
    let outcomes = tokio::task::spawn_blocking(move || executor.plan_all(&files))
        .await
        .map_err(|e| crate::Error::other(e.to_string()))?;

    let mut plans: Vec<RemuxPlan> = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match (outcome.plan, outcome.error) {
            (Some(plan), _) => plans.push(plan),
            (None, error) => failures.push((outcome.input_path, error.unwrap_or_default())),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        for plan in &plans {
            print_plan(plan);
        }
    }

    if let Some(output) = output {
        planner::save_plans(&plans, output)?;
        println!(
            "{} {}",
            "✅ Plans saved to:".bold().green(),
            output.display()
        );
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("{}", "⚠️  Failed files:".bold().yellow());
        for (path, error) in &failures {
            eprintln!("  {} - {}", path.display().to_string().red(), error);
        }
    }

    Ok(())
}

fn print_plan(plan: &RemuxPlan) {
    let source = plan
        .input_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    println!("{}", source.bold());
    println!("  {} {}", "->".cyan(), plan.output_path.display());
    for line in plan.describe().iter().skip(1) {
        if line.starts_with("Removed") {
            println!("    {}", line.red());
        } else {
            println!("    {}", line);
        }
    }
    println!();
}
