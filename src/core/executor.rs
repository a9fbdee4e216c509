//! Batch executor module.
//!
//! Runs a list of MKV files through the pipeline:
//! 1. Parse the filename
//! 2. Probe the tracks
//! 3. Select tracks and build the remux plan
//! 4. Remux and append the change log
//!
//! Progress is reported through a shared [`StatusTracker`]. A failing file
//! is logged and the batch moves on.

use crate::core::parser;
use crate::core::planner::{output_dir_for, PlanBuilder, PlannerConfig};
use crate::core::selector;
use crate::core::status::StatusTracker;
use crate::models::config::{Config, LanguagePreferences};
use crate::models::media::Track;
use crate::models::plan::RemuxPlan;
use crate::models::status::BatchState;
use crate::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Name of the change log written next to the outputs.
pub const CHANGE_LOG_NAME: &str = "mkv_process_log.txt";

/// Reads the track list of a media file.
pub trait MediaProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<Vec<Track>>;
}

/// Writes the output file described by a plan.
pub trait MuxEngine: Send + Sync {
    fn remux(&self, plan: &RemuxPlan) -> Result<()>;
}

/// Executor configuration.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Track language preferences.
    pub languages: LanguagePreferences,
    /// Plan builder settings.
    pub planner: PlannerConfig,
    /// Fixed output folder; `None` means `processed/` next to each input.
    pub output_folder: Option<PathBuf>,
    /// Append to the change log after each remux.
    pub write_change_log: bool,
}

impl From<&Config> for ExecutorConfig {
    fn from(config: &Config) -> Self {
        Self {
            languages: config.languages.clone(),
            planner: PlannerConfig::from(config),
            output_folder: config.paths.output_folder.clone(),
            write_change_log: true,
        }
    }
}

/// Result for one file of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub input_path: PathBuf,
    pub plan: Option<RemuxPlan>,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub run_id: Option<Uuid>,
    pub outcomes: Vec<FileOutcome>,
    /// The batch ended on a stop request.
    pub stopped: bool,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// Batch executor.
pub struct Executor<P, M> {
    config: ExecutorConfig,
    prober: P,
    muxer: M,
    status: Arc<StatusTracker>,
}

impl<P: MediaProber, M: MuxEngine> Executor<P, M> {
    /// Create an executor reporting to `status`.
    pub fn new(config: ExecutorConfig, prober: P, muxer: M, status: Arc<StatusTracker>) -> Self {
        Self {
            config,
            prober,
            muxer,
            status,
        }
    }

    /// Shared status handle.
    pub fn status(&self) -> Arc<StatusTracker> {
        Arc::clone(&self.status)
    }

    /// Build the plan for one file without touching the output.
    pub fn plan_file(&self, builder: &mut PlanBuilder, input_path: &Path) -> Result<RemuxPlan> {
        let filename = file_name(input_path);
        let parsed = parser::parse(&filename);
        let tracks = self.prober.probe(input_path)?;
        let decisions = selector::select(&tracks, &self.config.languages);
        let output_dir = output_dir_for(input_path, self.config.output_folder.as_deref());

        Ok(builder.build(&parsed, &decisions, input_path, &output_dir))
    }

    /// Build plans for every file (dry run). Failures are reported per file.
    pub fn plan_all(&self, files: &[PathBuf]) -> Vec<FileOutcome> {
        let mut builder = PlanBuilder::with_config(self.config.planner.clone());

        files
            .iter()
            .map(|path| match self.plan_file(&mut builder, path) {
                Ok(plan) => FileOutcome {
                    input_path: path.clone(),
                    plan: Some(plan),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!("Failed to plan {}: {}", path.display(), e);
                    FileOutcome {
                        input_path: path.clone(),
                        plan: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Process a batch. Blocks until every file is done or a stop is observed.
    ///
    /// Fails only if another batch is already running on the same tracker.
    pub fn run(&self, files: &[PathBuf]) -> Result<BatchReport> {
        let run_id = self.status.start(files.len())?;
        let mut builder = PlanBuilder::with_config(self.config.planner.clone());
        let mut report = BatchReport {
            run_id: Some(run_id),
            ..Default::default()
        };

        for path in files {
            let filename = file_name(path);
            if !self.status.checkpoint(&filename) {
                report.stopped = true;
                break;
            }

            tracing::info!("Processing {}", filename);
            match self.process_file(&mut builder, path) {
                Ok(plan) => {
                    self.status
                        .advance(&filename, format!("✓ Completed: {}", filename));
                    report.outcomes.push(FileOutcome {
                        input_path: path.clone(),
                        plan: Some(plan),
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", filename, e);
                    self.status
                        .advance(&filename, format!("✗ Failed: {}: {}", filename, e));
                    report.outcomes.push(FileOutcome {
                        input_path: path.clone(),
                        plan: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // A stop requested during the last file is observed by `advance`.
        if !report.stopped {
            report.stopped = self.status.snapshot().state == BatchState::Stopped;
        }

        tracing::info!(
            "Batch {} finished: {} succeeded, {} failed{}",
            run_id,
            report.success_count(),
            report.error_count(),
            if report.stopped { " (stopped)" } else { "" }
        );

        Ok(report)
    }

    fn process_file(&self, builder: &mut PlanBuilder, input_path: &Path) -> Result<RemuxPlan> {
        let plan = self.plan_file(builder, input_path)?;

        if let Some(dir) = plan.output_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        self.muxer.remux(&plan)?;

        if self.config.write_change_log {
            if let Err(e) = append_change_log(&plan) {
                tracing::warn!("Failed to write change log: {}", e);
            }
        }

        Ok(plan)
    }
}

/// Append a timestamped entry for `plan` to the change log in its output folder.
pub fn append_change_log(plan: &RemuxPlan) -> Result<PathBuf> {
    let dir = plan
        .output_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_path = dir.join(CHANGE_LOG_NAME);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    writeln!(
        file,
        "[{}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        file_name(&plan.input_path)
    )?;
    for line in plan.describe() {
        writeln!(file, "  - {}", line)?;
    }
    writeln!(file)?;

    Ok(log_path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
