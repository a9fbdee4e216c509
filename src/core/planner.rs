//! Remux plan generation module.
//!
//! Combines a parsed filename with track decisions into a [`RemuxPlan`]:
//! 1. Generate the output name
//! 2. Resolve collisions with existing files and earlier plans
//! 3. Schedule subtitle conversions
//!
//! Plans can be saved to and loaded from JSON for dry runs.

use crate::generators::filename as gen_filename;
use crate::models::config::{Config, PROCESSED_DIR_NAME};
use crate::models::media::{ParsedName, TrackKind};
use crate::models::plan::{RemuxPlan, SubtitleConversion, SubtitleFormat, TrackDecision};
use crate::utils::fs::with_numeric_suffix;
use crate::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Planner configuration.
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    /// Target format for text subtitles.
    pub convert_subtitles_to: Option<SubtitleFormat>,
}

impl From<&Config> for PlannerConfig {
    fn from(config: &Config) -> Self {
        Self {
            convert_subtitles_to: config.subtitles.convert_to,
        }
    }
}

/// Plan builder.
///
/// Remembers every output path it hands out, so two files that map to the
/// same name in one batch still get distinct outputs.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    config: PlannerConfig,
    reserved: HashSet<PathBuf>,
}

impl PlanBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder with custom configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            reserved: HashSet::new(),
        }
    }

    /// Build the plan for one input file.
    pub fn build(
        &mut self,
        parsed: &ParsedName,
        decisions: &[TrackDecision],
        input_path: &Path,
        output_dir: &Path,
    ) -> RemuxPlan {
        let title = gen_filename::generate_output_stem(parsed);
        let candidate = output_dir.join(gen_filename::generate_output_filename(parsed));
        let output_path = self.reserve(candidate, input_path);

        let subtitle_conversions = self.subtitle_conversions(decisions);

        tracing::debug!(
            "Plan for {}: {} ({} tracks, {} conversions)",
            input_path.display(),
            output_path.display(),
            decisions.len(),
            subtitle_conversions.len()
        );

        RemuxPlan {
            input_path: input_path.to_path_buf(),
            output_path,
            title,
            track_decisions: decisions.to_vec(),
            subtitle_conversions,
        }
    }

    /// First free path among `X.mkv`, `X (1).mkv`, `X (2).mkv`, ...
    ///
    /// The input file itself never counts as free.
    fn reserve(&mut self, candidate: PathBuf, input_path: &Path) -> PathBuf {
        let taken = |path: &Path, reserved: &HashSet<PathBuf>| {
            path.exists() || reserved.contains(path) || path == input_path
        };

        let mut path = candidate.clone();
        let mut n = 0;
        while taken(&path, &self.reserved) {
            n += 1;
            path = with_numeric_suffix(&candidate, n);
        }

        if n > 0 {
            tracing::debug!("{} is taken, using {}", candidate.display(), path.display());
        }
        self.reserved.insert(path.clone());
        path
    }

    /// Kept text subtitles whose format differs from the configured target.
    fn subtitle_conversions(&self, decisions: &[TrackDecision]) -> Vec<SubtitleConversion> {
        let Some(target) = self.config.convert_subtitles_to else {
            return Vec::new();
        };

        decisions
            .iter()
            .filter(|d| d.kind == TrackKind::Subtitle && d.is_kept())
            .filter_map(|d| match SubtitleFormat::from_codec(&d.codec) {
                Some(source) if source != target => Some(SubtitleConversion {
                    track_index: d.track_index,
                    target_format: target,
                }),
                Some(_) => None,
                None => {
                    tracing::debug!(
                        "Subtitle {} ({}) is not a text format, not converting",
                        d.track_index,
                        d.codec
                    );
                    None
                }
            })
            .collect()
    }
}

/// Build a plan with a fresh builder (collisions are checked against the disk only).
pub fn build(
    parsed: &ParsedName,
    decisions: &[TrackDecision],
    input_path: &Path,
    output_dir: &Path,
) -> RemuxPlan {
    PlanBuilder::new().build(parsed, decisions, input_path, output_dir)
}

/// Output directory for an input file: the configured folder, or
/// `processed/` next to the input.
pub fn output_dir_for(input_path: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(dir) => dir.to_path_buf(),
        None => input_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(PROCESSED_DIR_NAME),
    }
}

/// Save plans to a JSON file.
pub fn save_plans(plans: &[RemuxPlan], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plans)?;

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(json.as_bytes())?;

    tracing::info!("Plans saved to {:?}", path);
    Ok(())
}

/// Load plans from a JSON file.
pub fn load_plans(path: &Path) -> Result<Vec<RemuxPlan>> {
    let content = fs::read_to_string(path)?;
    let plans: Vec<RemuxPlan> = serde_json::from_str(&content)?;
    Ok(plans)
}

/// Get the default plan output path inside `dir`.
pub fn default_plan_path(dir: &Path) -> PathBuf {
    let filename = format!("plan_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));
    dir.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::TrackAction;

    fn subtitle(index: u32, codec: &str, action: TrackAction) -> TrackDecision {
        TrackDecision {
            track_index: index,
            kind: TrackKind::Subtitle,
            language: "eng".to_string(),
            codec: codec.to_string(),
            action,
            set_default: false,
            set_forced: false,
            set_original: false,
            set_hearing_impaired: false,
            new_title: None,
        }
    }

    #[test]
    fn test_output_dir_for() {
        let input = Path::new("/media/show/ep1.mkv");
        assert_eq!(output_dir_for(input, None), PathBuf::from("/media/show/processed"));
        assert_eq!(
            output_dir_for(input, Some(Path::new("/out"))),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_subtitle_conversions() {
        let builder = PlanBuilder::with_config(PlannerConfig {
            convert_subtitles_to: Some(SubtitleFormat::Srt),
        });
        let decisions = vec![
            subtitle(2, "SubRip/SRT", TrackAction::Keep),
            subtitle(3, "SubStationAlpha", TrackAction::Keep),
            subtitle(4, "HDMV PGS", TrackAction::Keep),
            subtitle(5, "SubStationAlpha", TrackAction::Drop),
        ];

        let conversions = builder.subtitle_conversions(&decisions);
        assert_eq!(
            conversions,
            vec![SubtitleConversion {
                track_index: 3,
                target_format: SubtitleFormat::Srt
            }]
        );
    }

    #[test]
    fn test_no_conversions_without_target() {
        let builder = PlanBuilder::new();
        let decisions = vec![subtitle(3, "SubStationAlpha", TrackAction::Keep)];
        assert!(builder.subtitle_conversions(&decisions).is_empty());
    }

    #[test]
    fn test_default_plan_path() {
        let path = default_plan_path(Path::new("/tmp/shows"));
        assert!(path.starts_with("/tmp/shows"));
        assert!(path.to_string_lossy().ends_with(".json"));
    }
}
