//! mkvmerge service: reads track metadata and performs remuxes.
//!
//! Subtitle conversions run before the remux: each source track is pulled out
//! with mkvextract, converted, and muxed back in as a separate input in place
//! of the original track.

use crate::core::executor::{MediaProber, MuxEngine};
use crate::models::media::{Track, TrackKind};
use crate::models::plan::{RemuxPlan, SubtitleConversion, TrackDecision};
use crate::services::subtitle;
use crate::utils::language::canonical_language;
use crate::Result;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// mkvmerge `-J` output.
#[derive(Debug, Deserialize)]
struct IdentifyOutput {
    #[serde(default)]
    tracks: Vec<IdentifyTrack>,
}

/// mkvmerge track information.
#[derive(Debug, Deserialize)]
struct IdentifyTrack {
    id: u32,
    #[serde(rename = "type")]
    track_type: String,
    #[serde(default)]
    codec: String,
    #[serde(default)]
    properties: IdentifyProperties,
}

/// mkvmerge track properties.
#[derive(Debug, Default, Deserialize)]
struct IdentifyProperties {
    language: Option<String>,
    track_name: Option<String>,
    #[serde(default)]
    forced_track: bool,
    #[serde(default)]
    default_track: bool,
    #[serde(default, alias = "hearing_impaired_flag")]
    flag_hearing_impaired: bool,
}

/// Subtitle names that mark a track as forced even without the flag.
const FORCED_NAME_HINTS: &[&str] = &["forced", "signs", "songs"];

/// mkvmerge exit code for "finished with warnings".
const EXIT_WARNINGS: i32 = 1;

/// A subtitle track rewritten to a file in another format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedSubtitle {
    /// Id of the replaced track in the source file.
    pub track_index: u32,
    /// Converted subtitle file.
    pub path: PathBuf,
}

/// mkvmerge wrapper.
#[derive(Debug, Clone)]
pub struct Mkvmerge {
    path: PathBuf,
    mkvextract: PathBuf,
}

impl Mkvmerge {
    /// Use the given executable. mkvextract is looked up next to it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mkvextract = mkvextract_path(&path);
        Self { path, mkvextract }
    }

    /// Executable path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// mkvextract executable path.
    pub fn mkvextract_path(&self) -> &Path {
        &self.mkvextract
    }

    /// Check if mkvmerge runs.
    pub fn is_installed(&self) -> bool {
        Command::new(&self.path)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Check if mkvextract runs.
    pub fn is_mkvextract_installed(&self) -> bool {
        Command::new(&self.mkvextract)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Get mkvmerge version line.
    pub fn get_version(&self) -> Result<String> {
        let output = Command::new(&self.path).arg("--version").output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let first_line = stdout.lines().next().unwrap_or("unknown");

        Ok(first_line.to_string())
    }

    /// Read the track list of a file with `mkvmerge -J`.
    pub fn identify(&self, path: &Path) -> Result<Vec<Track>> {
        let output = Command::new(&self.path)
            .arg("-J")
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    crate::Error::MkvmergeNotFound
                } else {
                    crate::Error::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(crate::Error::ProbeError(format!(
                "mkvmerge -J failed for {}: {}",
                path.display(),
                last_line(&output.stdout, &output.stderr)
            )));
        }

        parse_identify_output(&output.stdout)
    }

    /// Extract one track to `dest` with `mkvextract tracks`.
    pub fn extract_track(&self, input: &Path, track_id: u32, dest: &Path) -> Result<()> {
        let mut spec = OsString::from(format!("{}:", track_id));
        spec.push(dest);

        let output = Command::new(&self.mkvextract)
            .arg("tracks")
            .arg(input)
            .arg(&spec)
            .output()
            .map_err(|e| {
                crate::Error::SubtitleError(format!(
                    "failed to run {}: {}",
                    self.mkvextract.display(),
                    e
                ))
            })?;

        match output.status.code() {
            Some(0) | Some(EXIT_WARNINGS) => Ok(()),
            _ => Err(crate::Error::SubtitleError(format!(
                "mkvextract failed on track {} of {}: {}",
                track_id,
                input.display(),
                last_line(&output.stdout, &output.stderr)
            ))),
        }
    }

    /// Extract and convert every subtitle listed in `plan.subtitle_conversions` into `work_dir`.
    pub fn convert_subtitles(
        &self,
        plan: &RemuxPlan,
        work_dir: &Path,
    ) -> Result<Vec<ConvertedSubtitle>> {
        plan.subtitle_conversions
            .iter()
            .map(|conv| self.convert_subtitle(&plan.input_path, conv, work_dir))
            .collect()
    }

    fn convert_subtitle(
        &self,
        input: &Path,
        conv: &SubtitleConversion,
        work_dir: &Path,
    ) -> Result<ConvertedSubtitle> {
        let extracted = work_dir.join(format!("track{}.src", conv.track_index));
        let converted = work_dir.join(format!(
            "track{}.{}",
            conv.track_index,
            conv.target_format.extension()
        ));

        self.extract_track(input, conv.track_index, &extracted)?;
        let cues = subtitle::convert_file(&extracted, &converted, conv.target_format)?;
        tracing::info!(
            "Converted subtitle {} to {} ({} entries)",
            conv.track_index,
            conv.target_format,
            cues
        );

        Ok(ConvertedSubtitle {
            track_index: conv.track_index,
            path: converted,
        })
    }

    /// Run the remux described by `plan`, converting subtitles first.
    pub fn run(&self, plan: &RemuxPlan) -> Result<()> {
        if let Some(parent) = plan.output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Converted files live until the remux has finished.
        let work_dir = if plan.subtitle_conversions.is_empty() {
            None
        } else {
            Some(tempfile::Builder::new().prefix("mkv_cleaner").tempdir()?)
        };
        let converted = match &work_dir {
            Some(dir) => self.convert_subtitles(plan, dir.path())?,
            None => Vec::new(),
        };

        let args = mux_args(plan, &converted);
        tracing::debug!("{} {:?}", self.path.display(), args);

        let output = Command::new(&self.path).args(&args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                crate::Error::MkvmergeNotFound
            } else {
                crate::Error::Io(e)
            }
        })?;

        match output.status.code() {
            Some(0) => Ok(()),
            Some(EXIT_WARNINGS) => {
                tracing::warn!(
                    "mkvmerge finished with warnings for {}: {}",
                    plan.input_path.display(),
                    last_line(&output.stdout, &output.stderr)
                );
                Ok(())
            }
            code => Err(crate::Error::MuxError(format!(
                "mkvmerge exited with {}: {}",
                code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()),
                last_line(&output.stdout, &output.stderr)
            ))),
        }
    }
}

impl Default for Mkvmerge {
    fn default() -> Self {
        Self::new("mkvmerge")
    }
}

impl MediaProber for Mkvmerge {
    fn probe(&self, path: &Path) -> Result<Vec<Track>> {
        self.identify(path)
    }
}

impl MuxEngine for Mkvmerge {
    fn remux(&self, plan: &RemuxPlan) -> Result<()> {
        self.run(plan)
    }
}

/// Map mkvmerge `-J` JSON to tracks.
pub fn parse_identify_output(json: &[u8]) -> Result<Vec<Track>> {
    let identify: IdentifyOutput = serde_json::from_slice(json)?;

    let tracks = identify
        .tracks
        .into_iter()
        .filter_map(|t| {
            let kind = match t.track_type.as_str() {
                "video" => TrackKind::Video,
                "audio" => TrackKind::Audio,
                "subtitles" | "subtitle" => TrackKind::Subtitle,
                other => {
                    tracing::debug!("Skipping track {} of type {}", t.id, other);
                    return None;
                }
            };

            let title = t.properties.track_name.filter(|n| !n.trim().is_empty());
            let forced_by_name = kind == TrackKind::Subtitle
                && title.as_deref().map(is_forced_by_name).unwrap_or(false);

            Some(Track {
                index: t.id,
                kind,
                language: canonical_language(t.properties.language.as_deref().unwrap_or("und")),
                is_forced: t.properties.forced_track || forced_by_name,
                is_default: t.properties.default_track,
                is_hearing_impaired: t.properties.flag_hearing_impaired,
                codec: t.codec,
                title,
            })
        })
        .collect();

    Ok(tracks)
}

/// Whether a subtitle name marks it as forced ("Signs & Songs", "Forced").
pub fn is_forced_by_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    FORCED_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// mkvextract next to mkvmerge (`/usr/bin/mkvmerge` -> `/usr/bin/mkvextract`).
fn mkvextract_path(mkvmerge: &Path) -> PathBuf {
    let name = mkvmerge
        .file_name()
        .map(|n| n.to_string_lossy().replace("mkvmerge", "mkvextract"))
        .filter(|n| n.contains("mkvextract"))
        .unwrap_or_else(|| "mkvextract".to_string());
    mkvmerge.with_file_name(name)
}

/// Build the mkvmerge command line (without the executable) for a plan.
///
/// Tracks in `converted` are dropped from the source and their converted files
/// are appended as extra inputs carrying the same language and flags.
pub fn mux_args(plan: &RemuxPlan, converted: &[ConvertedSubtitle]) -> Vec<OsString> {
    let is_converted = |id: u32| converted.iter().any(|c| c.track_index == id);

    let mut args: Vec<OsString> = vec![
        "-o".into(),
        plan.output_path.clone().into_os_string(),
        "--title".into(),
        plan.title.clone().into(),
    ];

    for decision in plan.track_decisions.iter().filter(|d| d.is_kept()) {
        if decision.kind == TrackKind::Video || is_converted(decision.track_index) {
            continue;
        }
        push_track_options(&mut args, decision, decision.track_index);
    }

    for (kind, select_flag, none_flag) in [
        (TrackKind::Video, "--video-tracks", "--no-video"),
        (TrackKind::Audio, "--audio-tracks", "--no-audio"),
        (TrackKind::Subtitle, "--subtitle-tracks", "--no-subtitles"),
    ] {
        let mut ids = plan.kept_ids(kind);
        ids.retain(|id| !is_converted(*id));
        if ids.is_empty() {
            args.push(none_flag.into());
        } else {
            let list = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
            args.push(select_flag.into());
            args.push(list.into());
        }
    }

    args.push(plan.input_path.clone().into_os_string());

    for conv in converted {
        let decision = plan
            .track_decisions
            .iter()
            .find(|d| d.track_index == conv.track_index);
        if let Some(decision) = decision {
            // A subtitle file holds a single track with id 0.
            push_track_options(&mut args, decision, 0);
        }
        args.push(conv.path.clone().into_os_string());
    }

    args
}

fn push_track_options(args: &mut Vec<OsString>, d: &TrackDecision, id: u32) {
    let flag = |on: bool| if on { "yes" } else { "no" };

    args.push("--language".into());
    args.push(format!("{}:{}", id, d.language).into());

    if let Some(title) = &d.new_title {
        args.push("--track-name".into());
        args.push(format!("{}:{}", id, title).into());
    }

    args.push("--default-track-flag".into());
    args.push(format!("{}:{}", id, flag(d.set_default)).into());

    if d.set_original {
        args.push("--original-flag".into());
        args.push(format!("{}:yes", id).into());
    }

    if d.kind == TrackKind::Subtitle {
        args.push("--forced-display-flag".into());
        args.push(format!("{}:{}", id, flag(d.set_forced)).into());

        if d.set_hearing_impaired {
            args.push("--hearing-impaired-flag".into());
            args.push(format!("{}:yes", id).into());
        }
    }
}

/// Last non-empty output line, for error messages.
fn last_line(stdout: &[u8], stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stdout = String::from_utf8_lossy(stdout);
    stderr
        .lines()
        .chain(stdout.lines())
        .filter(|l| !l.trim().is_empty())
        .last()
        .unwrap_or("no output")
        .trim()
        .to_string()
}
