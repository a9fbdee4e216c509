//! Remux plan data model.

use super::media::TrackKind;
use crate::utils::language::language_name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What to do with a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackAction {
    Keep,
    Drop,
}

/// Per-track decision computed by the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDecision {
    /// Track id inside the source container.
    pub track_index: u32,
    /// Track kind.
    pub kind: TrackKind,
    /// Canonical language code.
    pub language: String,
    /// Source codec.
    pub codec: String,
    /// Keep or drop.
    pub action: TrackAction,
    /// Mark as default track.
    pub set_default: bool,
    /// Forced flag, copied from the source track.
    pub set_forced: bool,
    /// Mark as original-language track.
    #[serde(default)]
    pub set_original: bool,
    /// Hearing impaired flag, copied from the source track.
    #[serde(default)]
    pub set_hearing_impaired: bool,
    /// Replacement track name. `None` preserves the original.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_title: Option<String>,
}

impl TrackDecision {
    pub fn is_kept(&self) -> bool {
        self.action == TrackAction::Keep
    }
}

/// Text subtitle formats a track can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Ass,
    Ssa,
    #[value(name = "webvtt")]
    WebVtt,
}

impl SubtitleFormat {
    /// Map an mkvmerge codec name or codec id to a text subtitle format.
    ///
    /// Returns `None` for bitmap formats (PGS, VobSub) and unknown codecs.
    pub fn from_codec(codec: &str) -> Option<Self> {
        let codec = codec.to_lowercase();
        if codec.contains("subrip") || codec.contains("srt") || codec == "s_text/utf8" {
            Some(SubtitleFormat::Srt)
        } else if (codec.contains("substationalpha") && !codec.contains("advanced"))
            || codec == "s_text/ssa"
        {
            Some(SubtitleFormat::Ssa)
        } else if codec.contains("advanced") || codec.contains("ass") {
            Some(SubtitleFormat::Ass)
        } else if codec.contains("webvtt") {
            Some(SubtitleFormat::WebVtt)
        } else {
            None
        }
    }

    /// File extension for extracted subtitles.
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Ass => "ass",
            SubtitleFormat::Ssa => "ssa",
            SubtitleFormat::WebVtt => "vtt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A subtitle track whose format should be converted by the external converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleConversion {
    pub track_index: u32,
    pub target_format: SubtitleFormat,
}

/// Everything the mux engine needs to rewrite one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemuxPlan {
    /// Source file.
    pub input_path: PathBuf,
    /// Destination file (collision-free at build time).
    pub output_path: PathBuf,
    /// Container title.
    pub title: String,
    /// One decision per source track.
    pub track_decisions: Vec<TrackDecision>,
    /// Pending subtitle format conversions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitle_conversions: Vec<SubtitleConversion>,
}

impl RemuxPlan {
    /// Ids of kept tracks of the given kind, in decision order.
    pub fn kept_ids(&self, kind: TrackKind) -> Vec<u32> {
        self.track_decisions
            .iter()
            .filter(|d| d.kind == kind && d.is_kept())
            .map(|d| d.track_index)
            .collect()
    }

    /// Output file name without the directory.
    pub fn output_filename(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Human-readable change lines for the process log.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Renamed to: {}", self.output_filename()),
            format!("MKV title: {}", self.title),
        ];

        for d in &self.track_decisions {
            let name = language_name(&d.language);
            let id = d.track_index;
            let line = match (d.kind, d.action) {
                (TrackKind::Video, _) => format!("Keep video track {}", id),
                (kind, TrackAction::Drop) => format!("Removed {} track {} [{}]", kind, id, name),
                (kind, TrackAction::Keep) => {
                    let mut flags = Vec::new();
                    if d.set_default {
                        flags.push("default");
                    }
                    if d.set_forced {
                        flags.push("forced");
                    }
                    if d.set_original {
                        flags.push("original");
                    }
                    if flags.is_empty() {
                        format!("Keep {} {} [{}]", kind, id, name)
                    } else {
                        format!("Keep {} {} [{}] ({})", kind, id, name, flags.join(", "))
                    }
                }
            };
            lines.push(line);
        }

        for conv in &self.subtitle_conversions {
            lines.push(format!(
                "Convert subtitle {} to {}",
                conv.track_index, conv.target_format
            ));
        }

        lines
    }
}
