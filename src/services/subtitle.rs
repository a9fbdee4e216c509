//! Text subtitle conversion between SRT, ASS/SSA and WebVTT.
//!
//! Input format is detected from the content, so extracted files need no
//! particular extension. Styling is not carried across formats: ASS override
//! tags are dropped and the output uses a single default style.

use crate::models::plan::SubtitleFormat;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// One timed subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Plain text, lines separated by `\n`.
    pub text: String,
}

static ASS_OVERRIDE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// `\p1`..`\p9` switch an ASS line to vector drawing mode.
static ASS_DRAWING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\\p[1-9]").unwrap());

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

const ASS_HEADER: &str = "[Script Info]
ScriptType: v4.00+
PlayResX: 384
PlayResY: 288

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

const SSA_HEADER: &str = "[Script Info]
ScriptType: v4.00
PlayResX: 384
PlayResY: 288

[V4 Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, TertiaryColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, AlphaLevel, Encoding
Style: Default,Arial,20,16777215,255,0,0,0,0,1,2,2,2,10,10,10,0,1

[Events]
Format: Marked, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Guess the format of subtitle text.
pub fn detect_format(content: &str) -> SubtitleFormat {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("WEBVTT") {
        return SubtitleFormat::WebVtt;
    }

    let lower = content.to_lowercase();
    if lower.contains("[v4+ styles]") {
        SubtitleFormat::Ass
    } else if lower.contains("[v4 styles]") {
        SubtitleFormat::Ssa
    } else if lower.contains("[script info]") || lower.contains("[events]") {
        SubtitleFormat::Ass
    } else {
        SubtitleFormat::Srt
    }
}

/// Parse subtitle text in any supported format.
pub fn parse(content: &str) -> Result<Vec<Cue>> {
    let cues = match detect_format(content) {
        SubtitleFormat::Ass | SubtitleFormat::Ssa => parse_ass(content),
        SubtitleFormat::Srt | SubtitleFormat::WebVtt => parse_timed_blocks(content),
    };

    if cues.is_empty() && !content.trim().is_empty() {
        return Err(crate::Error::SubtitleError(
            "no subtitle entries recognized".to_string(),
        ));
    }
    Ok(cues)
}

/// SRT and WebVTT share the block layout: optional id, a `start --> end` line, text.
fn parse_timed_blocks(content: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut current: Option<Cue> = None;

    for line in content.trim_start_matches('\u{feff}').lines() {
        if line.trim().is_empty() {
            cues.extend(current.take().filter(|c| !c.text.is_empty()));
            continue;
        }

        if let Some((start, end)) = parse_timing_line(line) {
            cues.extend(current.take().filter(|c| !c.text.is_empty()));
            current = Some(Cue {
                start_ms: start,
                end_ms: end,
                text: String::new(),
            });
        } else if let Some(cue) = current.as_mut() {
            if !cue.text.is_empty() {
                cue.text.push('\n');
            }
            cue.text.push_str(line.trim_end());
        }
    }
    cues.extend(current.filter(|c| !c.text.is_empty()));

    cues
}

/// `00:00:01,000 --> 00:00:04,000`, with WebVTT cue settings after the end time ignored.
fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// `HH:MM:SS,mmm`, `HH:MM:SS.mmm`, `MM:SS.mmm` or ASS `H:MM:SS.cc`, in milliseconds.
pub fn parse_timestamp(s: &str) -> Option<u64> {
    let s = s.replace(',', ".");
    let (clock, fraction) = match s.split_once('.') {
        Some((clock, fraction)) => (clock, fraction),
        None => (s.as_str(), ""),
    };

    let mut seconds = 0u64;
    let mut fields = 0;
    for field in clock.split(':') {
        seconds = seconds * 60 + field.trim().parse::<u64>().ok()?;
        fields += 1;
    }
    if !(2..=3).contains(&fields) {
        return None;
    }

    let millis = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 100,
        2 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.get(..3)?.parse::<u64>().ok()?,
    };

    Some(seconds * 1000 + millis)
}

fn parse_ass(content: &str) -> Vec<Cue> {
    let mut in_events = false;
    let mut format: Vec<String> = Vec::new();
    let mut cues = Vec::new();

    for line in content.trim_start_matches('\u{feff}').lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_events = line.eq_ignore_ascii_case("[events]");
            continue;
        }
        if !in_events {
            continue;
        }

        if let Some(fields) = line.strip_prefix("Format:") {
            format = fields.split(',').map(|f| f.trim().to_lowercase()).collect();
        } else if let Some(fields) = line.strip_prefix("Dialogue:") {
            if let Some(cue) = parse_dialogue(fields, &format) {
                cues.push(cue);
            }
        }
    }

    cues.sort_by_key(|c| c.start_ms);
    cues
}

/// Fields of a `Dialogue:` line. The text field is last and may contain commas.
fn parse_dialogue(fields: &str, format: &[String]) -> Option<Cue> {
    let position = |name: &str, default: usize| {
        format.iter().position(|f| f == name).unwrap_or(default)
    };
    let count = if format.is_empty() { 10 } else { format.len() };
    let parts: Vec<&str> = fields.trim_start().splitn(count, ',').collect();

    let start = parse_timestamp(parts.get(position("start", 1))?.trim())?;
    let end = parse_timestamp(parts.get(position("end", 2))?.trim())?;
    let raw = parts.get(position("text", count - 1))?;

    if ASS_DRAWING_RE.is_match(raw) {
        return None;
    }

    let text = ASS_OVERRIDE_RE
        .replace_all(raw, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    Some(Cue {
        start_ms: start,
        end_ms: end,
        text: text.to_string(),
    })
}

/// Render cues in the target format.
pub fn render(cues: &[Cue], format: SubtitleFormat) -> String {
    let mut out = String::new();
    match format {
        SubtitleFormat::Srt => {
            for (i, cue) in cues.iter().enumerate() {
                out.push_str(&format!(
                    "{}\n{} --> {}\n{}\n\n",
                    i + 1,
                    format_clock(cue.start_ms, ','),
                    format_clock(cue.end_ms, ','),
                    cue.text
                ));
            }
        }
        SubtitleFormat::WebVtt => {
            out.push_str("WEBVTT\n\n");
            for cue in cues {
                out.push_str(&format!(
                    "{} --> {}\n{}\n\n",
                    format_clock(cue.start_ms, '.'),
                    format_clock(cue.end_ms, '.'),
                    cue.text
                ));
            }
        }
        SubtitleFormat::Ass | SubtitleFormat::Ssa => {
            let (header, marker) = if format == SubtitleFormat::Ass {
                (ASS_HEADER, "0")
            } else {
                (SSA_HEADER, "Marked=0")
            };
            out.push_str(header);
            for cue in cues {
                let text = HTML_TAG_RE.replace_all(&cue.text, "").replace('\n', "\\N");
                out.push_str(&format!(
                    "Dialogue: {},{},{},Default,,0,0,0,,{}\n",
                    marker,
                    format_ass_time(cue.start_ms),
                    format_ass_time(cue.end_ms),
                    text
                ));
            }
        }
    }
    out
}

fn format_clock(ms: u64, separator: char) -> String {
    let (hours, minutes, seconds) = (ms / 3_600_000, ms / 60_000 % 60, ms / 1000 % 60);
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours,
        minutes,
        seconds,
        separator,
        ms % 1000
    )
}

fn format_ass_time(ms: u64) -> String {
    let (hours, minutes, seconds) = (ms / 3_600_000, ms / 60_000 % 60, ms / 1000 % 60);
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, ms % 1000 / 10)
}

/// Convert subtitle text to `target`.
pub fn convert(content: &str, target: SubtitleFormat) -> Result<String> {
    Ok(render(&parse(content)?, target))
}

/// Convert the subtitle file at `source` and write it to `dest`. Returns the cue count.
pub fn convert_file(source: &Path, dest: &Path, target: SubtitleFormat) -> Result<usize> {
    let bytes = std::fs::read(source)?;
    let content = String::from_utf8_lossy(&bytes);
    let cues = parse(&content)
        .map_err(|e| crate::Error::SubtitleError(format!("{}: {}", source.display(), e)))?;

    std::fs::write(dest, render(&cues, target))?;
    tracing::debug!(
        "Converted {} cues from {} to {}",
        cues.len(),
        source.display(),
        target
    );

    Ok(cues.len())
}
