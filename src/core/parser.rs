//! Filename parser module.
//!
//! Rule-based analysis of scene-style file names. Extracts:
//! - Series (or movie) title
//! - Season and episode number, including ranges and split episodes (`E05.5`)
//! - Episode title
//! - Quality/source/codec tags and release groups
//! - Release year (movies)
//!
//! The parser never fails: anything it cannot make sense of ends up as a
//! movie-style result whose title is the file stem.

use crate::models::media::{EpisodeNumber, ParsedName};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

/// Extensions stripped before parsing. Anything else is considered part of the name.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mka", "mks", "mk3d", "mp4", "m4v", "avi", "webm", "mov", "ts", "m2ts", "wmv",
];

/// Title used when a name has no usable characters at all.
const UNTITLED: &str = "Untitled";

/// Kinds of season/episode markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `S01E05`, `S01E05.5`, `S01E05v2`
    SeasonEpisode,
    /// `S01E05-E06`, `S01E05E06`
    SeasonEpisodeRange,
    /// `1x05`
    CrossFormat,
    /// `Episode 5`, `Ep 5` (season 1)
    BareEpisode,
}

/// Marker patterns in priority order. The first kind that matches wins.
pub const MARKER_PRIORITY: [MarkerKind; 4] = [
    MarkerKind::SeasonEpisode,
    MarkerKind::SeasonEpisodeRange,
    MarkerKind::CrossFormat,
    MarkerKind::BareEpisode,
];

static SEASON_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bS(\d{1,3})[ .]?E(\d{1,4})(?:\.(\d{1,2})\b|v(\d{1,2})\b)?").unwrap()
});

/// Text right after an `SxxEyy` match that turns it into a range.
static RANGE_CONTINUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ ?-? ?E\d").unwrap());

static SEASON_EPISODE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bS(\d{1,3})[ .]?E(\d{1,4})(?:\.(\d{1,2})\b|v(\d{1,2})\b)? ?-? ?E(\d{1,4})\b",
    )
    .unwrap()
});

static CROSS_FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})(?:\.(\d{1,2})\b|v(\d{1,2})\b)?\b").unwrap()
});

static BARE_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Episode|Ep)[ .]?(\d{1,4})(?:\.(\d{1,2})\b|v(\d{1,2})\b)?\b").unwrap()
});

/// Quality token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    Resolution,
    Source,
    Codec,
    Audio,
    Service,
    Depth,
    /// Release flags (`REPACK`, `PROPER`).
    Flag,
}

/// Recognized quality tokens, as regex fragments. Longer spellings come first
/// so alternation prefers `WEB-DL` over `WEB`. Tokens marked case-sensitive are
/// ordinary words in lowercase (`web`, `nf`).
pub const QUALITY_TOKENS: &[(TagCategory, &str, bool)] = &[
    (TagCategory::Resolution, r"2160p", false),
    (TagCategory::Resolution, r"1080p", false),
    (TagCategory::Resolution, r"1080i", false),
    (TagCategory::Resolution, r"720p", false),
    (TagCategory::Resolution, r"576p", false),
    (TagCategory::Resolution, r"480p", false),
    (TagCategory::Resolution, r"4K", false),
    (TagCategory::Resolution, r"UHD", false),
    (TagCategory::Source, r"WEB-DL", false),
    (TagCategory::Source, r"WEBDL", false),
    (TagCategory::Source, r"WEBRip", false),
    (TagCategory::Source, r"WEB", true),
    (TagCategory::Source, r"Blu-?Ray", false),
    (TagCategory::Source, r"BDRip", false),
    (TagCategory::Source, r"BRRip", false),
    (TagCategory::Source, r"HDTV", false),
    (TagCategory::Source, r"DVDRip", false),
    (TagCategory::Source, r"REMUX", false),
    (TagCategory::Codec, r"x264", false),
    (TagCategory::Codec, r"x265", false),
    (TagCategory::Codec, r"H\.?264", false),
    (TagCategory::Codec, r"H\.?265", false),
    (TagCategory::Codec, r"HEVC", false),
    (TagCategory::Codec, r"AVC", true),
    (TagCategory::Codec, r"AV1", false),
    (TagCategory::Codec, r"XviD", false),
    (TagCategory::Audio, r"DDP?\d\.\d", false),
    (TagCategory::Audio, r"DDP", true),
    (TagCategory::Audio, r"E-?AC-?3", false),
    (TagCategory::Audio, r"AC-?3", false),
    (TagCategory::Audio, r"AAC(?:\d\.\d)?", false),
    (TagCategory::Audio, r"DTS-HD(?:\.MA)?", false),
    (TagCategory::Audio, r"DTS", false),
    (TagCategory::Audio, r"TrueHD", false),
    (TagCategory::Audio, r"Atmos", false),
    (TagCategory::Audio, r"FLAC", false),
    (TagCategory::Audio, r"[257]\.[01]", false),
    (TagCategory::Audio, r"\d+Kbps", false),
    (TagCategory::Audio, r"MSubs", false),
    (TagCategory::Service, r"NF", true),
    (TagCategory::Service, r"AMZN", true),
    (TagCategory::Service, r"HULU", true),
    (TagCategory::Service, r"DSNP", true),
    (TagCategory::Service, r"HMAX", true),
    (TagCategory::Service, r"ATVP", true),
    (TagCategory::Service, r"PCOK", true),
    (TagCategory::Depth, r"HDR10", false),
    (TagCategory::Depth, r"HDR", false),
    (TagCategory::Depth, r"10bit", false),
    (TagCategory::Depth, r"8bit", false),
    (TagCategory::Flag, r"REPACK", false),
    (TagCategory::Flag, r"PROPER", true),
    (TagCategory::Flag, r"iNTERNAL", true),
    (TagCategory::Flag, r"INTERNAL", true),
];

static QUALITY_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = QUALITY_TOKENS
        .iter()
        .map(|(_, token, case_sensitive)| {
            if *case_sensitive {
                format!("(?-i:{})", token)
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
});

/// Masked positions are filled with this byte while scanning.
const MASK: char = '\0';

static LEADING_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[([^\[\]\x00]+)\]").unwrap());

static TRAILING_BRACKET_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\x00]+)\][\s.]*$").unwrap());

static TRAILING_DASH_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([A-Za-z0-9]+)\s*$").unwrap());

/// Plain words (`Man`, `bird`) after a dash belong to a hyphenated title.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]?[a-z]+$").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

static EMPTY_BRACKETS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[{][\s.\-_,+]*[)\]}]").unwrap());

static ABBREVIATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(Mrs|Mr|Ms|Dr|St|Jr|Sr)\.").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remainders that carry no information (`Episode`, `Ep 5`, `Episode #2.5`, `#3`).
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:episode|ep)?\s*#?\s*[\d.\s]*$").unwrap());

/// Location and numbers of a season/episode marker.
#[derive(Debug, Clone, PartialEq)]
struct Marker {
    kind: MarkerKind,
    start: usize,
    end: usize,
    season: u32,
    episode: EpisodeNumber,
    last_episode: Option<EpisodeNumber>,
}

/// Parse a file name into structured metadata.
pub fn parse(filename: &str) -> ParsedName {
    let name = Path::new(filename.trim())
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.trim().to_string());
    let stem = strip_extension(&name);
    let prepared = stem.replace('_', " ");

    let parsed = match find_marker(&prepared) {
        Some(marker) => parse_episode(&prepared, stem, &name, marker),
        None => parse_movie(&prepared, stem, &name),
    };

    tracing::debug!("Parsed {:?} -> {:?}", filename, parsed);
    parsed
}

/// Parse a batch of file names.
pub fn parse_all<S: AsRef<str>>(filenames: &[S]) -> Vec<ParsedName> {
    filenames.iter().map(|f| parse(f.as_ref())).collect()
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => stem,
        _ => name,
    }
}

/// Try each marker kind in priority order.
fn find_marker(text: &str) -> Option<Marker> {
    MARKER_PRIORITY
        .iter()
        .find_map(|kind| match_marker(*kind, text))
}

fn match_marker(kind: MarkerKind, text: &str) -> Option<Marker> {
    match kind {
        MarkerKind::SeasonEpisode => SEASON_EPISODE_RE
            .captures_iter(text)
            .filter(|caps| {
                let end = caps.get(0).map(|m| m.end()).unwrap_or_default();
                !RANGE_CONTINUATION_RE.is_match(&text[end..])
            })
            .find_map(|caps| marker_from(kind, text, &caps, Some(1), 2, 3, 4, None)),
        MarkerKind::SeasonEpisodeRange => SEASON_EPISODE_RANGE_RE
            .captures_iter(text)
            .find_map(|caps| marker_from(kind, text, &caps, Some(1), 2, 3, 4, Some(5))),
        MarkerKind::CrossFormat => CROSS_FORMAT_RE
            .captures_iter(text)
            .find_map(|caps| marker_from(kind, text, &caps, Some(1), 2, 3, 4, None)),
        MarkerKind::BareEpisode => BARE_EPISODE_RE
            .captures_iter(text)
            .find_map(|caps| marker_from(kind, text, &caps, None, 1, 2, 3, None)),
    }
}

/// Build a marker from capture group indices. A missing season group means season 1.
///
/// A decimal suffix that starts a quality token (`S01E02.2.0` is episode 2
/// followed by `2.0` audio) is left out of the marker.
#[allow(clippy::too_many_arguments)]
fn marker_from(
    kind: MarkerKind,
    text: &str,
    caps: &Captures<'_>,
    season_group: Option<usize>,
    episode_group: usize,
    decimal_group: usize,
    version_group: usize,
    last_group: Option<usize>,
) -> Option<Marker> {
    let whole = caps.get(0)?;
    let number = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());

    let season = match season_group {
        Some(idx) => number(idx)?,
        None => 1,
    };
    let episode_whole = number(episode_group)?;
    let mut end = whole.end();

    let mut decimal = caps.get(decimal_group);
    if let Some(m) = decimal {
        if last_group.is_none() && starts_quality_token(text, m.start(), m.end()) {
            decimal = None;
            end = caps.get(episode_group).map_or(end, |e| e.end());
        }
    }
    let episode = match decimal.or_else(|| caps.get(version_group)) {
        Some(part) => EpisodeNumber::from_digits(episode_whole, part.as_str())?,
        None => EpisodeNumber::new(episode_whole),
    };
    let last_episode = last_group.and_then(number).map(EpisodeNumber::new);

    Some(Marker {
        kind,
        start: whole.start(),
        end,
        season,
        episode,
        last_episode,
    })
}

/// Whether a quality token begins at `start` and runs past `end`.
fn starts_quality_token(text: &str, start: usize, end: usize) -> bool {
    QUALITY_RE
        .find_at(text, start)
        .map_or(false, |m| m.start() == start && m.end() > end)
}

fn parse_episode(prepared: &str, stem: &str, name: &str, marker: Marker) -> ParsedName {
    tracing::debug!("Matched {:?} marker in {:?}", marker.kind, prepared);

    let head = &prepared[..marker.start];
    let tail = &prepared[marker.end..];

    let (head_masked, mut tags) = mask_quality(head, 0, true, false);
    let (tail_masked, tail_tags) = mask_quality(tail, marker.end, false, true);
    tags.extend(tail_tags);
    tags.sort_by_key(|(pos, _)| *pos);

    let series_title = non_empty(clean_segment(&head_masked))
        .unwrap_or_else(|| fallback_title(stem, name));

    let episode_title = non_empty(clean_segment(&tail_masked)).filter(|t| !is_placeholder(t));

    ParsedName {
        series_title,
        season: Some(marker.season),
        episode: Some(marker.episode),
        last_episode: marker.last_episode,
        episode_title,
        quality_tags: tags.into_iter().map(|(_, tag)| tag).collect(),
        year: None,
        is_movie: false,
    }
}

fn parse_movie(prepared: &str, stem: &str, name: &str) -> ParsedName {
    let (mut masked, tags) = mask_quality(prepared, 0, true, true);

    // The last year-like token is the release year, unless it is the whole title.
    let mut year = None;
    let last_year = YEAR_RE
        .find_iter(&masked)
        .last()
        .map(|m| (m.range(), m.as_str().to_string()));
    if let Some((range, digits)) = last_year {
        let mut without_year = masked.clone();
        without_year.replace_range(range.clone(), &mask_of(range.len()));
        if non_empty(clean_segment(&without_year)).is_some() {
            year = digits.parse::<u16>().ok();
            masked = without_year;
        }
    }

    let series_title =
        non_empty(clean_segment(&masked)).unwrap_or_else(|| fallback_title(stem, name));

    ParsedName {
        year,
        quality_tags: tags.into_iter().map(|(_, tag)| tag).collect(),
        ..ParsedName::movie(series_title)
    }
}

/// Replace quality tokens and release groups with mask bytes.
///
/// Returns the masked text and the removed tags with their absolute positions
/// (`offset` is the segment's position in the full name).
fn mask_quality(
    segment: &str,
    offset: usize,
    leading_group: bool,
    trailing_group: bool,
) -> (String, Vec<(usize, String)>) {
    let mut masked = segment.to_string();
    let mut tags = Vec::new();

    for m in QUALITY_RE.find_iter(segment) {
        tags.push((offset + m.start(), m.as_str().to_string()));
        masked.replace_range(m.range(), &mask_of(m.as_str().len()));
    }

    if leading_group {
        if let Some(caps) = LEADING_GROUP_RE.captures(&masked) {
            let (whole, group) = (caps.get(0), caps.get(1));
            if let (Some(whole), Some(group)) = (whole, group) {
                tags.push((offset + group.start(), group.as_str().to_string()));
                let range = whole.range();
                masked.replace_range(range.clone(), &mask_of(range.len()));
            }
        }
    }

    if trailing_group {
        let found = TRAILING_BRACKET_GROUP_RE
            .captures(&masked)
            .or_else(|| {
                TRAILING_DASH_GROUP_RE
                    .captures(&masked)
                    .filter(|caps| is_dash_group(&masked, caps))
            })
            .and_then(|caps| {
                let group = caps.get(1)?;
                let whole = caps.get(0)?;
                Some((whole.range(), group.start(), group.as_str().to_string()))
            });
        if let Some((range, start, group)) = found {
            tags.push((offset + start, group));
            masked.replace_range(range.clone(), &mask_of(range.len()));
        }
    }

    tags.sort_by_key(|(pos, _)| *pos);
    (masked, tags)
}

/// `-GROUP` at the end is a release group after a quality token, or when it
/// is glued to the previous word and does not read as a plain word.
fn is_dash_group(masked: &str, caps: &Captures<'_>) -> bool {
    let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
        return false;
    };
    match masked[..whole.start()].chars().last() {
        Some(MASK) => true,
        Some(c) if !c.is_whitespace() => {
            let group = group.as_str();
            group.chars().any(|c| c.is_ascii_alphabetic()) && !WORD_RE.is_match(group)
        }
        _ => false,
    }
}

fn mask_of(len: usize) -> String {
    MASK.to_string().repeat(len)
}

/// Turn a masked segment into display text: separators become spaces,
/// leftover empty brackets disappear, abbreviations keep their dot.
fn clean_segment(masked: &str) -> String {
    let text = masked.replace(MASK, " ");
    let text = ABBREVIATION_RE.replace_all(&text, "$1\u{1}");
    let text = text.replace('.', " ").replace('\u{1}', ". ");

    let mut text = WHITESPACE_RE.replace_all(&text, " ").to_string();
    while EMPTY_BRACKETS_RE.is_match(&text) {
        text = EMPTY_BRACKETS_RE.replace_all(&text, " ").to_string();
    }
    let text = WHITESPACE_RE.replace_all(&text, " ");

    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '.' | '_' | ',' | '+'))
        .to_string()
}

fn is_placeholder(text: &str) -> bool {
    text.chars().count() < 2
        || !text.chars().any(char::is_alphanumeric)
        || PLACEHOLDER_RE.is_match(text)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn fallback_title(stem: &str, name: &str) -> String {
    [stem, name]
        .iter()
        .find(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}
