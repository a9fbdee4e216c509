//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of stream multiplexed in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    #[serde(alias = "subtitles")]
    Subtitle,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Video => write!(f, "video"),
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// A track reported by the media prober.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track id inside the container (mkvmerge track id).
    pub index: u32,
    /// Track kind.
    pub kind: TrackKind,
    /// ISO 639-2 language code, `und` when unknown.
    pub language: String,
    /// Forced display flag.
    pub is_forced: bool,
    /// Default track flag.
    pub is_default: bool,
    /// Hearing impaired flag.
    #[serde(default)]
    pub is_hearing_impaired: bool,
    /// Codec name as reported by the prober (e.g., "SubRip/SRT", "AAC").
    pub codec: String,
    /// Track name.
    pub title: Option<String>,
}

impl Track {
    /// Create a track with no flags and no title.
    pub fn new(index: u32, kind: TrackKind, language: &str, codec: &str) -> Self {
        Self {
            index,
            kind,
            language: language.to_string(),
            is_forced: false,
            is_default: false,
            is_hearing_impaired: false,
            codec: codec.to_string(),
            title: None,
        }
    }

    /// Builder-style setter for the forced flag.
    pub fn forced(mut self) -> Self {
        self.is_forced = true;
        self
    }

    /// Builder-style setter for the track name.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Episode number, possibly fractional (split or special episodes like `E05.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeNumber {
    /// Whole episode number.
    pub whole: u32,
    /// Digits after the decimal point, if any.
    pub part: Option<u32>,
    /// Number of digits written for `part`, so `05.05` and `05.5` stay distinct.
    #[serde(default)]
    pub part_width: u8,
}

impl EpisodeNumber {
    pub fn new(whole: u32) -> Self {
        Self {
            whole,
            part: None,
            part_width: 0,
        }
    }

    pub fn split(whole: u32, part: u32) -> Self {
        Self {
            whole,
            part: Some(part),
            part_width: part.to_string().len() as u8,
        }
    }

    /// Split episode from the digits as written (`"05"` keeps its leading zero).
    pub fn from_digits(whole: u32, digits: &str) -> Option<Self> {
        let part = digits.parse().ok()?;
        Some(Self {
            whole,
            part: Some(part),
            part_width: digits.len() as u8,
        })
    }

    fn suffix(&self) -> Option<String> {
        self.part
            .map(|part| format!("{:0width$}", part, width = self.part_width as usize))
    }

    /// Zero-padded form used inside `SxxEyy` tags (`05`, `05.5`).
    pub fn padded(&self) -> String {
        match self.suffix() {
            Some(suffix) => format!("{:02}.{}", self.whole, suffix),
            None => format!("{:02}", self.whole),
        }
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix() {
            Some(suffix) => write!(f, "{}.{}", self.whole, suffix),
            None => write!(f, "{}", self.whole),
        }
    }
}

/// Result of filename analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedName {
    /// Cleaned show or movie name. Never empty.
    pub series_title: String,
    /// Season number.
    pub season: Option<u32>,
    /// First (or only) episode number.
    pub episode: Option<EpisodeNumber>,
    /// Last episode of an `SxxEyy-Ezz` range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_episode: Option<EpisodeNumber>,
    /// Trailing descriptive text.
    pub episode_title: Option<String>,
    /// Quality/source/codec/group markers, in original text order.
    pub quality_tags: Vec<String>,
    /// Release year (movies only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// No season/episode marker was found.
    pub is_movie: bool,
}

impl ParsedName {
    /// A movie-style result with only a title.
    pub fn movie(series_title: impl Into<String>) -> Self {
        Self {
            series_title: series_title.into(),
            season: None,
            episode: None,
            last_episode: None,
            episode_title: None,
            quality_tags: Vec::new(),
            year: None,
            is_movie: true,
        }
    }

    /// `SxxEyy` tag for episodes.
    pub fn season_episode_tag(&self) -> Option<String> {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => Some(format!("S{:02}E{}", season, episode.padded())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_number_display() {
        assert_eq!(EpisodeNumber::new(5).to_string(), "5");
        assert_eq!(EpisodeNumber::split(5, 5).to_string(), "5.5");
        assert_eq!(EpisodeNumber::new(5).padded(), "05");
        assert_eq!(EpisodeNumber::split(5, 2).padded(), "05.2");
    }

    #[test]
    fn test_episode_number_keeps_leading_zero() {
        let zero_padded = EpisodeNumber::from_digits(5, "05").unwrap();
        let short = EpisodeNumber::from_digits(5, "5").unwrap();
        assert_ne!(zero_padded, short);
        assert_eq!(zero_padded.to_string(), "5.05");
        assert_eq!(zero_padded.padded(), "05.05");
        assert_eq!(short, EpisodeNumber::split(5, 5));
        assert!(EpisodeNumber::from_digits(5, "").is_none());
    }

    #[test]
    fn test_track_kind_accepts_mkvmerge_spelling() {
        let kind: TrackKind = serde_json::from_str("\"subtitles\"").unwrap();
        assert_eq!(kind, TrackKind::Subtitle);
    }

    #[test]
    fn test_season_episode_tag() {
        let mut parsed = ParsedName::movie("Show");
        assert!(parsed.season_episode_tag().is_none());
        parsed.season = Some(2);
        parsed.episode = Some(EpisodeNumber::new(5));
        assert_eq!(parsed.season_episode_tag().as_deref(), Some("S02E05"));
    }
}
