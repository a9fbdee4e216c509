//! Track selection module.
//!
//! Decides per track whether to keep it, which track of each kind becomes the
//! default, and which tracks need a cleaned-up name.

use crate::models::config::LanguagePreferences;
use crate::models::media::{Track, TrackKind};
use crate::models::plan::{TrackAction, TrackDecision};
use crate::utils::language::{canonical_language, language_name};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Track names that say nothing about the content: codec names, channel
/// layouts and muxer/encoder banners.
static BOILERPLATE_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(?:
            subrip(?:/srt)? | srt | ass | ssa | substationalpha | webvtt | pgs | hdmv[\s_]pgs | vobsub
            | aac(?:\s?lc)? | e-?ac-?3 | ac-?3 | dts(?:-hd)?(?:\s?ma)? | truehd | flac | opus | mp3 | pcm | lpcm
            | h\.?264 | h\.?265 | hevc | avc | x264 | x265 | av1
            | stereo | mono | surround(?:\s\d\.\d)? | \d\.\d(?:\s?ch)?
            | track\s?\d+ | audio(?:\s?\d+)? | subtitles?(?:\s?\d+)?
        )$|^(?i:lavf|lavc|handbrake|mkvmerge|mainconcept|x264\score|isomedia)",
    )
    .unwrap()
});

/// Compute keep/drop/default decisions for every track.
///
/// Deterministic for a given track list. Decisions come back ordered by track index.
pub fn select(tracks: &[Track], prefs: &LanguagePreferences) -> Vec<TrackDecision> {
    let prefs = prefs.canonicalized();

    let mut ordered: Vec<&Track> = tracks.iter().collect();
    ordered.sort_by_key(|t| t.index);

    let mut decisions: Vec<TrackDecision> = ordered
        .iter()
        .map(|track| initial_decision(track, &prefs))
        .collect();

    drop_duplicate_subtitles(&mut decisions);
    assign_default(&mut decisions, TrackKind::Audio, &prefs.default_audio);
    assign_default(&mut decisions, TrackKind::Subtitle, &prefs.default_subtitle);

    for (decision, track) in decisions.iter_mut().zip(ordered.iter()) {
        if decision.is_kept() && decision.kind != TrackKind::Video {
            decision.new_title = cleaned_title(track, &decision.language);
        }
        tracing::debug!(
            "Track {} ({}, {}): {:?}{}",
            decision.track_index,
            decision.kind,
            decision.language,
            decision.action,
            if decision.set_default { " [default]" } else { "" }
        );
    }

    decisions
}

/// Keep/drop by allow-list, with flags copied from the source.
fn initial_decision(track: &Track, prefs: &LanguagePreferences) -> TrackDecision {
    let language = canonical_language(&track.language);

    let (keep, original) = match track.kind {
        TrackKind::Video => (true, false),
        TrackKind::Audio => (
            is_allowed(&prefs.allowed_audio, &language),
            prefs.original_audio.as_deref() == Some(language.as_str()),
        ),
        TrackKind::Subtitle => (
            is_allowed(&prefs.allowed_subtitle, &language),
            prefs.original_subtitle.as_deref() == Some(language.as_str()),
        ),
    };

    TrackDecision {
        track_index: track.index,
        kind: track.kind,
        language,
        codec: track.codec.clone(),
        action: if keep { TrackAction::Keep } else { TrackAction::Drop },
        set_default: false,
        set_forced: track.is_forced,
        set_original: keep && original,
        set_hearing_impaired: track.is_hearing_impaired,
        new_title: None,
    }
}

/// An empty allow-list allows everything.
fn is_allowed(allowed: &BTreeSet<String>, language: &str) -> bool {
    allowed.is_empty() || allowed.contains(language)
}

/// Keep only the lowest-index subtitle per `(language, forced)` group.
///
/// A forced track never duplicates a non-forced one of the same language.
fn drop_duplicate_subtitles(decisions: &mut [TrackDecision]) {
    let mut seen: HashSet<(String, bool)> = HashSet::new();

    for decision in decisions
        .iter_mut()
        .filter(|d| d.kind == TrackKind::Subtitle && d.is_kept())
    {
        let key = (decision.language.clone(), decision.set_forced);
        if !seen.insert(key) {
            tracing::debug!(
                "Dropping duplicate subtitle track {} [{}]",
                decision.track_index,
                decision.language
            );
            decision.action = TrackAction::Drop;
            decision.set_original = false;
        }
    }
}

/// Mark at most one kept track of `kind` as default: the first in the
/// preferred language, else the first kept one. Forced subtitles are skipped.
fn assign_default(decisions: &mut [TrackDecision], kind: TrackKind, preferred: &str) {
    let eligible = |d: &TrackDecision| {
        d.kind == kind && d.is_kept() && !(kind == TrackKind::Subtitle && d.set_forced)
    };

    let chosen = decisions
        .iter()
        .position(|d| eligible(d) && d.language == preferred)
        .or_else(|| decisions.iter().position(|d| eligible(d)));

    if let Some(idx) = chosen {
        decisions[idx].set_default = true;
    }
}

/// Replacement name for a kept track, or `None` to keep the source name.
fn cleaned_title(track: &Track, language: &str) -> Option<String> {
    let current = track.title.as_deref().map(str::trim).unwrap_or_default();
    if !is_boilerplate_title(current, &track.codec) {
        return None;
    }

    let mut title = language_name(language);
    if track.kind == TrackKind::Subtitle {
        if track.is_forced {
            title.push_str(" (Forced)");
        } else if track.is_hearing_impaired {
            title.push_str(" (SDH)");
        }
    }
    Some(title)
}

/// Empty, the codec name, or a known encoder string.
pub fn is_boilerplate_title(title: &str, codec: &str) -> bool {
    let title = title.trim();
    title.is_empty() || title.eq_ignore_ascii_case(codec.trim()) || BOILERPLATE_TITLE_RE.is_match(title)
}
