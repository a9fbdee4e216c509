//! Integration tests for track selection.
//!
//! Tests cover:
//! - Language allow-lists (including "allow all")
//! - Subtitle de-duplication
//! - Default track assignment
//! - Track name cleanup

use mkv_cleaner::core::selector::select;
use mkv_cleaner::models::config::LanguagePreferences;
use mkv_cleaner::models::media::{Track, TrackKind};
use mkv_cleaner::models::plan::{TrackAction, TrackDecision};

fn prefs(audio: &[&str], subs: &[&str], default_audio: &str, default_sub: &str) -> LanguagePreferences {
    LanguagePreferences {
        allowed_audio: audio.iter().map(|s| s.to_string()).collect(),
        allowed_subtitle: subs.iter().map(|s| s.to_string()).collect(),
        default_audio: default_audio.to_string(),
        default_subtitle: default_sub.to_string(),
        original_audio: None,
        original_subtitle: None,
    }
}

fn decision(decisions: &[TrackDecision], index: u32) -> &TrackDecision {
    decisions
        .iter()
        .find(|d| d.track_index == index)
        .unwrap_or_else(|| panic!("no decision for track {}", index))
}

fn defaults(decisions: &[TrackDecision], kind: TrackKind) -> usize {
    decisions
        .iter()
        .filter(|d| d.kind == kind && d.set_default)
        .count()
}

fn anime_tracks() -> Vec<Track> {
    vec![
        Track::new(0, TrackKind::Video, "und", "HEVC"),
        Track::new(1, TrackKind::Audio, "jpn", "FLAC"),
        Track::new(2, TrackKind::Audio, "eng", "AAC"),
        Track::new(3, TrackKind::Audio, "ger", "AAC"),
        Track::new(4, TrackKind::Subtitle, "eng", "SubStationAlpha").forced(),
        Track::new(5, TrackKind::Subtitle, "eng", "SubStationAlpha"),
        Track::new(6, TrackKind::Subtitle, "spa", "SubStationAlpha"),
    ]
}

#[test]
fn test_video_always_kept() {
    let tracks = vec![Track::new(0, TrackKind::Video, "fre", "AVC")];
    let decisions = select(&tracks, &prefs(&["eng"], &["eng"], "eng", "eng"));

    assert_eq!(decisions[0].action, TrackAction::Keep);
    assert!(!decisions[0].set_default);
    assert_eq!(decisions[0].new_title, None);
}

#[test]
fn test_audio_filtered_by_language() {
    let decisions = select(&anime_tracks(), &prefs(&["jpn", "eng"], &["eng"], "jpn", "eng"));

    assert_eq!(decision(&decisions, 1).action, TrackAction::Keep);
    assert_eq!(decision(&decisions, 2).action, TrackAction::Keep);
    assert_eq!(decision(&decisions, 3).action, TrackAction::Drop);
    assert!(decision(&decisions, 1).set_default);
    assert!(!decision(&decisions, 2).set_default);
}

#[test]
fn test_empty_allow_list_keeps_all_audio() {
    let decisions = select(&anime_tracks(), &prefs(&[], &[], "eng", "eng"));

    for index in 1..=3 {
        assert_eq!(decision(&decisions, index).action, TrackAction::Keep);
    }
    assert!(decision(&decisions, 2).set_default);
}

#[test]
fn test_default_falls_back_to_first_kept() {
    let decisions = select(&anime_tracks(), &prefs(&["jpn", "ger"], &["spa"], "eng", "eng"));

    assert!(decision(&decisions, 1).set_default);
    assert!(!decision(&decisions, 3).set_default);
    assert!(decision(&decisions, 6).set_default);
}

#[test]
fn test_no_default_without_kept_tracks() {
    let decisions = select(&anime_tracks(), &prefs(&["kor"], &["kor"], "kor", "kor"));

    assert_eq!(defaults(&decisions, TrackKind::Audio), 0);
    assert_eq!(defaults(&decisions, TrackKind::Subtitle), 0);
    assert_eq!(decision(&decisions, 0).action, TrackAction::Keep);
}

#[test]
fn test_duplicate_subtitles_keep_lowest_index() {
    let tracks = vec![
        Track::new(3, TrackKind::Subtitle, "eng", "SubRip/SRT"),
        Track::new(7, TrackKind::Subtitle, "eng", "SubRip/SRT"),
    ];
    let decisions = select(&tracks, &prefs(&["eng"], &["eng"], "eng", "eng"));

    assert_eq!(decision(&decisions, 3).action, TrackAction::Keep);
    assert_eq!(decision(&decisions, 7).action, TrackAction::Drop);
}

#[test]
fn test_forced_and_regular_subtitles_both_kept() {
    let tracks = vec![
        Track::new(2, TrackKind::Subtitle, "eng", "SubRip/SRT").forced(),
        Track::new(3, TrackKind::Subtitle, "eng", "SubRip/SRT"),
    ];
    let decisions = select(&tracks, &prefs(&["eng"], &["eng"], "eng", "eng"));

    assert_eq!(decision(&decisions, 2).action, TrackAction::Keep);
    assert_eq!(decision(&decisions, 3).action, TrackAction::Keep);
    assert!(decision(&decisions, 2).set_forced);
    assert!(!decision(&decisions, 3).set_forced);
    // Forced tracks are never the default.
    assert!(!decision(&decisions, 2).set_default);
    assert!(decision(&decisions, 3).set_default);
}

#[test]
fn test_only_forced_subtitles_get_no_default() {
    let tracks = vec![Track::new(2, TrackKind::Subtitle, "eng", "SubRip/SRT").forced()];
    let decisions = select(&tracks, &LanguagePreferences::default());

    assert_eq!(decisions[0].action, TrackAction::Keep);
    assert!(!decisions[0].set_default);
}

#[test]
fn test_at_most_one_default_per_kind() {
    let mut tracks = anime_tracks();
    for track in &mut tracks {
        track.is_default = true;
    }
    tracks.push(Track::new(8, TrackKind::Audio, "jpn", "AC-3"));

    for p in [
        prefs(&[], &[], "jpn", "eng"),
        prefs(&["jpn"], &["eng", "spa"], "eng", "spa"),
        LanguagePreferences::allow_all(),
    ] {
        let decisions = select(&tracks, &p);
        assert!(defaults(&decisions, TrackKind::Audio) <= 1);
        assert!(defaults(&decisions, TrackKind::Subtitle) <= 1);
        assert_eq!(defaults(&decisions, TrackKind::Video), 0);
    }
}

#[test]
fn test_language_aliases() {
    let tracks = vec![
        Track::new(1, TrackKind::Audio, "deu", "AAC"),
        Track::new(2, TrackKind::Audio, "en", "AAC"),
    ];
    let decisions = select(&tracks, &prefs(&["ger", "eng"], &[], "de", "eng"));

    assert_eq!(decision(&decisions, 1).action, TrackAction::Keep);
    assert_eq!(decision(&decisions, 1).language, "ger");
    assert_eq!(decision(&decisions, 2).language, "eng");
    assert!(decision(&decisions, 1).set_default);
}

#[test]
fn test_boilerplate_titles_replaced() {
    let tracks = vec![
        Track::new(1, TrackKind::Audio, "eng", "AAC").with_title("AAC"),
        Track::new(2, TrackKind::Audio, "jpn", "FLAC").with_title("Director's Commentary"),
        Track::new(3, TrackKind::Subtitle, "eng", "SubRip/SRT"),
    ];
    let decisions = select(&tracks, &LanguagePreferences::allow_all());

    assert_eq!(decision(&decisions, 1).new_title.as_deref(), Some("English"));
    assert_eq!(decision(&decisions, 2).new_title, None);
    assert_eq!(decision(&decisions, 3).new_title.as_deref(), Some("English"));
}

#[test]
fn test_original_language_flag() {
    let mut p = LanguagePreferences::allow_all();
    p.original_audio = Some("jpn".to_string());
    let decisions = select(&anime_tracks(), &p);

    assert!(decision(&decisions, 1).set_original);
    assert!(!decision(&decisions, 2).set_original);
}

#[test]
fn test_empty_track_list() {
    assert!(select(&[], &LanguagePreferences::default()).is_empty());
}

#[test]
fn test_deterministic_and_ordered() {
    let mut shuffled = anime_tracks();
    shuffled.reverse();
    let p = prefs(&["jpn", "eng"], &["eng"], "jpn", "eng");

    let a = select(&anime_tracks(), &p);
    let b = select(&shuffled, &p);
    assert_eq!(a, b);

    let indices: Vec<u32> = a.iter().map(|d| d.track_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
}
