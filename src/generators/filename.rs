//! Output filename generator.

use crate::models::media::ParsedName;

/// Container extension of every output file.
pub const OUTPUT_EXTENSION: &str = "mkv";

/// Generate the output name without extension. Also used as the MKV title.
///
/// Format:
/// - `{title} - S{season:02}E{episode:02} - {episodeTitle}`
/// - `{title} - S{season:02}E{episode:02} - Episode #{season}.{episode}` (no episode title)
/// - `{title} ({year})` or `{title}` (movies)
pub fn generate_output_stem(parsed: &ParsedName) -> String {
    let title = sanitize_filename(&parsed.series_title);

    match (parsed.season, parsed.episode) {
        (Some(season), Some(episode)) if !parsed.is_movie => {
            let tag = format!("S{:02}E{}", season, episode.padded());
            match parsed.episode_title.as_deref().filter(|t| !t.trim().is_empty()) {
                Some(episode_title) => {
                    format!("{} - {} - {}", title, tag, sanitize_filename(episode_title))
                }
                None => format!("{} - {} - Episode #{}.{}", title, tag, season, episode),
            }
        }
        _ => match parsed.year {
            Some(year) => format!("{} ({})", title, year),
            None => title,
        },
    }
}

/// Generate the full output filename (`.mkv` appended).
pub fn generate_output_filename(parsed: &ParsedName) -> String {
    format!("{}.{}", generate_output_stem(parsed), OUTPUT_EXTENSION)
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
