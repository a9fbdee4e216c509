//! Parse command implementation.
//!
//! Shows what the filename parser extracts and the resulting output name.

use crate::core::parser;
use crate::generators::filename;
use colored::Colorize;

/// Print the parse result for each filename.
pub fn parse_filenames(filenames: &[String]) {
    for (i, name) in filenames.iter().enumerate() {
        if i > 0 {
            println!();
        }

        let parsed = parser::parse(name);
        println!("{}", name.bold());
        println!("  {} {}", "Title:".bold(), parsed.series_title);

        if let Some(tag) = parsed.season_episode_tag() {
            println!("  {} {}", "Episode:".bold(), tag);
        }
        if let Some(last) = parsed.last_episode {
            println!("  {} {}", "Last episode:".bold(), last);
        }
        if let Some(ref ep_title) = parsed.episode_title {
            println!("  {} {}", "Episode title:".bold(), ep_title);
        }
        if let Some(year) = parsed.year {
            println!("  {} {}", "Year:".bold(), year);
        }
        if !parsed.quality_tags.is_empty() {
            println!(
                "  {} {}",
                "Quality:".bold(),
                parsed.quality_tags.join(", ").dimmed()
            );
        }
        println!(
            "  {} {}",
            "Type:".bold(),
            if parsed.is_movie { "movie" } else { "episode" }
        );
        println!(
            "  {} {}",
            "Output:".bold(),
            filename::generate_output_filename(&parsed).green()
        );
    }
}
