//! Command line argument definitions.

use crate::models::config::Config;
use crate::models::plan::SubtitleFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// MKV Cleaner - Rename MKV files and strip unwanted audio/subtitle tracks
#[derive(Parser, Debug)]
#[command(name = "mkv-cleaner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Config file (default: <config dir>/mkv_cleaner/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how filenames are parsed and renamed
    Parse {
        /// Filenames to parse (the files do not need to exist)
        #[arg(value_name = "FILENAME", required = true)]
        filenames: Vec<String>,
    },

    /// Build remux plans without writing anything
    Plan {
        /// MKV file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Print plans as JSON
        #[arg(long)]
        json: bool,

        /// Save plans to a JSON file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Remux every MKV file under PATH
    Process {
        /// MKV file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command line overrides for the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Audio languages to keep (comma-separated, empty keeps all)
    #[arg(long, value_delimiter = ',', value_name = "LANGS")]
    pub audio: Option<Vec<String>>,

    /// Subtitle languages to keep (comma-separated, empty keeps all)
    #[arg(long, value_delimiter = ',', value_name = "LANGS")]
    pub subs: Option<Vec<String>>,

    /// Preferred default audio language
    #[arg(long, value_name = "LANG")]
    pub default_audio: Option<String>,

    /// Preferred default subtitle language
    #[arg(long, value_name = "LANG")]
    pub default_sub: Option<String>,

    /// Language of the original audio
    #[arg(long, value_name = "LANG")]
    pub original_audio: Option<String>,

    /// Convert text subtitles to this format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub convert_subs: Option<SubtitleFormat>,

    /// Output folder (default: processed/ next to each input)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// mkvmerge executable
    #[arg(long, value_name = "PATH")]
    pub mkvmerge: Option<PathBuf>,
}

impl Overrides {
    /// Apply the overrides on top of a loaded config.
    pub fn apply(&self, mut config: Config) -> Config {
        let to_set = |langs: &[String]| {
            langs
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()
        };

        if let Some(audio) = &self.audio {
            config.languages.allowed_audio = to_set(audio);
        }
        if let Some(subs) = &self.subs {
            config.languages.allowed_subtitle = to_set(subs);
        }
        if let Some(lang) = &self.default_audio {
            config.languages.default_audio = lang.clone();
        }
        if let Some(lang) = &self.default_sub {
            config.languages.default_subtitle = lang.clone();
        }
        if let Some(lang) = &self.original_audio {
            config.languages.original_audio = Some(lang.clone());
        }
        if let Some(format) = self.convert_subs {
            config.subtitles.convert_to = Some(format);
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_folder = Some(dir.clone());
        }
        if let Some(path) = &self.mkvmerge {
            config.paths.mkvmerge_path = path.clone();
        }
        config
    }
}
