//! Configuration model.

use super::plan::SubtitleFormat;
use crate::utils::language::canonical_language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language preferences for track selection.
    pub languages: LanguagePreferences,
    /// Subtitle handling.
    pub subtitles: SubtitleSettings,
    /// Tool and folder paths.
    pub paths: PathsConfig,
}

/// Which languages to keep and which to flag as default.
///
/// An empty allow-set means "allow all".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagePreferences {
    /// Audio languages to keep.
    pub allowed_audio: BTreeSet<String>,
    /// Subtitle languages to keep.
    pub allowed_subtitle: BTreeSet<String>,
    /// Preferred default audio language.
    pub default_audio: String,
    /// Preferred default subtitle language.
    pub default_subtitle: String,
    /// Language of the original audio, flagged with `--original-flag`.
    pub original_audio: Option<String>,
    /// Language of the original subtitles, flagged with `--original-flag`.
    pub original_subtitle: Option<String>,
}

impl Default for LanguagePreferences {
    fn default() -> Self {
        Self {
            allowed_audio: BTreeSet::from(["eng".to_string()]),
            allowed_subtitle: BTreeSet::from(["eng".to_string()]),
            default_audio: "eng".to_string(),
            default_subtitle: "eng".to_string(),
            original_audio: None,
            original_subtitle: None,
        }
    }
}

impl LanguagePreferences {
    /// Preferences that keep every track.
    pub fn allow_all() -> Self {
        Self {
            allowed_audio: BTreeSet::new(),
            allowed_subtitle: BTreeSet::new(),
            ..Self::default()
        }
    }

    /// Copy with every code canonicalized (`deu` -> `ger`, `en` -> `eng`, ...).
    pub fn canonicalized(&self) -> Self {
        let canon = |set: &BTreeSet<String>| set.iter().map(|l| canonical_language(l)).collect();
        Self {
            allowed_audio: canon(&self.allowed_audio),
            allowed_subtitle: canon(&self.allowed_subtitle),
            default_audio: canonical_language(&self.default_audio),
            default_subtitle: canonical_language(&self.default_subtitle),
            original_audio: self.original_audio.as_deref().map(canonical_language),
            original_subtitle: self.original_subtitle.as_deref().map(canonical_language),
        }
    }
}

/// Subtitle handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Target format for text subtitles. `None` keeps source formats.
    pub convert_to: Option<SubtitleFormat>,
}

/// Tool and folder paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// mkvmerge executable.
    pub mkvmerge_path: PathBuf,
    /// Output folder. `None` writes to `<input dir>/processed`.
    pub output_folder: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mkvmerge_path: PathBuf::from("mkvmerge"),
            output_folder: None,
        }
    }
}

/// Name of the default output subfolder next to the input files.
pub const PROCESSED_DIR_NAME: &str = "processed";

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mkv_cleaner")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from a specific file.
pub fn load_config_from(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| crate::Error::InvalidConfig(format!("{}: {}", path.display(), e)))
}

/// Load configuration from the given file or the default location.
///
/// Falls back to defaults when the file is missing or invalid.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        tracing::debug!("No config at {}, using defaults", config_path.display());
        return Config::default();
    }

    match load_config_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [languages]
            allowed_audio = ["jpn", "eng"]
            default_audio = "jpn"

            [subtitles]
            convert_to = "srt"
            "#,
        )
        .unwrap();

        assert!(config.languages.allowed_audio.contains("jpn"));
        assert_eq!(config.languages.default_audio, "jpn");
        assert_eq!(config.languages.default_subtitle, "eng");
        assert_eq!(config.subtitles.convert_to, Some(SubtitleFormat::Srt));
        assert_eq!(config.paths.mkvmerge_path, PathBuf::from("mkvmerge"));
    }

    #[test]
    fn test_canonicalized_preferences() {
        let prefs = LanguagePreferences {
            allowed_audio: BTreeSet::from(["deu".to_string(), "en".to_string()]),
            default_audio: "DEU".to_string(),
            ..Default::default()
        };
        let canon = prefs.canonicalized();
        assert!(canon.allowed_audio.contains("ger"));
        assert!(canon.allowed_audio.contains("eng"));
        assert_eq!(canon.default_audio, "ger");
    }

    #[test]
    fn test_invalid_config_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "languages = 5").unwrap();

        assert!(load_config_from(&path).is_err());
        // The lenient loader falls back to defaults
        assert_eq!(load_config(Some(&path)).languages, LanguagePreferences::default());
    }
}
