// File: src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ImeError, Result};

const CONFIG_ENV: &str = "NEPALI_TYPER_CONFIG";
const APP_DIR: &str = "nepali-typer";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ImeConfig {
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub predictions: PredictionConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl ImeConfig {
    /// Loads the config file if one exists, otherwise returns the defaults.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            return Self::from_file(&config_path);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let parsed: ImeConfig = toml::from_str(raw)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.suggestions.max_display == 0 {
            return Err(invalid("suggestions.max_display", "must be at least 1"));
        }
        if self.predictions.max_display == 0 {
            return Err(invalid("predictions.max_display", "must be at least 1"));
        }
        let learning = &self.learning;
        if learning.trim_to == 0 {
            return Err(invalid("learning.trim_to", "must be at least 1"));
        }
        if learning.trim_to > learning.max_entries {
            return Err(invalid(
                "learning.trim_to",
                format!("{} exceeds max_entries {}", learning.trim_to, learning.max_entries),
            ));
        }
        if learning.frequency_cap == 0 {
            return Err(invalid("learning.frequency_cap", "must be at least 1"));
        }
        if learning.max_word_chars == 0 {
            return Err(invalid("learning.max_word_chars", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ImeError {
    ImeError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Some(base) = dirs::config_dir() {
        return base.join(APP_DIR).join("config.toml");
    }

    PathBuf::from("nepali-typer.toml")
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SuggestionConfig {
    #[serde(default = "default_suggestion_display")]
    pub max_display: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_display: default_suggestion_display(),
        }
    }
}

fn default_suggestion_display() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PredictionConfig {
    #[serde(default = "default_prediction_display")]
    pub max_display: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_display: default_prediction_display(),
        }
    }
}

fn default_prediction_display() -> usize {
    3
}

/// Bounds of the personal lexicon.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LearningConfig {
    /// Soft capacity; exceeding it triggers a trim on the next save.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Entry count kept after a trim.
    #[serde(default = "default_trim_to")]
    pub trim_to: usize,
    #[serde(default = "default_frequency_cap")]
    pub frequency_cap: u32,
    #[serde(default = "default_max_word_chars")]
    pub max_word_chars: usize,
    #[serde(default = "default_top_words_display")]
    pub top_words_display: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            trim_to: default_trim_to(),
            frequency_cap: default_frequency_cap(),
            max_word_chars: default_max_word_chars(),
            top_words_display: default_top_words_display(),
        }
    }
}

fn default_max_entries() -> usize {
    200
}

fn default_trim_to() -> usize {
    150
}

fn default_frequency_cap() -> u32 {
    1000
}

fn default_max_word_chars() -> usize {
    30
}

fn default_top_words_display() -> usize {
    5
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Json,
    Bincode,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: SnapshotFormat,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            format: SnapshotFormat::default(),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("user_dictionary.json")
}
