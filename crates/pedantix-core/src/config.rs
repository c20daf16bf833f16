//! Game configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```toml
//! candidate_count = 40
//! win_policy = "title_words_or_full_title"
//!
//! [languages.en]
//! similarity_threshold = 0.5
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::similarity::SimilarityScorer;

/// Languages the game can be played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[Language::En, Language::Fr]
    }

    /// Wikipedia language code.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Name of the language in that language.
    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "Français",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(ConfigError::Invalid(format!(
                "unsupported language {other:?} (expected \"en\" or \"fr\")"
            ))),
        }
    }
}

/// Per-language tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageProfile {
    /// Similarity a guess must exceed to be shown on a hidden word.
    pub similarity_threshold: f32,
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.4,
        }
    }
}

/// Profiles for both supported languages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageProfiles {
    pub en: LanguageProfile,
    pub fr: LanguageProfile,
}

/// When a game counts as won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinPolicy {
    /// Every word of the title must be revealed.
    #[default]
    TitleWords,
    /// As above, and guessing the whole title at once reveals all of it.
    TitleWordsOrFullTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Random articles fetched per game; the most viewed one is played.
    pub candidate_count: usize,
    /// Trailing window for page view counts.
    pub popularity_window_days: u32,
    /// Articles with fewer words are rejected.
    pub min_words: usize,
    /// Candidate fetches in flight at once.
    pub max_concurrent_fetches: usize,
    /// Width of the numeric similarity kernel.
    pub numeric_sigma: f64,
    /// Minimum ratio for a "did you mean" suggestion.
    pub suggestion_cutoff: f64,
    pub win_policy: WinPolicy,
    /// How many articles a front-end tries before giving up.
    pub load_attempts: usize,
    pub languages: LanguageProfiles,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            candidate_count: 100,
            popularity_window_days: 30,
            min_words: 250,
            max_concurrent_fetches: 100,
            numeric_sigma: 5.0,
            suggestion_cutoff: 0.7,
            win_policy: WinPolicy::TitleWords,
            load_attempts: 3,
            languages: LanguageProfiles::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn profile(&self, language: Language) -> &LanguageProfile {
        match language {
            Language::En => &self.languages.en,
            Language::Fr => &self.languages.fr,
        }
    }

    pub fn profile_mut(&mut self, language: Language) -> &mut LanguageProfile {
        match language {
            Language::En => &mut self.languages.en,
            Language::Fr => &mut self.languages.fr,
        }
    }

    /// Scorer tuned for `language`.
    pub fn scorer(&self, language: Language) -> SimilarityScorer {
        SimilarityScorer::new(
            self.profile(language).similarity_threshold,
            self.numeric_sigma,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("candidate_count", self.candidate_count),
            ("max_concurrent_fetches", self.max_concurrent_fetches),
            ("load_attempts", self.load_attempts),
            ("popularity_window_days", self.popularity_window_days as usize),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }

        if !(self.numeric_sigma.is_finite() && self.numeric_sigma > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "numeric_sigma must be positive, got {}",
                self.numeric_sigma
            )));
        }
        if !(0.0..=1.0).contains(&self.suggestion_cutoff) {
            return Err(ConfigError::Invalid(format!(
                "suggestion_cutoff must be within [0, 1], got {}",
                self.suggestion_cutoff
            )));
        }
        for &language in Language::all() {
            let threshold = self.profile(language).similarity_threshold;
            if !(0.0..1.0).contains(&threshold) {
                return Err(ConfigError::Invalid(format!(
                    "languages.{language}.similarity_threshold must be within [0, 1), got {threshold}"
                )));
            }
        }
        Ok(())
    }
}
