//! Settings resolution: CLI flags > environment > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use pedantix_core::{GameConfig, Language, WinPolicy};
use pedantix_wiki::WikiConfig;

use crate::Args;

/// Everything the game loop needs, resolved from all sources.
#[derive(Debug)]
pub struct Settings {
    pub language: Option<Language>,
    pub vectors: PathBuf,
    pub words: Option<PathBuf>,
    pub game: GameConfig,
    pub wiki: WikiConfig,
}

impl Settings {
    /// Resolve settings. `env` looks up environment variables.
    pub fn resolve(args: &Args, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let language = match args
            .language
            .clone()
            .or_else(|| env("PEDANTIX_LANG"))
        {
            Some(code) => Some(code.parse::<Language>()?),
            None => None,
        };

        let Some(vectors) = args
            .vectors
            .clone()
            .or_else(|| env("PEDANTIX_VECTORS").map(PathBuf::from))
        else {
            bail!("no word vectors given: pass --vectors PATH or set PEDANTIX_VECTORS");
        };
        if !vectors.exists() {
            bail!("word vector file not found: {}", vectors.display());
        }

        let words = args
            .words
            .clone()
            .or_else(|| env("PEDANTIX_WORDS").map(PathBuf::from));

        let config_path = args
            .config
            .clone()
            .or_else(|| env("PEDANTIX_CONFIG").map(PathBuf::from));
        let mut game = load_game_config(config_path.as_deref())?;
        apply_env(&mut game, &env)?;
        if let Some(n) = args.candidates {
            game.candidate_count = n;
        }
        game.validate()?;

        let mut wiki = WikiConfig::default();
        if let Some(agent) = env("PEDANTIX_USER_AGENT") {
            wiki.user_agent = agent;
        }
        if let Some(secs) = env("PEDANTIX_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("PEDANTIX_TIMEOUT: invalid seconds {secs:?}"))?;
            wiki.timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            language,
            vectors,
            words,
            game,
            wiki,
        })
    }
}

/// Config file if one was given, else the user config file if present,
/// else defaults.
fn load_game_config(explicit: Option<&Path>) -> anyhow::Result<GameConfig> {
    if let Some(path) = explicit {
        return GameConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()));
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "using user config");
            GameConfig::load(&path)
                .with_context(|| format!("cannot load config {}", path.display()))
        }
        _ => Ok(GameConfig::default()),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pedantix").join("config.toml"))
}

fn apply_env(config: &mut GameConfig, env: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
    if let Some(v) = env("PEDANTIX_CANDIDATES") {
        config.candidate_count = parse_var("PEDANTIX_CANDIDATES", &v)?;
    }
    if let Some(v) = env("PEDANTIX_MIN_WORDS") {
        config.min_words = parse_var("PEDANTIX_MIN_WORDS", &v)?;
    }
    if let Some(v) = env("PEDANTIX_THRESHOLD") {
        let threshold: f32 = parse_var("PEDANTIX_THRESHOLD", &v)?;
        for &language in Language::all() {
            config.profile_mut(language).similarity_threshold = threshold;
        }
    }
    if let Some(v) = env("PEDANTIX_WIN_POLICY") {
        config.win_policy = match v.trim() {
            "title_words" => WinPolicy::TitleWords,
            "title_words_or_full_title" => WinPolicy::TitleWordsOrFullTitle,
            other => bail!("PEDANTIX_WIN_POLICY: unknown policy {other:?}"),
        };
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> anyhow::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{name}: invalid value {value:?}"))
}
