use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pedantix_core::{
    ArticleSource, Embedder, Language, Phase, Session, TextExtractor, Verdict, Vocabulary,
};
use pedantix_wiki::{WikiExtractor, WikipediaClient};
use tracing_subscriber::EnvFilter;

mod output;
mod settings;
mod vectors;

use output::ColorMode;
use settings::Settings;
use vectors::KeyedVectors;

/// Pedantix - guess the hidden Wikipedia article word by word
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Args {
    /// Game language ("en" or "fr"); asked interactively when omitted
    language: Option<String>,

    /// Word vector file (fastText/word2vec text format)
    #[arg(long)]
    vectors: Option<PathBuf>,

    /// Word list used for "did you mean" suggestions
    #[arg(long)]
    words: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random articles ranked per game
    #[arg(long)]
    candidates: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

enum Command {
    Quit,
    NewArticle,
    ChangeLanguage,
    Guess(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "" => None,
        ":quit" | ":q" => Some(Command::Quit),
        ":new" => Some(Command::NewArticle),
        ":lang" => Some(Command::ChangeLanguage),
        _ => Some(Command::Guess(line.to_string())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::resolve(&args, |k| std::env::var(k).ok())?;
    let color = ColorMode(!args.no_color);

    let spinner = spinner();
    spinner.set_message(format!("Loading word vectors from {}...", settings.vectors.display()));
    let path = settings.vectors.clone();
    let vectors = tokio::task::spawn_blocking(move || KeyedVectors::load(&path)).await??;
    spinner.finish_and_clear();
    if vectors.is_empty() {
        anyhow::bail!("no word vectors in {}", settings.vectors.display());
    }
    tracing::debug!(words = vectors.len(), "vectors ready");
    let embedder: Arc<dyn Embedder> = Arc::new(vectors);

    let vocabulary = settings
        .words
        .as_deref()
        .map(Vocabulary::from_file)
        .transpose()?;

    let source: Arc<dyn ArticleSource> = Arc::new(WikipediaClient::new(settings.wiki)?);
    let extractor = WikiExtractor::default();
    let mut session = Session::new(settings.game, embedder);

    let mut stdout = io::stdout();
    let mut lines = io::stdin().lock().lines();
    let mut language = settings.language;

    'game: loop {
        let lang = match language {
            Some(lang) => lang,
            None => match ask_language(&mut stdout, &mut lines)? {
                Some(lang) => lang,
                None => break,
            },
        };

        if !start_game(&mut session, lang, &source, &extractor, color, &mut stdout).await? {
            language = None;
            continue;
        }
        language = Some(lang);
        show_board(&mut stdout, &session, color)?;

        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;
            let Some(line) = lines.next().transpose()? else {
                break 'game;
            };
            let Some(command) = parse_command(&line) else {
                continue;
            };

            match command {
                Command::Quit => break 'game,
                Command::NewArticle => continue 'game,
                Command::ChangeLanguage => {
                    session.reset();
                    language = None;
                    continue 'game;
                }
                Command::Guess(raw) => {
                    if session.phase() == Phase::Won {
                        writeln!(stdout, "The game is over. Type :new, :lang or :quit.")?;
                        continue;
                    }
                    handle_guess(&mut stdout, &mut session, &raw, vocabulary.as_ref(), color)?;
                }
            }
        }
    }

    Ok(())
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn ask_language(
    out: &mut impl Write,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<Option<Language>> {
    loop {
        let choices: Vec<String> = Language::all()
            .iter()
            .map(|l| format!("{} ({})", l.code(), l.label()))
            .collect();
        write!(out, "Language [{}]: ", choices.join(", "))?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(None);
        };
        match parse_command(&line) {
            Some(Command::Quit) => return Ok(None),
            Some(Command::Guess(code)) => match code.parse::<Language>() {
                Ok(lang) => return Ok(Some(lang)),
                Err(e) => writeln!(out, "{e}")?,
            },
            _ => {}
        }
    }
}

/// Load an article, retrying unusable ones. Returns whether a game started.
async fn start_game(
    session: &mut Session,
    language: Language,
    source: &Arc<dyn ArticleSource>,
    extractor: &dyn TextExtractor,
    color: ColorMode,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let attempts = session.config().load_attempts;

    for attempt in 1..=attempts {
        let spinner = spinner();
        let result = session
            .start(language, Arc::clone(source), extractor, |event| {
                spinner.set_message(output::describe_progress(&event));
            })
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(()) => return Ok(true),
            Err(e) if e.is_retryable() && attempt < attempts => {
                tracing::info!(attempt, error = %e, "retrying with another article");
            }
            Err(e) => {
                let msg = format!("Could not load an article: {e}");
                if color.enabled() {
                    use owo_colors::OwoColorize;
                    writeln!(out, "{}", msg.red())?;
                } else {
                    writeln!(out, "{msg}")?;
                }
                return Ok(false);
            }
        }
    }
    Ok(false)
}

fn show_board(out: &mut impl Write, session: &Session, color: ColorMode) -> io::Result<()> {
    if let (Some(article), Some(state)) = (session.article(), session.state()) {
        output::print_board(out, &article.title, &article.text, state, color)?;
    }
    Ok(())
}

fn handle_guess(
    out: &mut impl Write,
    session: &mut Session,
    raw: &str,
    vocabulary: Option<&Vocabulary>,
    color: ColorMode,
) -> io::Result<()> {
    let Some(mut summary) = session.guess(raw) else {
        return Ok(());
    };

    if summary.verdict() == Verdict::Miss && !summary.repeated {
        let suggestion = vocabulary
            .and_then(|v| session.suggest(raw, v))
            .map(str::to_string);
        if let Some(word) = suggestion {
            writeln!(out, "Did you mean \"{word}\"?")?;
            if let Some(corrected) = session.guess(&word) {
                summary = corrected;
            }
        }
    }

    show_board(out, session, color)?;
    if let Some(state) = session.state() {
        output::print_feedback(out, &summary, state, color)?;
        if summary.won {
            if let Some(article) = session.article() {
                output::print_victory(out, &article.title, &article.url, state, color)?;
            }
        }
    }
    Ok(())
}
