use std::io::{self, Write};

use owo_colors::OwoColorize;
use pedantix_core::tokenize::slice_chars;
use pedantix_core::{FeedbackSummary, LoadProgress, RevealState, Token, Verdict};

const MASK: char = '█';

#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(self) -> bool {
        self.0
    }
}

/// How a hidden word is displayed.
#[derive(Debug, Clone, PartialEq)]
enum Cell<'a> {
    /// Found by the player.
    Revealed(&'a str),
    /// Shown because the game ended.
    Unveiled(&'a str),
    /// Still hidden; closest guess so far.
    Hint(&'a str, f32),
    Hidden(usize),
}

fn cell<'a>(token: &'a Token, state: &RevealState) -> Cell<'a> {
    if state.is_visible(token) {
        if state.is_revealed(&token.key) {
            Cell::Revealed(&token.surface)
        } else {
            Cell::Unveiled(&token.surface)
        }
    } else if let Some(guess) = token.best_guess() {
        Cell::Hint(guess, token.best_similarity())
    } else {
        Cell::Hidden(token.char_len())
    }
}

fn paint(cell: &Cell, color: ColorMode) -> String {
    match (cell, color.enabled()) {
        (Cell::Revealed(s), true) => s.green().to_string(),
        (Cell::Unveiled(s), true) => s.yellow().to_string(),
        (Cell::Revealed(s) | Cell::Unveiled(s), false) => s.to_string(),
        (Cell::Hint(g, sim), true) if *sim >= 0.8 => g.on_red().to_string(),
        (Cell::Hint(g, sim), true) if *sim >= 0.6 => g.on_bright_red().to_string(),
        (Cell::Hint(g, _), true) => g.on_bright_black().to_string(),
        (Cell::Hint(g, _), false) => format!("[{g}]"),
        (Cell::Hidden(n), _) => MASK.to_string().repeat(*n),
    }
}

/// `text` with every token replaced by its current display.
///
/// Text between tokens (spaces, punctuation) is kept as is.
pub fn render(text: &str, tokens: &[Token], state: &RevealState, color: ColorMode) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for token in tokens {
        out.push_str(slice_chars(text, cursor, token.start));
        out.push_str(&paint(&cell(token, state), color));
        cursor = token.end.max(cursor);
    }
    out.push_str(slice_chars(text, cursor, usize::MAX));
    out
}

pub fn print_board(
    w: &mut dyn Write,
    title: &str,
    text: &str,
    state: &RevealState,
    color: ColorMode,
) -> io::Result<()> {
    let heading = render(title, state.title_tokens(), state, color);
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{heading}")?;
    }
    writeln!(w)?;
    writeln!(w, "{}", render(text, state.tokens(), state, color))?;
    writeln!(w)?;
    Ok(())
}

pub fn print_feedback(
    w: &mut dyn Write,
    summary: &FeedbackSummary,
    state: &RevealState,
    color: ColorMode,
) -> io::Result<()> {
    let progress = state.progress();
    let line = match summary.verdict() {
        Verdict::Found => format!(
            "\"{}\": {} occurrence(s), {} new word(s)",
            summary.guess, summary.exact_matches, summary.newly_revealed
        ),
        Verdict::Close => format!(
            "\"{}\": not in the article, closest guess for {} word(s)",
            summary.guess, summary.closest
        ),
        Verdict::Miss => format!("\"{}\": not in the article", summary.guess),
    };

    if color.enabled() {
        match summary.verdict() {
            Verdict::Found => writeln!(w, "{}", line.green())?,
            Verdict::Close => writeln!(w, "{}", line.yellow())?,
            Verdict::Miss => writeln!(w, "{}", line.red())?,
        }
    } else {
        writeln!(w, "{line}")?;
    }
    if summary.repeated {
        writeln!(w, "(already guessed)")?;
    }
    writeln!(
        w,
        "Guesses: {}  Words found: {}/{} ({:.0}%)",
        state.guess_history().len(),
        progress.revealed,
        progress.total,
        progress.ratio() * 100.0
    )?;
    Ok(())
}

pub fn print_victory(
    w: &mut dyn Write,
    title: &str,
    url: &str,
    state: &RevealState,
    color: ColorMode,
) -> io::Result<()> {
    let msg = format!(
        "Found \"{}\" in {} guesses!",
        title,
        state.guess_history().len()
    );
    if color.enabled() {
        writeln!(w, "{}", msg.green().bold())?;
    } else {
        writeln!(w, "{msg}")?;
    }
    writeln!(w, "{url}")?;
    writeln!(w, "Type :new for another article, :lang to switch language, :quit to leave.")?;
    Ok(())
}

pub fn describe_progress(event: &LoadProgress) -> String {
    match event {
        LoadProgress::SelectingArticle { candidates } => {
            format!("Ranking {candidates} random articles...")
        }
        LoadProgress::FetchingArticle { title } => format!("Fetching \"{title}\"..."),
        LoadProgress::PreparingTokens { words } => format!("Preparing {words} words..."),
        LoadProgress::Ready { .. } => "Ready".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedantix_core::{
        Article, EmbedError, Embedder, GameConfig, GuessEvaluator, Language, LoadedGame, Session,
        SimilarityScorer, WinPolicy, tokenize,
    };
    use std::sync::Arc;

    struct Axis;

    impl Embedder for Axis {
        fn dimension(&self) -> usize {
            2
        }

        fn embed(&self, token: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(match token.to_lowercase().as_str() {
                "noir" => vec![0.0, 1.0],
                "sombre" => vec![0.1, 1.0],
                "chat" => vec![1.0, 0.0],
                _ => vec![0.0, 0.0],
            })
        }
    }

    fn game(text: &str, title: &str) -> RevealState {
        RevealState::new(tokenize(text, &Axis), tokenize(title, &Axis))
    }

    const PLAIN: ColorMode = ColorMode(false);

    #[test]
    fn hidden_words_are_masked_by_length() {
        let state = game("Le chat, noir.", "Chat");
        assert_eq!(render("Le chat, noir.", state.tokens(), &state, PLAIN), "██ ████, ████.");
    }

    #[test]
    fn revealed_words_and_hints() {
        let text = "Le chat, noir.";
        let mut state = game(text, "Chat");
        let eval = GuessEvaluator::new(&Axis, SimilarityScorer::new(0.4, 5.0), WinPolicy::TitleWords);
        eval.evaluate(&mut state, "le");
        eval.evaluate(&mut state, "sombre");
        assert_eq!(render(text, state.tokens(), &state, PLAIN), "Le ████, [sombre].");
    }

    #[test]
    fn multibyte_text_keeps_alignment() {
        let text = "L'été à Zürich";
        let state = game(text, "Zürich");
        assert_eq!(render(text, state.tokens(), &state, PLAIN), "█'███ █ ██████");
    }

    #[test]
    fn won_game_unveils_remaining_words() {
        let text = "Le chat noir.";
        let mut session = Session::new(GameConfig::default(), Arc::new(Axis));
        session.begin(
            Language::Fr,
            LoadedGame {
                article: Article {
                    title: "Chat".to_string(),
                    text: text.to_string(),
                    url: String::new(),
                },
                state: game(text, "Chat"),
            },
        );
        assert!(session.guess("chat").unwrap().won);
        let state = session.state().unwrap();
        assert!(state.tokens().iter().all(|t| state.is_visible(t)));
        assert_eq!(render(text, state.tokens(), state, PLAIN), text);
    }

    #[test]
    fn feedback_mentions_counts() {
        let mut state = game("Le chat noir.", "Chat");
        let eval = GuessEvaluator::new(&Axis, SimilarityScorer::new(0.4, 5.0), WinPolicy::TitleWords);
        let summary = eval.evaluate(&mut state, "noir").unwrap();
        let mut out = Vec::new();
        print_feedback(&mut out, &summary, &state, PLAIN).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\"noir\": 1 occurrence(s), 1 new word(s)"), "{out}");
        assert!(out.contains("Words found: 1/3"), "{out}");
    }
}
