//! Plain prose from rendered Wikipedia HTML.

use once_cell::sync::Lazy;
use pedantix_core::TextExtractor;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

/// Reference markers left in the text: `[12]`, `[citation needed]`,
/// `[réf. nécessaire]`, `[note 3]`.
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(?:\d+|citation needed|réf\. nécessaire|note \d+)\]").unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Paragraph openings of maintenance banners and hatnotes.
const BOILERPLATE_STARTS: &[&str] = &[
    "Vous lisez un",
    "Cet article est une",
    "Pour les articles",
    "modifier",
    "Cet article ne",
    "Si vous disposez",
    "Pour des articles plus généraux",
    "Pour un article plus général",
    "Cet article est orphelin",
    "Ne pas confondre avec",
    "Ne doit pas être confondu avec",
    "Cet article concerne",
    "N.B.",
    "For other uses",
    "This article is about",
    "Not to be confused with",
];

/// Keeps the first few substantial paragraphs of an article.
#[derive(Debug, Clone)]
pub struct WikiExtractor {
    max_paragraphs: usize,
    min_chars: usize,
}

impl Default for WikiExtractor {
    fn default() -> Self {
        Self {
            max_paragraphs: 4,
            min_chars: 50,
        }
    }
}

impl WikiExtractor {
    pub fn new(max_paragraphs: usize) -> Self {
        Self {
            max_paragraphs,
            ..Self::default()
        }
    }

    /// Cleaned text of every kept paragraph, in document order.
    pub fn paragraphs(&self, html: &str) -> Vec<String> {
        let document = Html::parse_fragment(html);
        let mut paragraphs = Vec::new();

        for p in document.select(&PARAGRAPH) {
            if paragraphs.len() >= self.max_paragraphs {
                break;
            }
            let text = clean(&visible_text(p));
            if text.chars().count() <= self.min_chars {
                continue;
            }
            if BOILERPLATE_STARTS.iter().any(|b| text.starts_with(b)) {
                continue;
            }
            paragraphs.push(text);
        }

        paragraphs
    }
}

impl TextExtractor for WikiExtractor {
    fn extract(&self, raw_markup: &str) -> String {
        self.paragraphs(raw_markup).join(" ")
    }
}

/// Text under `p`, leaving out footnotes, styles, scripts and citation
/// links.
fn visible_text(p: ElementRef) -> String {
    let mut out = String::new();
    for node in p.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != p.id())
            .any(|a| is_hidden(a.value()));
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

fn is_hidden(node: &Node) -> bool {
    let Some(el) = node.as_element() else {
        return false;
    };
    match el.name() {
        "sup" | "style" | "script" => true,
        "a" => el.attr("href").is_some_and(|h| h.starts_with("#cite")),
        _ => false,
    }
}

fn clean(text: &str) -> String {
    let text = REFERENCE_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}
