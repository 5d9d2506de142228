//! Inline span substitution.
//!
//! Runs on the text of a single line (or table cell). The order of the passes
//! is significant: bold before italic so `**` pairs are consumed whole, and
//! images before links so `![..](..)` never degrades into `!` plus a link.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

// Private-use code points mark where a code span or a link target was
// lifted out.
const CODE_OPEN: char = '\u{E000}';
const CODE_CLOSE: char = '\u{E001}';
const URL_OPEN: char = '\u{E002}';
const URL_CLOSE: char = '\u{E003}';
const RESERVED: [char; 4] = [CODE_OPEN, CODE_CLOSE, URL_OPEN, URL_CLOSE];

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code span pattern"));

static CODE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("placeholder pattern"));

// The `(url)` half of `[label](url)` and `![alt](url)`.
static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)]+)\)").expect("link target pattern"));

static URL_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E002}(\d+)\x{E003}").expect("placeholder pattern"));

// Emphasis bodies must hold something other than whitespace and the marker
// itself, so `* * *` and `** **` stay literal.
static SUBSTITUTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\*\*(\s*[^\s*].*?)\*\*", "<strong>${1}</strong>"),
        (r"__(\s*[^\s_].*?)__", "<strong>${1}</strong>"),
        (r"\*(\s*[^\s*].*?)\*", "<em>${1}</em>"),
        (r"_(\s*[^\s_].*?)_", "<em>${1}</em>"),
        (
            r"!\[([^\]]*)\]\(([^)]+)\)",
            r#"<img src="${2}" alt="${1}" loading="lazy">"#,
        ),
        (
            r"\[([^\]]+)\]\(([^)]+)\)",
            r#"<a href="${2}" target="_blank" rel="noopener noreferrer">${1}</a>"#,
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("inline pattern"), replacement))
    .collect()
});

/// Escape `&`, `<` and `>`. Quotes are left alone.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Text set aside behind numbered placeholders while the substitution
/// passes run.
struct Stash {
    open: char,
    close: char,
    items: Vec<String>,
}

impl Stash {
    fn new(open: char, close: char) -> Self {
        Self {
            open,
            close,
            items: Vec::new(),
        }
    }

    fn put(&mut self, item: String) -> String {
        self.items.push(item);
        format!("{}{}{}", self.open, self.items.len() - 1, self.close)
    }

    fn restore(&self, html: String, placeholder: &Regex) -> String {
        if self.items.is_empty() {
            return html;
        }
        placeholder
            .replace_all(&html, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.items.get(index))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// Render one line of raw markup to HTML.
///
/// The text is escaped first so the tags introduced here are never
/// re-escaped. Code span contents and link targets are inert: they are set
/// aside before the emphasis passes and put back afterwards.
pub fn render_inline(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let raw: Cow<'_, str> = if raw.contains(RESERVED) {
        Cow::Owned(raw.replace(RESERVED, ""))
    } else {
        Cow::Borrowed(raw)
    };
    let escaped = escape_html(&raw);

    let mut code_spans = Stash::new(CODE_OPEN, CODE_CLOSE);
    let html = CODE_SPAN.replace_all(&escaped, |caps: &Captures| {
        code_spans.put(format!("<code>{}</code>", &caps[1]))
    });

    let mut targets = Stash::new(URL_OPEN, URL_CLOSE);
    let mut html = LINK_TARGET
        .replace_all(&html, |caps: &Captures| {
            format!("]({})", targets.put(caps[1].to_string()))
        })
        .into_owned();

    for (pattern, replacement) in SUBSTITUTIONS.iter() {
        html = pattern.replace_all(&html, *replacement).into_owned();
    }

    let html = targets.restore(html, &URL_PLACEHOLDER);
    code_spans.restore(html, &CODE_PLACEHOLDER)
}
