use crate::block::{Block, List, ListItem};

const FENCE: &str = "```";

/// Local facts about a single line, decided without looking at its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Blank,
    /// A fence opener candidate. Only becomes a code block if a closing fence follows.
    Fence { language: Option<&'a str> },
    Heading { level: u8, text: &'a str },
    Blockquote { text: &'a str },
    Rule,
    ListItem { ordered: bool, text: &'a str },
    TableRow,
    Text,
}

/// Classify one line. Markers must start at column zero.
pub(crate) fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(language) = fence_language(line) {
        return LineKind::Fence { language };
    }
    // Longest prefix first so `### ` never reads as a level-one heading.
    for (level, prefix) in [(3, "### "), (2, "## "), (1, "# ")] {
        if let Some(text) = line.strip_prefix(prefix) {
            return LineKind::Heading { level, text };
        }
    }
    if let Some(text) = line.strip_prefix("> ") {
        return LineKind::Blockquote { text };
    }
    if line == "---" || line == "***" {
        return LineKind::Rule;
    }
    if let Some(item) = list_item(line) {
        return item;
    }
    if is_table_row(line) {
        return LineKind::TableRow;
    }
    LineKind::Text
}

/// `Some(lang)` if the line opens a fence: three backticks and an optional word.
fn fence_language(line: &str) -> Option<Option<&str>> {
    let rest = line.trim_end().strip_prefix(FENCE)?;
    if rest.is_empty() {
        Some(None)
    } else if rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(Some(rest))
    } else {
        None
    }
}

fn list_item(line: &str) -> Option<LineKind<'_>> {
    for marker in ["* ", "- ", "+ "] {
        if let Some(text) = line.strip_prefix(marker) {
            return (!text.is_empty()).then_some(LineKind::ListItem {
                ordered: false,
                text,
            });
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let text = line[digits..].strip_prefix(". ")?;
    (!text.is_empty()).then_some(LineKind::ListItem {
        ordered: true,
        text,
    })
}

fn is_table_row(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.starts_with('|') && line.ends_with('|')
}

fn is_table_separator(line: &str) -> bool {
    let line = line.trim_end();
    is_table_row(line)
        && line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

/// Split a `| a | b |` row into trimmed cell texts.
///
/// A `|` inside a closed code span belongs to the cell.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim_end();
    let inner = &line[1..line.len() - 1];

    let mut cells = Vec::new();
    let mut start = 0;
    let mut in_code = false;
    for (i, c) in inner.char_indices() {
        match c {
            '`' if in_code => in_code = false,
            '`' => in_code = inner[i + 1..].contains('`'),
            '|' if !in_code => {
                cells.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    cells.push(inner[start..].trim().to_string());
    cells
}

#[derive(Default)]
struct ParseState {
    // Text lines of the paragraph being built
    paragraph: Vec<String>,
    // Set once a fence search has failed; no later opener can close either
    fences_exhausted: bool,
}

impl ParseState {
    fn flush_paragraph(&mut self, blocks: &mut Vec<Block>) {
        if !self.paragraph.is_empty() {
            let lines = std::mem::take(&mut self.paragraph);
            blocks.push(Block::Paragraph { lines });
        }
    }

    fn find_fence_close(&mut self, lines: &[&str], from: usize) -> Option<usize> {
        if self.fences_exhausted {
            return None;
        }
        let close = lines[from..]
            .iter()
            .position(|line| line.starts_with(FENCE))
            .map(|offset| from + offset);
        if close.is_none() {
            self.fences_exhausted = true;
        }
        close
    }
}

/// Parse markdown text into a list of blocks.
///
/// Runs in a single forward pass over the lines; every construct that needs
/// lookahead (fences, list runs, tables) consumes the lines it inspects.
pub fn parse(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut state = ParseState::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        match classify(line) {
            LineKind::Blank => state.flush_paragraph(&mut blocks),

            LineKind::Fence { language } => {
                if let Some(close) = state.find_fence_close(&lines, i + 1) {
                    state.flush_paragraph(&mut blocks);
                    blocks.push(code_block(language, &lines[i + 1..close]));
                    i = close + 1;
                    continue;
                }
                state.paragraph.push(line.to_string());
            }

            LineKind::Heading { level, text } => {
                state.flush_paragraph(&mut blocks);
                blocks.push(Block::Heading {
                    level,
                    text: text.to_string(),
                });
            }

            LineKind::Blockquote { text } => {
                state.flush_paragraph(&mut blocks);
                blocks.push(Block::Blockquote {
                    text: text.to_string(),
                });
            }

            LineKind::Rule => {
                state.flush_paragraph(&mut blocks);
                blocks.push(Block::Rule);
            }

            LineKind::ListItem { ordered, .. } => {
                state.flush_paragraph(&mut blocks);
                let (items, next) = collect_list_items(&lines, i);
                blocks.push(Block::List(List { ordered, items }));
                i = next;
                continue;
            }

            LineKind::TableRow => {
                if lines.get(i + 1).is_some_and(|l| is_table_separator(l)) {
                    state.flush_paragraph(&mut blocks);
                    let (table, next) = collect_table(&lines, i);
                    blocks.push(table);
                    i = next;
                    continue;
                }
                state.paragraph.push(line.to_string());
            }

            LineKind::Text => state.paragraph.push(line.to_string()),
        }
        i += 1;
    }

    state.flush_paragraph(&mut blocks);
    blocks
}

fn code_block(language: Option<&str>, body: &[&str]) -> Block {
    let is_blank = |line: &&str| line.trim().is_empty();
    let start = body.iter().position(|l| !is_blank(l)).unwrap_or(body.len());
    let end = body.iter().rposition(|l| !is_blank(l)).map_or(start, |e| e + 1);

    Block::CodeBlock {
        language: language.map(str::to_string),
        content: body[start..end].join("\n"),
    }
}

/// Gather a run of list items starting at `start`. Blank lines between two
/// items keep the run going; any other line ends it.
fn collect_list_items(lines: &[&str], start: usize) -> (Vec<ListItem>, usize) {
    let mut items = Vec::new();
    let mut i = start;

    while i < lines.len() {
        match classify(lines[i]) {
            LineKind::ListItem { text, .. } => {
                items.push(ListItem {
                    text: text.to_string(),
                });
                i += 1;
            }
            LineKind::Blank => {
                let next = lines[i..]
                    .iter()
                    .position(|l| !l.trim().is_empty())
                    .map(|offset| i + offset);
                match next {
                    Some(n) if matches!(classify(lines[n]), LineKind::ListItem { .. }) => i = n,
                    _ => break,
                }
            }
            _ => break,
        }
    }

    (items, i)
}

/// Build a table from the header at `start`; the separator is at `start + 1`.
fn collect_table(lines: &[&str], start: usize) -> (Block, usize) {
    let headers = split_cells(lines[start]);
    let columns = headers.len();
    let mut rows = Vec::new();
    let mut i = start + 2;

    while i < lines.len() && is_table_row(lines[i]) {
        let mut cells = split_cells(lines[i]);
        cells.resize(columns, String::new());
        rows.push(cells);
        i += 1;
    }

    (Block::Table { headers, rows }, i)
}
