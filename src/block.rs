/// A single list item. Text is raw markup; inline spans are resolved at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    /// Consecutive text lines; rendered joined by `<br>`.
    Paragraph {
        lines: Vec<String>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Blockquote {
        text: String,
    },
    List(List),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Rule,
}
