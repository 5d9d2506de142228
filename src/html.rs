use crate::block::{Block, List};
use crate::inline::{escape_html, render_inline};

/// Convert blocks to an HTML fragment.
///
/// Block elements are emitted back to back with no separators, so no
/// paragraph ever wraps a block element.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, text } => {
            out.push_str(&format!("<h{level}>"));
            out.push_str(&render_inline(text));
            out.push_str(&format!("</h{level}>"));
        }
        Block::Paragraph { lines } => {
            let html = lines
                .iter()
                .map(|line| render_inline(line))
                .collect::<Vec<_>>()
                .join("<br>");
            // Whitespace-only paragraphs are dropped entirely
            let html = html.trim();
            if !html.is_empty() {
                out.push_str("<p>");
                out.push_str(html);
                out.push_str("</p>");
            }
        }
        Block::CodeBlock { language, content } => {
            out.push_str("<pre><code");
            if let Some(lang) = language {
                out.push_str(&format!(" class=\"language-{lang}\""));
            }
            out.push('>');
            out.push_str(&escape_html(content));
            out.push_str("</code></pre>");
        }
        Block::Blockquote { text } => {
            out.push_str("<blockquote>");
            out.push_str(&render_inline(text));
            out.push_str("</blockquote>");
        }
        Block::List(list) => list_to_html(list, out),
        Block::Table { headers, rows } => table_to_html(headers, rows, out),
        Block::Rule => out.push_str("<hr>"),
    }
}

fn list_to_html(list: &List, out: &mut String) {
    let tag = if list.ordered { "ol" } else { "ul" };
    out.push_str(&format!("<{tag}>"));
    for item in &list.items {
        out.push_str("<li>");
        out.push_str(&render_inline(&item.text));
        out.push_str("</li>");
    }
    out.push_str(&format!("</{tag}>"));
}

fn table_to_html(headers: &[String], rows: &[Vec<String>], out: &mut String) {
    out.push_str("<table><thead><tr>");
    for cell in headers {
        out.push_str("<th>");
        out.push_str(&render_inline(cell));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");

    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&render_inline(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table>");
}
