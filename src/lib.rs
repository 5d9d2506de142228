//! Bilingual blog engine with a small markup-to-HTML translator.
//!
//! The translator is a pure function: [`translate`] takes the raw post body
//! and returns an HTML fragment. It runs in two stages, [`parse`] (line
//! classification and block assembly) followed by block rendering with
//! inline span substitution.
//!
//! ```
//! assert_eq!(
//!     blog::translate("# Hi\n\n**bold** and *em*"),
//!     "<h1>Hi</h1><p><strong>bold</strong> and <em>em</em></p>"
//! );
//! ```

pub mod app;
mod block;
pub mod config;
pub mod error;
mod html;
mod inline;
mod parser;
pub mod post;
pub mod store;

pub use block::{Block, List, ListItem};
pub use config::Config;
pub use error::{Error, Result};
pub use inline::{escape_html, render_inline};
pub use post::{Language, Post, PostDraft};
pub use store::PostStore;

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to an HTML fragment.
///
/// Never fails: unrecognized markup passes through as escaped text. Empty
/// input gives empty output.
pub fn translate(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    let blocks = parse(markdown);
    html::blocks_to_html(&blocks)
}
