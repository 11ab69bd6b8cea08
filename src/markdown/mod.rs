//! Markdown toggles, list continuation and preview rendering
//!
//! # Example
//! ```ignore
//! use crate::markdown::{toggle_inline, ComrakRenderer, MarkdownRenderer};
//!
//! toggle_inline(&mut buffer, SyntaxClass::Strong);
//! let rendered = ComrakRenderer::default().render(&buffer.value())?;
//! ```

mod continuation;
pub mod marks;
mod render;
mod toggle;

pub use continuation::{newline_and_continue, next_marker, Continuation};
pub use render::{extract_tags, ComrakRenderer, MarkdownOptions, MarkdownRenderer, RenderedMarkdown};
pub use toggle::{
    format_image, format_link, insert_attachment, insert_horizontal_rule, insert_image,
    insert_link, toggle_code_block, toggle_heading, toggle_inline, toggle_list, ToggleOutcome,
    DEFAULT_HEADING, DEFAULT_LINK_TEXT, MAX_HEADING_LEVEL,
};
