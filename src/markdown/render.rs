//! Markdown rendering for the preview pane using comrak
//!
//! Besides HTML, a render reports the note's hashtags and the number of
//! top-level blocks. The block count is what scroll sync uses to find the
//! preview element matching the editor's top line.

use comrak::{
    format_html,
    nodes::{AstNode, NodeValue},
    parse_document, Arena, Options,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown extensions enabled in the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            tables: true,
            autolink: true,
            tasklist: true,
        }
    }
}

impl MarkdownOptions {
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Result of rendering a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    /// Hashtags found in text, without the `#`, in order of appearance.
    pub tags: Vec<String>,
    /// Number of top-level blocks.
    pub blocks: usize,
}

/// Something that turns markdown into preview HTML.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<RenderedMarkdown>;
}

/// The comrak-backed renderer.
#[derive(Debug, Clone, Default)]
pub struct ComrakRenderer {
    options: MarkdownOptions,
}

impl ComrakRenderer {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> Result<RenderedMarkdown> {
        let arena = Arena::new();
        let options = self.options.to_comrak_options();
        let root = parse_document(&arena, markdown, &options);

        let mut html = Vec::new();
        format_html(root, &options, &mut html)
            .map_err(|e| Error::Render(e.to_string()))?;
        let html = String::from_utf8(html).map_err(|e| Error::Render(e.to_string()))?;

        let mut tags = Vec::new();
        collect_tags(root, &mut tags);

        Ok(RenderedMarkdown {
            html,
            tags,
            blocks: root.children().count(),
        })
    }
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|\s)#([\p{L}\p{N}_][\p{L}\p{N}_\-]*)").expect("valid tag regex")
    })
}

/// Hashtags in a piece of text.
pub fn extract_tags(text: &str) -> Vec<String> {
    tag_re()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Tags from text nodes only, so code and link targets never contribute.
fn collect_tags<'a>(node: &'a AstNode<'a>, tags: &mut Vec<String>) {
    if let NodeValue::Text(ref text) = node.data.borrow().value {
        for tag in extract_tags(text) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    for child in node.children() {
        collect_tags(child, tags);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
