//! The mark table: delimiters and prefix patterns for each toggleable
//! markdown construct.
//!
//! Built once and shared. Inline marks list their alternate spellings with
//! the primary spelling first; list marks carry a prefix pattern whose first
//! capture group is the indentation to keep when the marker is removed.

use regex::Regex;
use std::sync::OnceLock;

use crate::editor::SyntaxClass;

/// Opening fence inserted by the code block toggle.
pub const CODE_FENCE_OPEN: &str = "```\r\n";
/// Closing fence inserted by the code block toggle.
pub const CODE_FENCE_CLOSE: &str = "\r\n```";
/// Text inserted by the horizontal rule action.
pub const HORIZONTAL_RULE: &str = "\r\r-----\r\r";

// ─────────────────────────────────────────────────────────────────────────────
// Inline Marks
// ─────────────────────────────────────────────────────────────────────────────

/// An inline delimiter family such as `**` / `__`.
#[derive(Debug)]
pub struct InlineMark {
    /// Delimiter spellings, primary first.
    pub tags: &'static [&'static str],
    /// Matches any spelling of the family.
    pattern: Regex,
}

impl InlineMark {
    fn new(tags: &'static [&'static str]) -> Self {
        let alternation = tags
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            tags,
            pattern: Regex::new(&format!("({})", alternation)).expect("valid mark pattern"),
        }
    }

    /// The spelling used when inserting the mark.
    pub fn primary(&self) -> &'static str {
        self.tags[0]
    }

    /// Byte range of the last delimiter in `text`, i.e. the one no other
    /// delimiter of the family follows.
    pub fn find_last(&self, text: &str) -> Option<(usize, usize)> {
        self.pattern
            .find_iter(text)
            .last()
            .map(|m| (m.start(), m.end()))
    }

    /// Byte range of the first delimiter in `text`.
    pub fn find_first(&self, text: &str) -> Option<(usize, usize)> {
        self.pattern.find(text).map(|m| (m.start(), m.end()))
    }

    /// Number of delimiters of the family in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    /// Remove every spelling of the family from `text`.
    pub fn strip_all(&self, text: &str) -> String {
        self.tags
            .iter()
            .fold(text.to_string(), |acc, tag| acc.replace(tag, ""))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List Marks
// ─────────────────────────────────────────────────────────────────────────────

/// A line-prefix list marker.
#[derive(Debug)]
pub struct ListMark {
    /// Matches the marker; group 1 is the indentation.
    pub prefix: Regex,
    /// Marker inserted when toggling the list on.
    pub tag: &'static str,
}

impl ListMark {
    /// Remove the marker from `line`, keeping its indentation.
    pub fn strip(&self, line: &str) -> String {
        self.prefix.replace(line, "$1").into_owned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Table
// ─────────────────────────────────────────────────────────────────────────────

/// All marks, loaded once.
#[derive(Debug)]
pub struct MarkTable {
    pub strong: InlineMark,
    pub em: InlineMark,
    pub strikethrough: InlineMark,
    pub unordered_list: ListMark,
    pub ordered_list: ListMark,
}

impl MarkTable {
    fn build() -> Self {
        Self {
            strong: InlineMark::new(&["**", "__"]),
            em: InlineMark::new(&["*", "_"]),
            strikethrough: InlineMark::new(&["~~"]),
            unordered_list: ListMark {
                prefix: Regex::new(r"^(\s*)(\*|-|\+)\s+").expect("valid bullet pattern"),
                tag: "* ",
            },
            ordered_list: ListMark {
                prefix: Regex::new(r"^(\s*)\d+\.\s+").expect("valid ordered pattern"),
                tag: "1. ",
            },
        }
    }

    /// Inline mark for a class, if the class is an inline toggle.
    pub fn inline(&self, class: SyntaxClass) -> Option<&InlineMark> {
        match class {
            SyntaxClass::Strong => Some(&self.strong),
            SyntaxClass::Em => Some(&self.em),
            SyntaxClass::Strikethrough => Some(&self.strikethrough),
            _ => None,
        }
    }

    /// List mark for a class, if the class is a list kind.
    pub fn list(&self, class: SyntaxClass) -> Option<&ListMark> {
        match class {
            SyntaxClass::UnorderedList => Some(&self.unordered_list),
            SyntaxClass::OrderedList => Some(&self.ordered_list),
            _ => None,
        }
    }
}

/// The shared mark table.
pub fn marks() -> &'static MarkTable {
    static TABLE: OnceLock<MarkTable> = OnceLock::new();
    TABLE.get_or_init(MarkTable::build)
}
