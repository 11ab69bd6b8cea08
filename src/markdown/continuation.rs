//! Enter-key list continuation.
//!
//! Pressing Enter at the end of a list item or quote line starts the next
//! item with the same indentation. Ordered markers count up, task items
//! start unchecked. Pressing Enter on an item with no content removes its
//! marker instead, ending the list.

use regex::Regex;
use std::sync::OnceLock;

use crate::editor::{EditorSurface, Pos, Selection, SyntaxClass};

/// Marker prefix of an item. Groups: indent, marker, number, number
/// delimiter, spacing after the marker.
fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)(>[> ]*|[*+-] \[[xX ]\]\s|[*+-]\s|(\d+)([.)]))(\s*)")
            .expect("valid list item regex")
    })
}

/// An item holding nothing but its marker.
fn empty_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)(>[> ]*|[*+-] \[[xX ]\]|[*+-]|(\d+)[.)])(\s*)$")
            .expect("valid empty item regex")
    })
}

/// What the Enter key did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// A plain line break was inserted
    Newline,
    /// A new item was started
    Continued,
    /// An empty item's marker was removed
    Ended,
}

/// The marker that follows `line`, or `None` if it is not an item.
pub fn next_marker(line: &str) -> Option<String> {
    let caps = item_re().captures(line)?;
    let indent = caps.get(1).map_or("", |m| m.as_str());
    let after = caps.get(5).map_or("", |m| m.as_str());

    let bullet = match (caps.get(3), caps.get(4)) {
        (Some(number), Some(delim)) => {
            let n: u64 = number.as_str().parse().ok()?;
            format!("{}{}", n + 1, delim.as_str())
        }
        _ => caps[2].replace("[x]", "[ ]").replace("[X]", "[ ]"),
    };
    Some(format!("{}{}{}", indent, bullet, after))
}

/// Handle Enter with list continuation.
///
/// Only acts on an empty selection outside code; anything else gets a plain
/// line break.
pub fn newline_and_continue<S: EditorSurface + ?Sized>(surface: &mut S) -> Continuation {
    let selection = surface.selection();
    let cursor = selection.start;

    if !selection.is_empty() || surface.classify(cursor).contains(SyntaxClass::Code) {
        surface.replace_selection("\n");
        return Continuation::Newline;
    }

    let line = surface.line(cursor.line).unwrap_or_default().to_string();
    if empty_item_re().is_match(&line) {
        surface.replace_range("", Pos::new(cursor.line, 0), Pos::new(cursor.line, line.len()));
        surface.set_selection(Selection::cursor(Pos::new(cursor.line, 0)));
        return Continuation::Ended;
    }

    match next_marker(&line) {
        Some(marker) => {
            surface.replace_selection(&format!("\n{}", marker));
            Continuation::Continued
        }
        None => {
            surface.replace_selection("\n");
            Continuation::Newline
        }
    }
}
