//! Markdown toggles over an editing surface.
//!
//! Each toggle reads the selection and the classification at its start,
//! rewrites the affected text through [`EditorSurface`] and leaves a new
//! selection behind. Toggling an inline mark twice on an unchanged selection
//! restores the original text.
//!
//! # Example
//! ```ignore
//! let mut buf = LineBuffer::from_text("hello");
//! buf.set_selection(Selection::new(Pos::new(0, 0), Pos::new(0, 5)));
//! toggle_inline(&mut buf, SyntaxClass::Strong);
//! assert_eq!(buf.value(), "**hello**");
//! ```

use log::debug;

use super::marks::{marks, CODE_FENCE_CLOSE, CODE_FENCE_OPEN, HORIZONTAL_RULE};
use crate::editor::{EditorSurface, Pos, Selection, SyntaxClass};
use crate::string_utils::{floor_char_boundary, split_lines};

/// Line written by the heading toggle on an empty line.
pub const DEFAULT_HEADING: &str = "# Heading";

/// Link text used when nothing is selected.
pub const DEFAULT_LINK_TEXT: &str = "Link";

/// Deepest heading level before the toggle wraps back to plain text.
pub const MAX_HEADING_LEVEL: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// What a toggle did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Markup was inserted
    Applied,
    /// Markup was removed
    Removed,
    /// The buffer was left alone
    Unchanged,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Position reached after inserting `text` at `start`.
fn end_of(start: Pos, text: &str) -> Pos {
    let lines = split_lines(text);
    match lines.as_slice() {
        [single] => Pos::new(start.line, start.ch + single.len()),
        [.., last] => Pos::new(start.line + lines.len() - 1, last.len()),
        [] => start,
    }
}

/// Shift a column left by the parts of `removed` ranges that lie before it.
fn shift_left(ch: usize, removed: &[(usize, usize)]) -> usize {
    let delta: usize = removed
        .iter()
        .filter(|&&(at, _)| at < ch)
        .map(|&(at, len)| len.min(ch - at))
        .sum();
    ch - delta
}

/// `line` with the byte ranges in `removed` (ascending, non-overlapping) cut out.
fn cut_ranges(line: &str, removed: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for &(at, len) in removed {
        out.push_str(&line[last..at]);
        last = at + len;
    }
    out.push_str(&line[last..]);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Toggle
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle strong, emphasis or strikethrough around the selection.
pub fn toggle_inline<S: EditorSurface + ?Sized>(surface: &mut S, class: SyntaxClass) -> ToggleOutcome {
    let Some(mark) = marks().inline(class) else {
        return ToggleOutcome::Unchanged;
    };
    let Selection { mut start, mut end } = surface.selection();
    let state = surface.classify(start);

    if state.contains(class) {
        let line = surface.line(start.line).unwrap_or_default().to_string();
        let split = floor_char_boundary(&line, start.ch);
        let (left, right) = line.split_at(split);

        // An even number of delimiters before the split means the one at
        // the split opens a span rather than closing one
        let left_count = mark.count(left);
        let opens_at_split =
            left_count % 2 == 0 && mark.find_first(right).is_some_and(|(s, _)| s == 0);

        let mut removed = Vec::with_capacity(2);
        if left_count == 0 || opens_at_split {
            if let Some((s, e)) = mark.find_first(right) {
                removed.push((split + s, e - s));
                let after = split + e;
                if let Some((s, e)) = mark.find_first(&line[after..]) {
                    removed.push((after + s, e - s));
                }
            }
        } else if let Some((s, e)) = mark.find_last(left) {
            removed.push((s, e - s));
            if let Some((s, e)) = mark.find_first(right) {
                removed.push((split + s, e - s));
            }
        }
        if removed.is_empty() {
            return ToggleOutcome::Unchanged;
        }

        surface.replace_line(start.line, &cut_ranges(&line, &removed));
        let end_moves = end.line == start.line;
        start.ch = shift_left(start.ch, &removed);
        if end_moves {
            end.ch = shift_left(end.ch, &removed);
        }
        surface.set_selection(Selection::new(start, end));
        surface.focus();
        debug!("removed {} around {}", class, start);
        ToggleOutcome::Removed
    } else {
        let text = mark.strip_all(&surface.selected_text());
        let tag = mark.primary();
        surface.replace_selection(&format!("{}{}{}", tag, text, tag));

        start.ch += tag.len();
        end = end_of(start, &text);
        surface.set_selection(Selection::new(start, end));
        surface.focus();
        debug!("applied {} at {}", class, start);
        ToggleOutcome::Applied
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Block
// ─────────────────────────────────────────────────────────────────────────────

/// Wrap the selection in a fenced code block.
///
/// Does nothing inside code: toggling a fence off is not supported.
pub fn toggle_code_block<S: EditorSurface + ?Sized>(surface: &mut S) -> ToggleOutcome {
    let Selection { start, end } = surface.selection();
    if surface.classify(start).contains(SyntaxClass::Code) {
        return ToggleOutcome::Unchanged;
    }

    let text = surface.selected_text();
    surface.replace_selection(&format!("{}{}{}", CODE_FENCE_OPEN, text, CODE_FENCE_CLOSE));
    surface.set_selection(Selection::new(
        Pos::new(start.line + 1, start.ch),
        Pos::new(end.line + 1, end.ch),
    ));
    surface.focus();
    ToggleOutcome::Applied
}

// ─────────────────────────────────────────────────────────────────────────────
// Headings
// ─────────────────────────────────────────────────────────────────────────────

/// Step the heading level of every selected line.
///
/// Levels climb 1 → 6 on repeated toggles, then drop back to plain text.
pub fn toggle_heading<S: EditorSurface + ?Sized>(surface: &mut S) -> ToggleOutcome {
    let Selection { start, end } = surface.selection();
    let mut outcome = ToggleOutcome::Unchanged;
    for line in start.line..=end.line {
        outcome = toggle_heading_line(surface, line);
    }
    outcome
}

fn toggle_heading_line<S: EditorSurface + ?Sized>(surface: &mut S, line: usize) -> ToggleOutcome {
    let text = surface.line(line).unwrap_or_default().to_string();
    let level = text.bytes().take_while(|&b| b == b'#').count();

    // Nothing but hashes (or nothing at all): start a fresh heading
    if level == text.len() {
        surface.replace_line(line, DEFAULT_HEADING);
        surface.set_selection(Selection::new(Pos::new(line, 2), Pos::new(line, 9)));
        surface.focus();
        return ToggleOutcome::Applied;
    }

    let rest = &text[level..];
    let rest = if level > 0 {
        rest.strip_prefix(' ').unwrap_or(rest)
    } else {
        rest
    };

    if level < MAX_HEADING_LEVEL {
        surface.replace_line(line, &format!("{} {}", "#".repeat(level + 1), rest));
        ToggleOutcome::Applied
    } else {
        surface.replace_line(line, rest);
        ToggleOutcome::Removed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle a list marker on every selected line.
///
/// The classification at the selection start decides the direction for all
/// lines. With `order` set, inserted markers count up from it (`1.`, `2.`,
/// ...); otherwise the bullet marker is used.
pub fn toggle_list<S: EditorSurface + ?Sized>(
    surface: &mut S,
    class: SyntaxClass,
    mut order: Option<usize>,
) -> ToggleOutcome {
    let Some(mark) = marks().list(class) else {
        return ToggleOutcome::Unchanged;
    };
    let Selection { start, end } = surface.selection();
    let is_list = surface.classify(start).contains(class);

    for line in start.line..=end.line {
        let text = surface.line(line).unwrap_or_default().to_string();
        let updated = if is_list {
            mark.strip(&text)
        } else if let Some(n) = order {
            format!("{}. {}", n, text)
        } else {
            format!("{}{}", mark.tag, text)
        };
        surface.replace_line(line, &updated);

        if let Some(n) = order.as_mut() {
            *n += 1;
        }
    }
    surface.focus();

    if is_list {
        ToggleOutcome::Removed
    } else {
        ToggleOutcome::Applied
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Links, Images, Attachments, Rules
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown for a link.
pub fn format_link(text: &str, url: &str) -> String {
    format!("[{}]({})", text, url)
}

/// Markdown for an image.
pub fn format_image(text: &str, url: &str) -> String {
    format!("!{}", format_link(text, url))
}

fn insert_linked<S: EditorSurface + ?Sized>(surface: &mut S, url: &str, image: bool) {
    let cursor = surface.selection().start;
    let selected = surface.selected_text();
    let text = if selected.is_empty() {
        DEFAULT_LINK_TEXT.to_string()
    } else {
        selected
    };

    let (markup, lead) = if image {
        (format_image(&text, url), 2)
    } else {
        (format_link(&text, url), 1)
    };
    surface.replace_selection(&markup);

    let text_start = Pos::new(cursor.line, cursor.ch + lead);
    surface.set_selection(Selection::new(text_start, end_of(text_start, &text)));
    surface.focus();
}

/// Turn the selection (or a placeholder) into a link to `url` and select
/// the link text.
pub fn insert_link<S: EditorSurface + ?Sized>(surface: &mut S, url: &str) {
    insert_linked(surface, url, false);
}

/// Like [`insert_link`], producing an image.
pub fn insert_image<S: EditorSurface + ?Sized>(surface: &mut S, url: &str) {
    insert_linked(surface, url, true);
}

/// Replace the selection with attachment markup and select it.
pub fn insert_attachment<S: EditorSurface + ?Sized>(surface: &mut S, text: &str) {
    let start = surface.selection().start;
    surface.replace_selection(text);
    surface.set_selection(Selection::new(start, end_of(start, text)));
    surface.focus();
}

/// Insert a horizontal rule between blank lines, cursor below it.
pub fn insert_horizontal_rule<S: EditorSurface + ?Sized>(surface: &mut S) {
    let start = surface.selection().start;
    surface.replace_selection(HORIZONTAL_RULE);
    surface.set_selection(Selection::cursor(Pos::new(start.line + 4, 0)));
    surface.focus();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::LineBuffer;

    fn buffer(text: &str, start: (usize, usize), end: (usize, usize)) -> LineBuffer {
        let mut buf = LineBuffer::from_text(text);
        buf.set_selection(Selection::new(
            Pos::new(start.0, start.1),
            Pos::new(end.0, end.1),
        ));
        buf
    }

    fn selection(buf: &LineBuffer) -> ((usize, usize), (usize, usize)) {
        let s = buf.selection();
        ((s.start.line, s.start.ch), (s.end.line, s.end.ch))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Toggle Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_strong_round_trip_on_full_line() {
        let mut buf = buffer("hello", (0, 0), (0, 5));
        assert_eq!(toggle_inline(&mut buf, SyntaxClass::Strong), ToggleOutcome::Applied);
        assert_eq!(buf.value(), "**hello**");
        assert_eq!(selection(&buf), ((0, 2), (0, 7)));

        // Select the whole new line and toggle again
        buf.set_selection(Selection::new(Pos::new(0, 0), Pos::new(0, 9)));
        assert_eq!(toggle_inline(&mut buf, SyntaxClass::Strong), ToggleOutcome::Removed);
        assert_eq!(buf.value(), "hello");
        assert_eq!(selection(&buf), ((0, 0), (0, 5)));
    }

    #[test]
    fn test_inline_toggle_twice_restores_text() {
        for class in [SyntaxClass::Strong, SyntaxClass::Em, SyntaxClass::Strikethrough] {
            let mut buf = buffer("say hello world", (0, 4), (0, 9));
            toggle_inline(&mut buf, class);
            assert_ne!(buf.value(), "say hello world");
            toggle_inline(&mut buf, class);
            assert_eq!(buf.value(), "say hello world", "class {}", class);
            assert_eq!(selection(&buf), ((0, 4), (0, 9)));
        }
    }

    #[test]
    fn test_em_wraps_with_primary_spelling() {
        let mut buf = buffer("Hello world", (0, 6), (0, 11));
        toggle_inline(&mut buf, SyntaxClass::Em);
        assert_eq!(buf.value(), "Hello *world*");
        assert_eq!(selection(&buf), ((0, 7), (0, 12)));
    }

    #[test]
    fn test_strong_removes_underscore_spelling() {
        let mut buf = buffer("a __b__ c", (0, 4), (0, 5));
        assert_eq!(toggle_inline(&mut buf, SyntaxClass::Strong), ToggleOutcome::Removed);
        assert_eq!(buf.value(), "a b c");
        assert_eq!(selection(&buf), ((0, 2), (0, 3)));
    }

    #[test]
    fn test_wrapping_strips_nested_delimiters() {
        let mut buf = buffer("x **a** b", (0, 0), (0, 9));
        toggle_inline(&mut buf, SyntaxClass::Strong);
        assert_eq!(buf.value(), "**x a b**");
        assert_eq!(selection(&buf), ((0, 2), (0, 7)));
    }

    #[test]
    fn test_remove_second_span_selected_from_its_opener() {
        let mut buf = buffer("**a** **b**", (0, 6), (0, 11));
        assert_eq!(toggle_inline(&mut buf, SyntaxClass::Strong), ToggleOutcome::Removed);
        assert_eq!(buf.value(), "**a** b");
        assert_eq!(selection(&buf), ((0, 6), (0, 7)));
    }

    #[test]
    fn test_remove_first_of_two_spans() {
        // Cursor inside the first span
        let mut buf = buffer("*a* *b*", (0, 1), (0, 2));
        toggle_inline(&mut buf, SyntaxClass::Em);
        assert_eq!(buf.value(), "a *b*");

        // Cursor on the closing delimiter of the first span
        let mut buf = buffer("**a** **b**", (0, 3), (0, 3));
        toggle_inline(&mut buf, SyntaxClass::Strong);
        assert_eq!(buf.value(), "a **b**");
    }

    #[test]
    fn test_remove_inner_text_of_later_span() {
        let mut buf = buffer("**a** and **b**", (0, 12), (0, 13));
        toggle_inline(&mut buf, SyntaxClass::Strong);
        assert_eq!(buf.value(), "**a** and b");
        assert_eq!(selection(&buf), ((0, 10), (0, 11)));
    }

    #[test]
    fn test_empty_selection_wraps_empty_span() {
        let mut buf = buffer("ab", (0, 1), (0, 1));
        toggle_inline(&mut buf, SyntaxClass::Strong);
        assert_eq!(buf.value(), "a****b");
        assert_eq!(selection(&buf), ((0, 3), (0, 3)));
    }

    #[test]
    fn test_inline_multiline_selection() {
        let mut buf = buffer("one\ntwo", (0, 0), (1, 3));
        toggle_inline(&mut buf, SyntaxClass::Em);
        assert_eq!(buf.value(), "*one\ntwo*");
        assert_eq!(selection(&buf), ((0, 1), (1, 3)));
    }

    #[test]
    fn test_non_inline_class_is_ignored() {
        let mut buf = buffer("x", (0, 0), (0, 1));
        assert_eq!(toggle_inline(&mut buf, SyntaxClass::Quote), ToggleOutcome::Unchanged);
        assert_eq!(buf.value(), "x");
    }

    #[test]
    fn test_inline_unicode() {
        let mut buf = buffer("Hei på deg", (0, 4), (0, 7));
        toggle_inline(&mut buf, SyntaxClass::Strong);
        assert_eq!(buf.value(), "Hei **på** deg");
        toggle_inline(&mut buf, SyntaxClass::Strong);
        assert_eq!(buf.value(), "Hei på deg");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Code Block Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_code_block_wraps_selection() {
        let mut buf = buffer("let x = 1;", (0, 0), (0, 10));
        assert_eq!(toggle_code_block(&mut buf), ToggleOutcome::Applied);
        assert_eq!(buf.value(), "```\nlet x = 1;\n```");
        assert_eq!(selection(&buf), ((1, 0), (1, 10)));
    }

    #[test]
    fn test_code_block_is_noop_inside_code() {
        let text = "```\nlet x = 1;\n```";
        let mut buf = buffer(text, (1, 2), (1, 2));
        assert_eq!(toggle_code_block(&mut buf), ToggleOutcome::Unchanged);
        assert_eq!(buf.value(), text);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Heading Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_climbs_then_resets() {
        let mut buf = buffer("Title", (0, 0), (0, 0));
        for level in 1..=6 {
            assert_eq!(toggle_heading(&mut buf), ToggleOutcome::Applied);
            assert_eq!(buf.value(), format!("{} Title", "#".repeat(level)));
        }
        assert_eq!(toggle_heading(&mut buf), ToggleOutcome::Removed);
        assert_eq!(buf.value(), "Title");
    }

    #[test]
    fn test_heading_on_empty_line() {
        let mut buf = buffer("", (0, 0), (0, 0));
        toggle_heading(&mut buf);
        assert_eq!(buf.value(), DEFAULT_HEADING);
        assert_eq!(buf.selected_text(), "Heading");
    }

    #[test]
    fn test_heading_on_hash_only_line() {
        let mut buf = buffer("###", (0, 0), (0, 0));
        toggle_heading(&mut buf);
        assert_eq!(buf.value(), "# Heading");
    }

    #[test]
    fn test_heading_each_selected_line() {
        let mut buf = buffer("a\n# b\nc", (0, 0), (2, 1));
        toggle_heading(&mut buf);
        assert_eq!(buf.value(), "# a\n## b\n# c");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // List Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_ordered_list_counts_from_order() {
        let mut buf = buffer("a\nb\nc", (0, 0), (2, 0));
        toggle_list(&mut buf, SyntaxClass::OrderedList, Some(4));
        assert_eq!(buf.value(), "4. a\n5. b\n6. c");
    }

    #[test]
    fn test_ordered_list_toggle_off() {
        let mut buf = buffer("1. a\n2. b", (0, 3), (1, 3));
        assert_eq!(
            toggle_list(&mut buf, SyntaxClass::OrderedList, Some(1)),
            ToggleOutcome::Removed
        );
        assert_eq!(buf.value(), "a\nb");
    }

    #[test]
    fn test_bullet_list_round_trip_keeps_indent() {
        let mut buf = buffer("  item", (0, 0), (0, 0));
        toggle_list(&mut buf, SyntaxClass::UnorderedList, None);
        assert_eq!(buf.value(), "*   item");

        let mut buf = buffer("    - nested", (0, 6), (0, 6));
        assert_eq!(
            toggle_list(&mut buf, SyntaxClass::UnorderedList, None),
            ToggleOutcome::Removed
        );
        assert_eq!(buf.value(), "    nested");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Link / Attachment / Rule Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_link_without_selection_uses_placeholder() {
        let mut buf = buffer("", (0, 0), (0, 0));
        insert_link(&mut buf, "http://x");
        assert_eq!(buf.value(), "[Link](http://x)");
        assert_eq!(buf.selected_text(), "Link");
    }

    #[test]
    fn test_link_with_selection() {
        let mut buf = buffer("Click here", (0, 6), (0, 10));
        insert_link(&mut buf, "http://x");
        assert_eq!(buf.value(), "Click [here](http://x)");
        assert_eq!(selection(&buf), ((0, 7), (0, 11)));
    }

    #[test]
    fn test_image_selects_alt_text() {
        let mut buf = buffer("cat", (0, 0), (0, 3));
        insert_image(&mut buf, "cat.png");
        assert_eq!(buf.value(), "![cat](cat.png)");
        assert_eq!(buf.selected_text(), "cat");
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_link("a", "b"), "[a](b)");
        assert_eq!(format_image("a", "b"), "![a](b)");
    }

    #[test]
    fn test_attachment_selects_inserted_text() {
        let mut buf = buffer("see ", (0, 4), (0, 4));
        insert_attachment(&mut buf, "![file](#file/1)");
        assert_eq!(buf.value(), "see ![file](#file/1)");
        assert_eq!(buf.selected_text(), "![file](#file/1)");
    }

    #[test]
    fn test_horizontal_rule() {
        let mut buf = buffer("above", (0, 5), (0, 5));
        insert_horizontal_rule(&mut buf);
        assert_eq!(buf.value(), "above\n\n-----\n\n");
        assert_eq!(selection(&buf), ((4, 0), (4, 0)));
    }
}
