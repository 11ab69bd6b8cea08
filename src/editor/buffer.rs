//! The editing surface seam and an in-memory implementation.
//!
//! [`EditorSurface`] is everything the controller needs from a text-editing
//! widget: line-addressed reads, range replacement, selection access and a
//! syntax classification at a position. [`LineBuffer`] implements it over a
//! `Vec<String>` with snapshot undo/redo; it backs the CLI and the tests, and
//! any GUI widget can implement the trait instead.

use log::debug;
use std::collections::VecDeque;

use super::classify::{classify_position, Classification};
use super::position::{Pos, Selection};
use crate::error::{Error, Result};
use crate::string_utils::{floor_char_boundary, split_lines};

/// Default undo history depth for [`LineBuffer`].
pub const DEFAULT_MAX_UNDO: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Surface Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A text-editing surface the controller can drive.
///
/// Inserted text may contain `\r\n`, `\r` or `\n`; each one starts a new
/// line. After `replace_range`, selection ends inside or at the edges of the
/// replaced range move to the end of the inserted text.
pub trait EditorSurface {
    /// Number of lines (always at least one).
    fn line_count(&self) -> usize;

    /// Text of a line, without its line break.
    fn line(&self, line: usize) -> Option<&str>;

    /// Whole buffer, lines joined with `\n`.
    fn value(&self) -> String;

    /// Text between two positions.
    fn range_text(&self, from: Pos, to: Pos) -> String;

    /// Replace the text between two positions.
    fn replace_range(&mut self, text: &str, from: Pos, to: Pos);

    fn selection(&self) -> Selection;

    fn set_selection(&mut self, selection: Selection);

    /// Syntax classes for the text at `pos`.
    fn classify(&self, pos: Pos) -> Classification;

    /// Undo the last edit. Returns `false` when there is nothing to undo.
    fn undo(&mut self) -> bool;

    /// Redo the last undone edit.
    fn redo(&mut self) -> bool;

    /// Counter bumped on every content mutation.
    fn revision(&self) -> u64;

    /// Give keyboard focus back to the surface.
    fn focus(&mut self) {}

    /// Start a group of edits that undo as one step. Groups may nest; only
    /// the outermost `end_edit` closes the group.
    fn begin_edit(&mut self) {}

    /// Close the group opened by [`begin_edit`](Self::begin_edit).
    fn end_edit(&mut self) {}

    /// Soft-wrap long lines.
    fn set_line_wrapping(&mut self, _wrap: bool) {}

    fn selected_text(&self) -> String {
        let selection = self.selection();
        self.range_text(selection.start, selection.end)
    }

    fn replace_selection(&mut self, text: &str) {
        let selection = self.selection();
        self.replace_range(text, selection.start, selection.end);
    }

    /// Replace a whole line, keeping its line break.
    fn replace_line(&mut self, line: usize, text: &str) {
        let len = self.line(line).map_or(0, str::len);
        self.replace_range(text, Pos::new(line, 0), Pos::new(line, len));
    }

    /// Clamp a position into the buffer.
    fn clip(&self, pos: Pos) -> Pos {
        let last = self.line_count().saturating_sub(1);
        let line = pos.line.min(last);
        let text = self.line(line).unwrap_or("");
        Pos::new(line, floor_char_boundary(text, pos.ch))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Buffer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Snapshot {
    lines: Vec<String>,
    selection: Selection,
}

/// In-memory editing surface.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<String>,
    selection: Selection,
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_undo: usize,
    revision: u64,
    /// Open edit groups and the state before the outermost one
    group_depth: usize,
    group_start: Option<(Snapshot, u64)>,
    line_wrapping: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl LineBuffer {
    /// Create a buffer holding `text`, cursor at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: split_lines(text).into_iter().map(str::to_owned).collect(),
            selection: Selection::default(),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: DEFAULT_MAX_UNDO,
            revision: 0,
            group_depth: 0,
            group_start: None,
            line_wrapping: true,
        }
    }

    /// Set the maximum undo history size.
    #[must_use]
    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo.max(1);
        self
    }

    /// Validate a position without clamping it.
    pub fn check_pos(&self, pos: Pos) -> Result<Pos> {
        match self.lines.get(pos.line) {
            Some(line) if pos.ch <= line.len() && line.is_char_boundary(pos.ch) => Ok(pos),
            _ => Err(Error::InvalidPosition {
                line: pos.line,
                ch: pos.ch,
            }),
        }
    }

    pub fn line_wrapping(&self) -> bool {
        self.line_wrapping
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.lines.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.lines = snapshot.lines;
        self.selection = snapshot.selection;
        self.revision = self.revision.wrapping_add(1);
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }
}

/// Where `pos` lands after `from..to` is replaced by text ending at `change_end`.
fn map_pos(pos: Pos, from: Pos, to: Pos, change_end: Pos) -> Pos {
    if pos < from {
        pos
    } else if pos <= to {
        change_end
    } else if pos.line == to.line {
        Pos::new(change_end.line, change_end.ch + (pos.ch - to.ch))
    } else {
        Pos::new(pos.line - to.line + change_end.line, pos.ch)
    }
}

impl EditorSurface for LineBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    fn value(&self) -> String {
        self.lines.join("\n")
    }

    fn range_text(&self, from: Pos, to: Pos) -> String {
        let Selection { start, end } = Selection::new(self.clip(from), self.clip(to));
        if start.line == end.line {
            return self.lines[start.line][start.ch..end.ch].to_string();
        }
        let mut parts = Vec::with_capacity(end.line - start.line + 1);
        parts.push(&self.lines[start.line][start.ch..]);
        for line in &self.lines[start.line + 1..end.line] {
            parts.push(line.as_str());
        }
        parts.push(&self.lines[end.line][..end.ch]);
        parts.join("\n")
    }

    fn replace_range(&mut self, text: &str, from: Pos, to: Pos) {
        let Selection {
            start: from,
            end: to,
        } = Selection::new(self.clip(from), self.clip(to));
        if self.group_depth == 0 {
            self.push_undo(self.snapshot());
        }

        let prefix = &self.lines[from.line][..from.ch];
        let suffix = &self.lines[to.line][to.ch..];
        let inserted = split_lines(text);
        let last = inserted.len() - 1;

        let change_end = if last == 0 {
            Pos::new(from.line, from.ch + inserted[0].len())
        } else {
            Pos::new(from.line + last, inserted[last].len())
        };

        let mut replacement: Vec<String> = inserted.iter().map(|s| s.to_string()).collect();
        replacement[0].insert_str(0, prefix);
        replacement[last].push_str(suffix);
        self.lines.splice(from.line..=to.line, replacement);

        self.selection = Selection::new(
            map_pos(self.selection.start, from, to, change_end),
            map_pos(self.selection.end, from, to, change_end),
        );
        self.revision = self.revision.wrapping_add(1);
        debug!("replaced {}..{} ({} lines inserted)", from, to, last + 1);
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::new(self.clip(selection.start), self.clip(selection.end));
    }

    fn classify(&self, pos: Pos) -> Classification {
        classify_position(&self.lines, self.clip(pos))
    }

    fn undo(&mut self) -> bool {
        match self.undo_stack.pop_back() {
            Some(previous) => {
                self.redo_stack.push(self.snapshot());
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push_back(self.snapshot());
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn begin_edit(&mut self) {
        if self.group_depth == 0 {
            self.group_start = Some((self.snapshot(), self.revision));
        }
        self.group_depth += 1;
    }

    fn end_edit(&mut self) {
        if self.group_depth == 0 {
            return;
        }
        self.group_depth -= 1;
        if self.group_depth > 0 {
            return;
        }
        // An empty group leaves the history alone
        if let Some((snapshot, revision)) = self.group_start.take() {
            if self.revision != revision {
                self.push_undo(snapshot);
            }
        }
    }

    fn set_line_wrapping(&mut self, wrap: bool) {
        self.line_wrapping = wrap;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(a: (usize, usize), b: (usize, usize)) -> Selection {
        Selection::new(Pos::new(a.0, a.1), Pos::new(b.0, b.1))
    }

    #[test]
    fn test_from_text_splits_lines() {
        let buf = LineBuffer::from_text("one\ntwo\r\nthree");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(1), Some("two"));
        assert_eq!(buf.value(), "one\ntwo\nthree");
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = LineBuffer::default();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(""));
    }

    #[test]
    fn test_range_text_multiline() {
        let buf = LineBuffer::from_text("alpha\nbeta\ngamma");
        assert_eq!(buf.range_text(Pos::new(0, 2), Pos::new(2, 3)), "pha\nbeta\ngam");
        assert_eq!(buf.range_text(Pos::new(1, 4), Pos::new(1, 0)), "beta");
    }

    #[test]
    fn test_replace_selection_single_line() {
        let mut buf = LineBuffer::from_text("hello world");
        buf.set_selection(sel((0, 6), (0, 11)));
        buf.replace_selection("there");
        assert_eq!(buf.value(), "hello there");
        // Cursor collapses to the end of the insertion
        assert_eq!(buf.selection(), Selection::cursor(Pos::new(0, 11)));
    }

    #[test]
    fn test_replace_with_line_breaks() {
        let mut buf = LineBuffer::from_text("ab");
        buf.set_selection(Selection::cursor(Pos::new(0, 1)));
        buf.replace_selection("\r\r-----\r\r");
        assert_eq!(buf.value(), "a\n\n-----\n\nb");
        assert_eq!(buf.selection(), Selection::cursor(Pos::new(4, 0)));
    }

    #[test]
    fn test_positions_after_change_shift() {
        let mut buf = LineBuffer::from_text("xx\nyy");
        buf.set_selection(Selection::cursor(Pos::new(1, 1)));
        buf.replace_range("a\nb\nc", Pos::new(0, 0), Pos::new(0, 2));
        assert_eq!(buf.value(), "a\nb\nc\nyy");
        assert_eq!(buf.selection(), Selection::cursor(Pos::new(3, 1)));
    }

    #[test]
    fn test_replace_line() {
        let mut buf = LineBuffer::from_text("first\nsecond");
        buf.replace_line(1, "* second");
        assert_eq!(buf.value(), "first\n* second");
    }

    #[test]
    fn test_clip_out_of_range() {
        let buf = LineBuffer::from_text("på\nx");
        assert_eq!(buf.clip(Pos::new(9, 9)), Pos::new(1, 1));
        // Mid-char column snaps down
        assert_eq!(buf.clip(Pos::new(0, 2)), Pos::new(0, 1));
    }

    #[test]
    fn test_check_pos() {
        let buf = LineBuffer::from_text("abc");
        assert!(buf.check_pos(Pos::new(0, 3)).is_ok());
        assert!(matches!(
            buf.check_pos(Pos::new(1, 0)),
            Err(Error::InvalidPosition { line: 1, ch: 0 })
        ));
    }

    #[test]
    fn test_undo_redo() {
        let mut buf = LineBuffer::from_text("a");
        buf.replace_line(0, "b");
        buf.replace_line(0, "c");
        assert!(buf.undo());
        assert_eq!(buf.value(), "b");
        assert!(buf.undo());
        assert_eq!(buf.value(), "a");
        assert!(!buf.undo());
        assert!(buf.redo());
        assert_eq!(buf.value(), "b");

        // A new edit clears the redo stack
        buf.undo();
        buf.replace_line(0, "z");
        assert!(!buf.redo());
        assert_eq!(buf.value(), "z");
    }

    #[test]
    fn test_grouped_edits_undo_together() {
        let mut buf = LineBuffer::from_text("a\nb\nc");
        buf.begin_edit();
        for line in 0..3 {
            let text = format!("# {}", buf.line(line).unwrap());
            buf.replace_line(line, &text);
        }
        buf.begin_edit();
        buf.replace_line(0, "# a!");
        buf.end_edit();
        buf.end_edit();
        assert_eq!(buf.value(), "# a!\n# b\n# c");

        assert!(buf.undo());
        assert_eq!(buf.value(), "a\nb\nc");
        assert!(!buf.undo());
        assert!(buf.redo());
        assert_eq!(buf.value(), "# a!\n# b\n# c");
    }

    #[test]
    fn test_empty_group_leaves_history_alone() {
        let mut buf = LineBuffer::from_text("a");
        buf.begin_edit();
        buf.end_edit();
        assert!(!buf.undo());

        // Unbalanced end is ignored
        buf.end_edit();
        buf.replace_line(0, "b");
        assert!(buf.undo());
        assert_eq!(buf.value(), "a");
    }

    #[test]
    fn test_line_wrapping_flag() {
        let mut buf = LineBuffer::default();
        assert!(buf.line_wrapping());
        buf.set_line_wrapping(false);
        assert!(!buf.line_wrapping());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut buf = LineBuffer::from_text("0").with_max_undo(2);
        for i in 1..=5 {
            buf.replace_line(0, &i.to_string());
        }
        assert!(buf.undo());
        assert!(buf.undo());
        assert!(!buf.undo());
        assert_eq!(buf.value(), "3");
    }

    #[test]
    fn test_revision_bumps() {
        let mut buf = LineBuffer::from_text("a");
        let rev = buf.revision();
        buf.set_selection(Selection::cursor(Pos::new(0, 1)));
        assert_eq!(buf.revision(), rev);
        buf.replace_selection("b");
        assert!(buf.revision() > rev);
    }
}
