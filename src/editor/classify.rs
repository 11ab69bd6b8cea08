//! Syntax classification at a buffer position.
//!
//! A [`Classification`] is the set of markdown constructs the text under a
//! position belongs to. Editing surfaces that have their own tokenizer can
//! build one directly; [`classify_position`] is the line tokenizer used by
//! [`LineBuffer`](super::LineBuffer).
//!
//! The tokenizer reports ordered and unordered list items as distinct
//! classes, so toggle code never has to guess a list kind from the line text.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::position::Pos;
use crate::string_utils::floor_char_boundary;

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Classes
// ─────────────────────────────────────────────────────────────────────────────

/// A markdown construct that can cover a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxClass {
    /// Strong emphasis (`**text**`, `__text__`)
    Strong,
    /// Emphasis (`*text*`, `_text_`)
    Em,
    /// Strikethrough (`~~text~~`)
    Strikethrough,
    /// Fenced code block or inline code span
    Code,
    /// Bullet list item (`*`, `-`, `+`)
    UnorderedList,
    /// Numbered list item (`1.`)
    OrderedList,
    /// ATX heading of the given level
    Heading(u8),
    /// Blockquote line
    Quote,
    /// Inline link `[text](url)`
    Link,
}

impl SyntaxClass {
    /// Stable label used for toolbar button state.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Em => "em",
            Self::Strikethrough => "strikethrough",
            Self::Code => "code",
            Self::UnorderedList => "unordered-list",
            Self::OrderedList => "ordered-list",
            Self::Heading(_) => "header",
            Self::Quote => "quote",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for SyntaxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The set of syntax classes at a position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    classes: Vec<SyntaxClass>,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, ignoring duplicates.
    pub fn insert(&mut self, class: SyntaxClass) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    pub fn contains(&self, class: SyntaxClass) -> bool {
        self.classes.contains(&class)
    }

    /// Heading level, if the position is in a heading.
    pub fn heading_level(&self) -> Option<u8> {
        self.classes.iter().find_map(|c| match c {
            SyntaxClass::Heading(level) => Some(*level),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyntaxClass> {
        self.classes.iter()
    }

    /// Labels of every class, in insertion order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.classes.iter().map(SyntaxClass::label).collect()
    }
}

impl FromIterator<SyntaxClass> for Classification {
    fn from_iter<I: IntoIterator<Item = SyntaxClass>>(iter: I) -> Self {
        let mut classification = Classification::new();
        for class in iter {
            classification.insert(class);
        }
        classification
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Tokenizer
// ─────────────────────────────────────────────────────────────────────────────

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})(?:[ \t]+|$)").expect("valid heading regex"))
}

fn quote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*>[ \t]?").expect("valid quote regex"))
}

fn ordered_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\.\s").expect("valid ordered item regex"))
}

fn unordered_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[*+-]\s").expect("valid unordered item regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!?\[[^\]]*\]\([^)]*\)").expect("valid link regex"))
}

/// Is this line a code fence (```` ``` ```` or `~~~`)?
pub(crate) fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Classify the position `pos` in a buffer made of `lines`.
///
/// Out-of-range positions classify as empty.
pub fn classify_position<S: AsRef<str>>(lines: &[S], pos: Pos) -> Classification {
    let mut classification = Classification::new();
    let Some(line) = lines.get(pos.line) else {
        return classification;
    };
    let line: &str = line.as_ref();

    // Fence state from the lines above; a fence line itself counts as code
    let in_fence = lines[..pos.line]
        .iter()
        .filter(|l| is_fence(l.as_ref()))
        .count()
        % 2
        == 1;
    if in_fence || is_fence(line) {
        classification.insert(SyntaxClass::Code);
        return classification;
    }

    let mut content_start = 0;
    if let Some(caps) = heading_re().captures(line) {
        classification.insert(SyntaxClass::Heading(caps[1].len() as u8));
        content_start = caps[0].len();
    } else {
        if let Some(m) = quote_re().find(line) {
            classification.insert(SyntaxClass::Quote);
            content_start = m.end();
        }
        let rest = &line[content_start..];
        if let Some(m) = ordered_item_re().find(rest) {
            classification.insert(SyntaxClass::OrderedList);
            content_start += m.end();
        } else if let Some(m) = unordered_item_re().find(rest) {
            classification.insert(SyntaxClass::UnorderedList);
            content_start += m.end();
        }
    }

    let ch = floor_char_boundary(line, pos.ch);
    for (class, start, end) in inline_spans(line, content_start) {
        if start <= ch && ch < end {
            classification.insert(class);
        }
    }

    classification
}

/// Inline spans `(class, start, end)` found in `line[from..]`, byte offsets
/// relative to the whole line, delimiters included.
fn inline_spans(line: &str, from: usize) -> Vec<(SyntaxClass, usize, usize)> {
    let mut spans = code_spans(line, from);
    let code: Vec<(usize, usize)> = spans.iter().map(|&(_, s, e)| (s, e)).collect();
    let in_code = |i: usize| code.iter().any(|&(s, e)| s <= i && i < e);

    for m in link_re().find_iter(&line[from..]) {
        let (start, end) = (from + m.start(), from + m.end());
        if !in_code(start) {
            spans.push((SyntaxClass::Link, start, end));
        }
    }

    spans.extend(emphasis_spans(line, from, &in_code));
    spans
}

/// Backtick code spans: a run of N backticks closed by the next run of
/// exactly N backticks.
fn code_spans(line: &str, from: usize) -> Vec<(SyntaxClass, usize, usize)> {
    let bytes = line.as_bytes();
    let runs = delimiter_runs(bytes, from, |b| b == b'`');
    let mut spans = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        let (start, len) = runs[i];
        match runs[i + 1..].iter().position(|&(_, l)| l == len) {
            Some(offset) => {
                let (close, _) = runs[i + 1 + offset];
                spans.push((SyntaxClass::Code, start, close + len));
                i += offset + 2;
            }
            None => i += 1,
        }
    }
    spans
}

/// Runs of identical bytes matching `is_delim`, as `(start, len)`.
fn delimiter_runs(bytes: &[u8], from: usize, is_delim: impl Fn(u8) -> bool) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = from;
    while i < bytes.len() {
        if is_delim(bytes[i]) {
            let start = i;
            while i < bytes.len() && bytes[i] == bytes[start] {
                i += 1;
            }
            runs.push((start, i - start));
        } else {
            i += 1;
        }
    }
    runs
}

struct Opener {
    delim: u8,
    start: usize,
    remaining: usize,
}

/// Emphasis, strong and strikethrough spans via a simplified delimiter
/// stack: closers match the nearest opener of the same character, strong
/// pairs consume two delimiters and emphasis one.
fn emphasis_spans(
    line: &str,
    from: usize,
    in_code: &dyn Fn(usize) -> bool,
) -> Vec<(SyntaxClass, usize, usize)> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut stack: Vec<Opener> = Vec::new();

    let runs = delimiter_runs(bytes, from, |b| matches!(b, b'*' | b'_' | b'~'));
    for (start, len) in runs {
        if in_code(start) {
            continue;
        }
        let delim = bytes[start];
        let prev = line[..start].chars().next_back();
        let next = line[start + len..].chars().next();
        let (mut can_open, mut can_close) = (
            next.is_some_and(|c| !c.is_whitespace()),
            start > from && prev.is_some_and(|c| !c.is_whitespace()),
        );
        if delim == b'_' {
            can_open &= !prev.is_some_and(char::is_alphanumeric);
            can_close &= !next.is_some_and(char::is_alphanumeric);
        }
        if delim == b'~' && len < 2 {
            continue;
        }

        let mut cursor = start;
        let mut remaining = len;
        while can_close && remaining > 0 {
            let Some(j) = stack.iter().rposition(|o| {
                o.delim == delim && (delim != b'~' || (o.remaining >= 2 && remaining >= 2))
            }) else {
                break;
            };
            let opener = &mut stack[j];
            let used = if delim == b'~' || (opener.remaining >= 2 && remaining >= 2) {
                2
            } else {
                1
            };
            let class = match (delim, used) {
                (b'~', _) => SyntaxClass::Strikethrough,
                (_, 2) => SyntaxClass::Strong,
                _ => SyntaxClass::Em,
            };
            spans.push((class, opener.start + opener.remaining - used, cursor + used));
            opener.remaining -= used;
            cursor += used;
            remaining -= used;

            let exhausted = opener.remaining == 0;
            stack.truncate(j + 1);
            if exhausted {
                stack.pop();
            }
        }

        if can_open && remaining > 0 {
            stack.push(Opener {
                delim,
                start: cursor,
                remaining,
            });
        }
    }

    spans
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str, line: usize, ch: usize) -> Classification {
        let lines: Vec<&str> = text.split('\n').collect();
        classify_position(&lines, Pos::new(line, ch))
    }

    #[test]
    fn test_plain_text_is_unclassified() {
        assert!(classify("hello world", 0, 3).is_empty());
    }

    #[test]
    fn test_strong_covers_delimiters() {
        let c = classify("**hello**", 0, 0);
        assert!(c.contains(SyntaxClass::Strong));
        assert!(!c.contains(SyntaxClass::Em));

        let c = classify("**hello**", 0, 2);
        assert!(c.contains(SyntaxClass::Strong));

        // Just past the closing delimiter
        assert!(classify("**hello**", 0, 9).is_empty());
    }

    #[test]
    fn test_em_with_underscores() {
        assert!(classify("_hi_ there", 0, 1).contains(SyntaxClass::Em));
        // Intraword underscores are not emphasis
        assert!(classify("snake_case_name", 0, 6).is_empty());
    }

    #[test]
    fn test_strong_inside_em() {
        let c = classify("***both***", 0, 4);
        assert!(c.contains(SyntaxClass::Strong));
        assert!(c.contains(SyntaxClass::Em));
    }

    #[test]
    fn test_strikethrough() {
        let c = classify("a ~~gone~~ b", 0, 5);
        assert!(c.contains(SyntaxClass::Strikethrough));
        assert!(classify("a ~~gone~~ b", 0, 0).is_empty());
    }

    #[test]
    fn test_unmatched_delimiter_is_plain() {
        assert!(classify("2 * 3 = 6", 0, 4).is_empty());
        assert!(classify("**open only", 0, 4).is_empty());
    }

    #[test]
    fn test_inline_code_masks_emphasis() {
        let c = classify("see `a*b*c` here", 0, 7);
        assert!(c.contains(SyntaxClass::Code));
        assert!(!c.contains(SyntaxClass::Em));
    }

    #[test]
    fn test_fenced_code() {
        let text = "intro\n```\nlet x = 1;\n```\nafter";
        assert!(classify(text, 1, 0).contains(SyntaxClass::Code));
        assert!(classify(text, 2, 3).contains(SyntaxClass::Code));
        assert!(classify(text, 3, 0).contains(SyntaxClass::Code));
        assert!(!classify(text, 4, 0).contains(SyntaxClass::Code));
    }

    #[test]
    fn test_list_kinds_are_distinct() {
        let c = classify("1. first", 0, 4);
        assert!(c.contains(SyntaxClass::OrderedList));
        assert!(!c.contains(SyntaxClass::UnorderedList));

        let c = classify("  - nested", 0, 0);
        assert!(c.contains(SyntaxClass::UnorderedList));
        assert!(!c.contains(SyntaxClass::OrderedList));
    }

    #[test]
    fn test_bullet_marker_is_not_emphasis() {
        let c = classify("* item *word*", 0, 9);
        assert!(c.contains(SyntaxClass::UnorderedList));
        assert!(c.contains(SyntaxClass::Em));
        assert!(!classify("* item", 0, 3).contains(SyntaxClass::Em));
    }

    #[test]
    fn test_heading_level() {
        let c = classify("### Title", 0, 5);
        assert_eq!(c.heading_level(), Some(3));
        assert_eq!(c.labels(), vec!["header"]);
        assert!(classify("#hashtag", 0, 2).heading_level().is_none());
    }

    #[test]
    fn test_quote_and_link() {
        let c = classify("> see [docs](http://x)", 0, 8);
        assert!(c.contains(SyntaxClass::Quote));
        assert!(c.contains(SyntaxClass::Link));
    }

    #[test]
    fn test_out_of_range_and_mid_char() {
        assert!(classify("abc", 5, 0).is_empty());
        // Column inside a multi-byte char snaps down
        let c = classify("**på**", 0, 4);
        assert!(c.contains(SyntaxClass::Strong));
    }

    #[test]
    fn test_labels() {
        let c: Classification = [SyntaxClass::Strong, SyntaxClass::OrderedList, SyntaxClass::Strong]
            .into_iter()
            .collect();
        assert_eq!(c.labels(), vec!["strong", "ordered-list"]);
    }
}
