//! Buffer positions and selections.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A position in the buffer: zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub line: usize,
    pub ch: usize,
}

impl Pos {
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.ch.cmp(&other.ch))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

/// Parses `line:ch`.
impl FromStr for Pos {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Application(format!("Invalid position '{}', expected LINE:CH", s));
        let (line, ch) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Pos::new(
            line.trim().parse().map_err(|_| invalid())?,
            ch.trim().parse().map_err(|_| invalid())?,
        ))
    }
}

/// A selection range, always normalized so that `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: Pos,
    pub end: Pos,
}

impl Selection {
    /// Create a selection from two anchors in any order.
    pub fn new(a: Pos, b: Pos) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A collapsed selection (plain cursor).
    pub fn cursor(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Parses `line:ch` (a cursor) or `line:ch-line:ch`.
impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((a, b)) => Ok(Selection::new(a.parse()?, b.parse()?)),
            None => Ok(Selection::cursor(s.parse()?)),
        }
    }
}
