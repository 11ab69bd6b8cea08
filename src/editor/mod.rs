//! Editor module for notedown
//!
//! Positions, the editing surface seam with its in-memory implementation,
//! and the syntax classifier that tells toggles what is under the cursor.

mod buffer;
mod classify;
mod position;

pub use buffer::{EditorSurface, LineBuffer, DEFAULT_MAX_UNDO};
pub use classify::{classify_position, Classification, SyntaxClass};
pub use position::{Pos, Selection};
