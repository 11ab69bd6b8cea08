//! notedown - markdown editor controller
//!
//! Formatting toggles, list continuation, preview rendering with scroll
//! sync, and debounced autosave for a markdown note editor. The text widget
//! and the preview are abstracted behind [`EditorSurface`] and
//! [`PreviewPane`]; [`LineBuffer`] is an in-memory surface.

pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod preview;
mod string_utils;

pub use controller::{
    Action, ActionOutcome, DialogRequest, EditorController, EditorEvent, NoteData,
};
pub use editor::{EditorSurface, LineBuffer, Pos, Selection};
pub use error::{Error, Result};
pub use markdown::{ComrakRenderer, MarkdownRenderer};
pub use preview::{PreviewPane, ScrollEvent};
