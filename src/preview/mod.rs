//! Preview scroll synchronization module for notedown
//!
//! Keeps a rendered preview pane aligned with the editor's scroll position.

mod sync_scroll;

pub use sync_scroll::{
    swing, PreviewPane, ScrollEvent, SyncOutcome, SyncScrollConfig, SyncScrollState,
};
