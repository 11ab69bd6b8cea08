//! Editor controller for notedown
//!
//! [`EditorController`] binds an editing surface to the markdown toggles,
//! the preview renderer and the host application:
//!
//! - key presses and toolbar actions become buffer edits;
//! - link and attachment actions park a [`DialogRequest`] until the host
//!   answers it with [`EditorController::resolve_dialog`];
//! - every change re-renders the preview and restarts the autosave timer;
//! - editor scrolls are debounced and handed to scroll sync.
//!
//! The controller never talks to the host directly. Results are queued as
//! [`EditorEvent`]s that the host drains once per frame.
//!
//! # Example
//! ```ignore
//! let mut controller = EditorController::new(LineBuffer::from_text(text), ComrakRenderer::default())?;
//! controller.on_view_action("bold", Instant::now())?;
//! for event in controller.drain_events() {
//!     // update preview, save, highlight toolbar
//! }
//! ```

mod actions;
mod debounce;

pub use actions::{action_for_key, Action};
pub use debounce::Debouncer;

use egui::{Key, Modifiers};
use log::{debug, info};
use serde::Serialize;
use std::time::Instant;

use crate::config::Settings;
use crate::editor::{Classification, EditorSurface, Pos, SyntaxClass};
use crate::error::Result;
use crate::markdown::{
    insert_attachment, insert_horizontal_rule, insert_link, newline_and_continue,
    toggle_code_block, toggle_heading, toggle_inline, toggle_list, MarkdownRenderer,
};
use crate::preview::{PreviewPane, ScrollEvent, SyncOutcome, SyncScrollState};

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Input the controller is waiting for from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogRequest {
    /// Ask the user for a link URL
    Link,
    /// Ask the user to pick an attachment; the answer is the markup to insert
    Attachment,
}

/// Result of running an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The buffer changed
    Edited,
    /// The buffer was left alone
    Unchanged,
    /// The action needs a dialog answer first
    AwaitingDialog(DialogRequest),
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The buffer changed and the preview was re-rendered
    ContentChanged {
        /// Increases with every render; older versions are stale
        version: u64,
        html: String,
        tags: Vec<String>,
    },
    /// The buffer has been quiet long enough to save
    AutoSave,
    /// Syntax classes under the cursor, for toolbar state
    CursorState(Classification),
}

/// Note contents as handed to the note model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteData {
    pub content: String,
    pub tags: Vec<String>,
    pub tasks: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Drives an editing surface on behalf of the host application.
pub struct EditorController<E, R> {
    editor: E,
    renderer: R,
    autosave: Debouncer<()>,
    scroll: Debouncer<ScrollEvent>,
    sync: SyncScrollState,
    pending_dialog: Option<DialogRequest>,
    events: Vec<EditorEvent>,
    version: u64,
    html: String,
    tags: Vec<String>,
}

impl<E: EditorSurface, R: MarkdownRenderer> EditorController<E, R> {
    /// Create a controller with default settings.
    pub fn new(editor: E, renderer: R) -> Result<Self> {
        Self::with_settings(editor, renderer, &Settings::default())
    }

    /// Create a controller and render the initial preview.
    pub fn with_settings(editor: E, renderer: R, settings: &Settings) -> Result<Self> {
        let mut controller = Self {
            editor,
            renderer,
            autosave: Debouncer::new(settings.autosave_delay()),
            scroll: Debouncer::new(settings.scroll_debounce()),
            sync: SyncScrollState::with_config(settings.sync_scroll_config()),
            pending_dialog: None,
            events: Vec::new(),
            version: 0,
            html: String::new(),
            tags: Vec::new(),
        };
        controller.editor.set_line_wrapping(settings.line_wrapping);
        controller.update_preview()?;
        Ok(controller)
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    /// HTML of the latest render.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Version of the latest render.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pending_dialog(&self) -> Option<DialogRequest> {
        self.pending_dialog
    }

    pub fn set_sync_scroll(&mut self, enabled: bool) {
        self.sync.set_enabled(enabled);
        if !enabled {
            self.scroll.cancel();
        }
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Run an action against the buffer.
    ///
    /// Edits made by one action undo as a single step.
    pub fn run(&mut self, action: Action, now: Instant) -> Result<ActionOutcome> {
        debug!("running action {}", action);
        let before = self.editor.revision();

        match action {
            Action::Link => return Ok(self.request_dialog(DialogRequest::Link)),
            Action::Attachment => return Ok(self.request_dialog(DialogRequest::Attachment)),
            Action::Undo => {
                self.editor.undo();
            }
            Action::Redo => {
                self.editor.redo();
            }
            _ => {
                self.editor.begin_edit();
                apply_edit(&mut self.editor, action);
                self.editor.end_edit();
            }
        }

        self.finish_edit(before, now)
    }

    /// Run the action bound to a key press, if any.
    pub fn handle_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        now: Instant,
    ) -> Result<Option<ActionOutcome>> {
        match action_for_key(key, modifiers) {
            Some(action) => self.run(action, now).map(Some),
            None => Ok(None),
        }
    }

    /// Run an action by its toolbar name. Unknown names are ignored.
    pub fn on_view_action(&mut self, name: &str, now: Instant) -> Result<Option<ActionOutcome>> {
        match name.parse::<Action>() {
            Ok(action) => self.run(action, now).map(Some),
            Err(e) => {
                debug!("ignoring view action: {}", e);
                Ok(None)
            }
        }
    }

    fn request_dialog(&mut self, request: DialogRequest) -> ActionOutcome {
        if let Some(previous) = self.pending_dialog.replace(request) {
            debug!("dialog {:?} replaced by {:?}", previous, request);
        }
        ActionOutcome::AwaitingDialog(request)
    }

    /// Answer the pending dialog. `None` or an empty answer cancels it.
    pub fn resolve_dialog(&mut self, answer: Option<String>, now: Instant) -> Result<ActionOutcome> {
        let Some(request) = self.pending_dialog.take() else {
            return Ok(ActionOutcome::Unchanged);
        };
        let Some(answer) = answer.filter(|a| !a.trim().is_empty()) else {
            debug!("dialog {:?} cancelled", request);
            return Ok(ActionOutcome::Unchanged);
        };

        let before = self.editor.revision();
        self.editor.begin_edit();
        match request {
            DialogRequest::Link => insert_link(&mut self.editor, &answer),
            DialogRequest::Attachment => insert_attachment(&mut self.editor, &answer),
        }
        self.editor.end_edit();
        self.finish_edit(before, now)
    }

    fn finish_edit(&mut self, before: u64, now: Instant) -> Result<ActionOutcome> {
        if self.editor.revision() == before {
            return Ok(ActionOutcome::Unchanged);
        }
        self.on_change(now)?;
        Ok(ActionOutcome::Edited)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Events
    // ─────────────────────────────────────────────────────────────────────────

    /// The buffer changed: re-render the preview and restart the autosave
    /// timer.
    pub fn on_change(&mut self, now: Instant) -> Result<()> {
        self.update_preview()?;
        self.autosave.queue((), now);
        Ok(())
    }

    fn update_preview(&mut self) -> Result<()> {
        let rendered = self.renderer.render(&self.editor.value())?;
        self.version += 1;
        self.html = rendered.html;
        self.tags = rendered.tags;
        self.events.push(EditorEvent::ContentChanged {
            version: self.version,
            html: self.html.clone(),
            tags: self.tags.clone(),
        });
        Ok(())
    }

    /// The editor scrolled. The preview follows after the debounce delay.
    pub fn on_scroll(&mut self, event: ScrollEvent, now: Instant) {
        if self.sync.is_enabled() {
            self.scroll.queue(event, now);
        }
    }

    /// The cursor moved: report the syntax under it.
    pub fn on_cursor_activity(&mut self) -> Classification {
        let start = self.editor.selection().start;
        let state = self.editor.classify(start);
        debug!("cursor at {}: {:?}", start, state.labels());
        self.events.push(EditorEvent::CursorState(state.clone()));
        state
    }

    /// Fire due timers and advance the preview animation.
    ///
    /// Returns `true` while there is still timed work outstanding, so the
    /// host knows to keep ticking.
    pub fn tick<P: PreviewPane + ?Sized>(&mut self, now: Instant, preview: &mut P) -> Result<bool> {
        if self.autosave.take_ready(now).is_some() {
            info!("autosave requested");
            self.events.push(EditorEvent::AutoSave);
        }

        if let Some(event) = self.scroll.take_ready(now) {
            let editor = &self.editor;
            let renderer = &self.renderer;
            let outcome = self.sync.sync(event, preview, now, |line| {
                let end = Pos::new(line, usize::MAX);
                let prefix = editor.range_text(Pos::new(0, 0), editor.clip(end));
                renderer.render(&prefix).map(|r| r.blocks)
            })?;
            if outcome != SyncOutcome::Disabled {
                debug!("scroll sync: {:?}", outcome);
            }
        }

        let animating = self.sync.step(preview, now);
        Ok(animating || self.autosave.is_pending() || self.scroll.is_pending())
    }

    /// Current note contents.
    pub fn get_data(&self) -> NoteData {
        NoteData {
            content: self.editor.value(),
            tags: self.tags.clone(),
            tasks: Vec::new(),
        }
    }
}

/// Apply a buffer-editing action. Undo, redo and dialog actions are
/// handled by the controller itself.
fn apply_edit<S: EditorSurface + ?Sized>(surface: &mut S, action: Action) {
    match action {
        Action::Bold => {
            toggle_inline(surface, SyntaxClass::Strong);
        }
        Action::Italic => {
            toggle_inline(surface, SyntaxClass::Em);
        }
        Action::Strikethrough => {
            toggle_inline(surface, SyntaxClass::Strikethrough);
        }
        Action::Heading => {
            toggle_heading(surface);
        }
        Action::Code => {
            toggle_code_block(surface);
        }
        Action::HorizontalRule => insert_horizontal_rule(surface),
        Action::List => {
            toggle_list(surface, SyntaxClass::UnorderedList, None);
        }
        Action::NumberedList => {
            toggle_list(surface, SyntaxClass::OrderedList, Some(1));
        }
        Action::NewLine => {
            newline_and_continue(surface);
        }
        Action::Undo | Action::Redo | Action::Link | Action::Attachment => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
