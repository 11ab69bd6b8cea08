//! Settings for the notedown editor controller
//!
//! This module defines the `Settings` struct that holds user preferences
//! for timing, preview behaviour and markdown extensions, with serde
//! support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::markdown::MarkdownOptions;
use crate::preview::SyncScrollConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User settings.
///
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
/// This ensures backward compatibility when new fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Timing
    // ─────────────────────────────────────────────────────────────────────────
    /// Quiet period after the last edit before an autosave is requested
    pub autosave_delay_ms: u64,

    /// Quiet period after the last editor scroll before the preview follows
    pub scroll_debounce_ms: u64,

    /// Duration of the preview's animated jump to a new block
    pub scroll_animation_ms: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether the preview follows the editor's scroll position
    pub sync_scroll: bool,

    /// Soft-wrap long lines in the editing surface
    pub line_wrapping: bool,

    /// Maximum undo history depth
    pub max_undo: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────────
    /// Markdown extensions enabled in the preview
    pub markdown: MarkdownOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 1000,
            scroll_debounce_ms: 10,
            scroll_animation_ms: 70,
            sync_scroll: true,
            line_wrapping: true,
            max_undo: crate::editor::DEFAULT_MAX_UNDO,
            markdown: MarkdownOptions::default(),
        }
    }
}

impl Settings {
    /// Minimum autosave delay in milliseconds.
    pub const MIN_AUTOSAVE_DELAY_MS: u64 = 100;
    /// Maximum autosave delay in milliseconds.
    pub const MAX_AUTOSAVE_DELAY_MS: u64 = 60_000;
    /// Maximum scroll debounce in milliseconds.
    pub const MAX_SCROLL_DEBOUNCE_MS: u64 = 1000;
    /// Maximum scroll animation in milliseconds.
    pub const MAX_SCROLL_ANIMATION_MS: u64 = 2000;
    /// Minimum undo history depth.
    pub const MIN_UNDO: usize = 1;
    /// Maximum undo history depth.
    pub const MAX_UNDO: usize = 10_000;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.autosave_delay_ms = self
            .autosave_delay_ms
            .clamp(Self::MIN_AUTOSAVE_DELAY_MS, Self::MAX_AUTOSAVE_DELAY_MS);
        self.scroll_debounce_ms = self.scroll_debounce_ms.min(Self::MAX_SCROLL_DEBOUNCE_MS);
        self.scroll_animation_ms = self.scroll_animation_ms.min(Self::MAX_SCROLL_ANIMATION_MS);
        self.max_undo = self.max_undo.clamp(Self::MIN_UNDO, Self::MAX_UNDO);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    /// Scroll sync configuration derived from these settings.
    pub fn sync_scroll_config(&self) -> SyncScrollConfig {
        SyncScrollConfig {
            enabled: self.sync_scroll,
            animation_duration: Duration::from_millis(self.scroll_animation_ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
