//! Editor → preview scroll synchronization
//!
//! When the editor scrolls, the preview is brought to the block that
//! corresponds to the editor's top visible line:
//!
//! - the text from the start of the buffer through the top line is rendered
//!   and its top-level blocks counted; the preview block at that index is
//!   the target;
//! - if the target is the same as last time, the preview is nudged by the
//!   editor's own scroll delta so small scrolls inside one long block still
//!   move the preview;
//! - otherwise the preview animates to the target with swing easing.
//!
//! Animation is driven by [`SyncScrollState::step`] with an explicit clock,
//! so hosts call it from their frame loop and tests can step it
//! deterministically.
//!
//! # Usage
//!
//! ```ignore
//! let mut sync = SyncScrollState::new();
//! sync.sync(event, &mut preview, now, |line| count_blocks_through(line))?;
//! while sync.step(&mut preview, Instant::now()) { /* next frame */ }
//! ```

use log::debug;
use std::f32::consts::PI;
use std::time::{Duration, Instant};

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for sync scrolling behavior.
#[derive(Debug, Clone)]
pub struct SyncScrollConfig {
    /// Whether the preview follows the editor at all
    pub enabled: bool,
    /// Duration of the animated jump to a new block (default: 70ms)
    pub animation_duration: Duration,
}

impl Default for SyncScrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            animation_duration: Duration::from_millis(70),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Seams
// ─────────────────────────────────────────────────────────────────────────────

/// An editor scroll, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Editor scroll offset in pixels
    pub scroll_top: f32,
    /// First visible line in the editor
    pub top_line: usize,
}

/// The rendered preview the editor drives.
pub trait PreviewPane {
    fn scroll_top(&self) -> f32;

    fn set_scroll_top(&mut self, offset: f32);

    /// Vertical offset of the top-level block at `index`, if it exists.
    fn block_offset(&self, index: usize) -> Option<f32>;
}

/// What a sync did to the preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Sync is turned off
    Disabled,
    /// Editor is at the top; preview jumped to 0
    Snapped,
    /// Same target as before; preview moved by the editor's delta
    Nudged(f32),
    /// Animation started towards this offset
    Animating(f32),
    /// The preview has no block for the editor's position
    NoTarget,
}

// ─────────────────────────────────────────────────────────────────────────────
// Easing
// ─────────────────────────────────────────────────────────────────────────────

/// Swing easing: slow at both ends.
pub fn swing(progress: f32) -> f32 {
    0.5 - (progress * PI).cos() / 2.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync Scroll State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Animation {
    from: f32,
    to: f32,
    start: Instant,
}

/// Remembered scroll positions and the running animation.
#[derive(Debug, Clone, Default)]
pub struct SyncScrollState {
    config: SyncScrollConfig,
    /// Preview offset of the last target block
    last_target: Option<f32>,
    /// Editor scroll offset when the last target was chosen
    last_editor_top: Option<f32>,
    animation: Option<Animation>,
}

impl SyncScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SyncScrollConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Forget remembered positions and stop animating.
    pub fn reset(&mut self) {
        self.last_target = None;
        self.last_editor_top = None;
        self.animation = None;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Bring the preview in line with an editor scroll.
    ///
    /// `count_blocks(line)` renders the buffer from its start through the end
    /// of `line` and returns the number of top-level blocks. It is only
    /// called when the editor is scrolled away from the top.
    pub fn sync<P, F>(
        &mut self,
        event: ScrollEvent,
        preview: &mut P,
        now: Instant,
        count_blocks: F,
    ) -> Result<SyncOutcome>
    where
        P: PreviewPane + ?Sized,
        F: FnOnce(usize) -> Result<usize>,
    {
        if !self.config.enabled {
            return Ok(SyncOutcome::Disabled);
        }

        if event.scroll_top <= 0.0 {
            self.reset();
            preview.set_scroll_top(0.0);
            return Ok(SyncOutcome::Snapped);
        }

        let index = count_blocks(event.top_line)?;
        let Some(target) = preview.block_offset(index) else {
            debug!("no preview block {} for line {}", index, event.top_line);
            return Ok(SyncOutcome::NoTarget);
        };

        if let (Some(last_target), Some(last_top)) = (self.last_target, self.last_editor_top) {
            if last_target == target {
                let delta = event.scroll_top - last_top;
                match self.animation.as_mut() {
                    Some(animation) => animation.to += delta,
                    None => preview.set_scroll_top(preview.scroll_top() + delta),
                }
                self.last_editor_top = Some(event.scroll_top);
                return Ok(SyncOutcome::Nudged(delta));
            }
        }

        self.animation = Some(Animation {
            from: preview.scroll_top(),
            to: target,
            start: now,
        });
        self.last_target = Some(target);
        self.last_editor_top = Some(event.scroll_top);
        debug!("preview animating to block {} at {}", index, target);
        Ok(SyncOutcome::Animating(target))
    }

    /// Advance the animation to `now`. Returns `true` while it is still
    /// running.
    pub fn step<P: PreviewPane + ?Sized>(&mut self, preview: &mut P, now: Instant) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };

        let duration = self.config.animation_duration.as_secs_f32();
        let elapsed = now.saturating_duration_since(animation.start).as_secs_f32();
        let progress = if duration > 0.0 {
            (elapsed / duration).min(1.0)
        } else {
            1.0
        };

        if progress >= 1.0 {
            preview.set_scroll_top(animation.to);
            self.animation = None;
            return false;
        }

        let eased = swing(progress);
        preview.set_scroll_top(animation.from + (animation.to - animation.from) * eased);
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
