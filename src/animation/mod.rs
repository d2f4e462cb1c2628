use std::sync::atomic::{AtomicU64, Ordering};

mod keyframes;
mod timing;
mod tween;
pub use keyframes::*;
pub use timing::*;
pub use tween::*;

use crate::scene::{Node, NodeId};

static NEXT_ANIMATION_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_animation_id() -> u64 {
    NEXT_ANIMATION_ID.fetch_add(1, Ordering::Relaxed)
}

/// What one animation did with its slice of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimFrame {
    /// Still running and wants the next tick.
    pub active: bool,
    /// Node whose values changed and needs a refresh this frame.
    pub touched: Option<NodeId>,
}

impl AnimFrame {
    pub const fn none() -> Self {
        Self {
            active: false,
            touched: None,
        }
    }
}

/// One running animation as the scheduler sees it. Timestamps are seconds;
/// `tick` advances to `now` and writes values into the tree.
pub trait Animate {
    fn id(&self) -> u64;

    fn start(&mut self, _now: f64) {}

    fn tick(&mut self, root: &mut Node, now: f64) -> AnimFrame;

    fn pause(&mut self, _now: f64) {}

    fn resume(&mut self, _now: f64) {}

    /// Jumps to the end state and stops, flagged finished.
    fn finish(&mut self, _root: &mut Node) -> AnimFrame {
        AnimFrame::none()
    }

    /// Reverts to the start state and stops, flagged not finished.
    fn cancel(&mut self, _root: &mut Node) -> AnimFrame {
        AnimFrame::none()
    }
}

/// Scalar node properties the keyframe engine can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimProperty {
    OffsetX,
    OffsetY,
    Width,
    Height,
    Opacity,
}

impl AnimProperty {
    /// Live value as the scene currently shows it. Opacity reads the
    /// resolved computed value, not the sparse declaration.
    pub fn read(self, node: &Node) -> f64 {
        match self {
            Self::OffsetX => node.core.offset.x,
            Self::OffsetY => node.core.offset.y,
            Self::Width => node.core.bounds.width(),
            Self::Height => node.core.bounds.height(),
            Self::Opacity => node.core.computed_style.opacity,
        }
    }

    /// Opacity writes a local style override so the next style pass keeps it.
    pub fn write(self, node: &mut Node, value: f64) {
        match self {
            Self::OffsetX => node.core.offset.x = value,
            Self::OffsetY => node.core.offset.y = value,
            Self::Width => node.core.bounds.set_width(value),
            Self::Height => node.core.bounds.set_height(value),
            Self::Opacity => node.core.style.opacity = Some(value),
        }
    }
}

/// Run state shared by every animation kind. Durations are milliseconds,
/// timestamps seconds. The pause accumulator keeps paused intervals out of
/// the elapsed-time computation entirely.
#[derive(Clone, Copy, Debug)]
pub struct Timeline {
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub timing: TimeFunction,
    started_at: Option<f64>,
    paused_at: Option<f64>,
    pause_accum: f64,
}

impl Timeline {
    pub const fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            timing: TimeFunction::Linear,
            started_at: None,
            paused_at: None,
            pause_accum: 0.0,
        }
    }

    pub const fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub const fn timing(mut self, timing: TimeFunction) -> Self {
        self.timing = timing;
        self
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn start(&mut self, now: f64) {
        self.started_at = Some(now);
        self.paused_at = None;
        self.pause_accum = 0.0;
    }

    pub fn pause(&mut self, now: f64) {
        if self.started_at.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            self.pause_accum += now - paused_at;
        }
    }

    pub fn stop(&mut self) {
        self.started_at = None;
        self.paused_at = None;
    }

    /// Normalized progress at `now`: `None` while idle or still inside the
    /// delay. While paused this reports progress frozen at the pause moment.
    /// A zero-length duration snaps straight to the end.
    pub fn progress(&self, now: f64) -> Option<f64> {
        let started_at = self.started_at?;
        let end = self.paused_at.unwrap_or(now);
        let elapsed = end - started_at - self.pause_accum;
        let delay = f64::from(self.delay_ms) * 0.001;
        if elapsed < delay {
            return None;
        }
        let duration = f64::from(self.duration_ms) * 0.001;
        if duration <= f64::EPSILON {
            return Some(1.0);
        }
        Some(((elapsed - delay) / duration).clamp(0.0, 1.0))
    }

    /// Progress through the timing function. Raw progress of exactly 1
    /// bypasses the curve so the end state is hit exactly.
    pub fn eased(&self, now: f64) -> Option<f64> {
        let raw = self.progress(now)?;
        Some(if raw >= 1.0 { 1.0 } else { self.timing.sample(raw) })
    }
}
