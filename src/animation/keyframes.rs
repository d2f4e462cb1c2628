use log::debug;

use crate::animation::{AnimFrame, AnimProperty, Animate, Timeline, next_animation_id};
use crate::event::StopHandler;
use crate::scene::{Node, NodeId, node_by_uid_mut};

/// One sampled point on a property track, at a normalized timeline offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub offset: f64,
    pub value: f64,
}

impl Keyframe {
    pub const fn new(offset: f64, value: f64) -> Self {
        Self { offset, value }
    }
}

#[derive(Clone, Debug)]
struct Track {
    property: AnimProperty,
    keyframes: Vec<Keyframe>,
}

impl Track {
    /// Value at eased offset `t`: clamped to the first keyframe before it,
    /// linear between bounding keyframes, clamped to the last one after it.
    fn sample(&self, t: f64) -> Option<f64> {
        let first = self.keyframes.first()?;
        if t <= first.offset {
            return Some(first.value);
        }
        for window in self.keyframes.windows(2) {
            if let [a, b] = window
                && t <= b.offset
            {
                let span = b.offset - a.offset;
                if span <= f64::EPSILON {
                    return Some(b.value);
                }
                return Some(a.value + (b.value - a.value) * ((t - a.offset) / span));
            }
        }
        self.keyframes.last().map(|last| last.value)
    }
}

/// Keyframe animation driving scalar properties of one node.
///
/// Tracks whose first keyframe sits past offset 0 get an implicit starting
/// keyframe on the first tick: the property's live value at that moment,
/// inserted at offset 0 into the stored track. Later ticks in the same run
/// reuse it rather than re-reading the (possibly changed) live value.
#[derive(Debug)]
pub struct KeyframeAnimation {
    id: u64,
    target: NodeId,
    timeline: Timeline,
    tracks: Vec<Track>,
    primed: bool,
    on_stop: Option<StopHandler>,
}

impl KeyframeAnimation {
    pub fn new(target: NodeId, timeline: Timeline) -> Self {
        Self {
            id: next_animation_id(),
            target,
            timeline,
            tracks: Vec::new(),
            primed: false,
            on_stop: None,
        }
    }

    /// Adds a property track; keyframes are kept sorted by offset.
    pub fn track(mut self, property: AnimProperty, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.tracks.push(Track {
            property,
            keyframes,
        });
        self
    }

    pub fn on_stop(mut self, handler: StopHandler) -> Self {
        self.on_stop = Some(handler);
        self
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn track_keyframes(&self, property: AnimProperty) -> Option<&[Keyframe]> {
        self.tracks
            .iter()
            .find(|track| track.property == property)
            .map(|track| track.keyframes.as_slice())
    }

    fn prime(&mut self, node: &Node) {
        if self.primed {
            return;
        }
        for track in &mut self.tracks {
            if let Some(first) = track.keyframes.first()
                && first.offset > 0.0
            {
                let live = track.property.read(node);
                track.keyframes.insert(0, Keyframe::new(0.0, live));
            }
        }
        self.primed = true;
    }

    fn apply(&self, node: &mut Node, t: f64) -> bool {
        let mut wrote = false;
        for track in &self.tracks {
            if let Some(value) = track.sample(t) {
                track.property.write(node, value);
                wrote = true;
            }
        }
        wrote
    }

    fn notify(&mut self, finished: bool) {
        if let Some(handler) = &self.on_stop {
            handler.call(finished);
        }
    }
}

impl Animate for KeyframeAnimation {
    fn id(&self) -> u64 {
        self.id
    }

    fn start(&mut self, now: f64) {
        self.timeline.start(now);
    }

    fn tick(&mut self, root: &mut Node, now: f64) -> AnimFrame {
        if !self.timeline.is_started() || self.timeline.is_paused() {
            return AnimFrame::none();
        }
        let Some(node) = node_by_uid_mut(root, self.target) else {
            // The target left the tree; nothing to drive any more.
            self.timeline.stop();
            self.notify(false);
            return AnimFrame::none();
        };
        self.prime(node);
        let Some(raw) = self.timeline.progress(now) else {
            // Still inside the delay.
            return AnimFrame {
                active: true,
                touched: None,
            };
        };
        let eased = if raw >= 1.0 {
            1.0
        } else {
            self.timeline.timing.sample(raw)
        };
        let touched = self.apply(node, eased).then_some(self.target);
        if raw >= 1.0 {
            debug!("animation {} reached the end of its timeline", self.id);
            self.timeline.stop();
            self.notify(true);
            return AnimFrame {
                active: false,
                touched,
            };
        }
        AnimFrame {
            active: true,
            touched,
        }
    }

    fn pause(&mut self, now: f64) {
        self.timeline.pause(now);
    }

    fn resume(&mut self, now: f64) {
        self.timeline.resume(now);
    }

    fn finish(&mut self, root: &mut Node) -> AnimFrame {
        if !self.timeline.is_started() {
            return AnimFrame::none();
        }
        let mut touched = None;
        if let Some(node) = node_by_uid_mut(root, self.target)
            && self.apply(node, 1.0)
        {
            touched = Some(self.target);
        }
        self.timeline.stop();
        self.notify(true);
        AnimFrame {
            active: false,
            touched,
        }
    }

    fn cancel(&mut self, root: &mut Node) -> AnimFrame {
        if !self.timeline.is_started() {
            return AnimFrame::none();
        }
        // Until the first tick ran nothing was applied, so there is nothing
        // to revert.
        let mut touched = None;
        if self.primed
            && let Some(node) = node_by_uid_mut(root, self.target)
            && self.apply(node, 0.0)
        {
            touched = Some(self.target);
        }
        self.timeline.stop();
        self.notify(false);
        AnimFrame {
            active: false,
            touched,
        }
    }
}
