use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::animation::{AnimFrame, Animate};
use crate::event::{
    Event, EventAction, EventKind, PointerId, PointerSample, WheelDelta, WheelDeltaMode,
};
use crate::geom::Bounds;
use crate::pipeline;
use crate::scene::{Node, NodeFlags, NodeId, ancestry_of, detect_target, node_by_uid_mut};
use crate::schedule::{FramePump, Scheduler, SharedAnimation};
use crate::surface::Surface;
use crate::util::Debounce;

/// How long a resize burst has to settle before the stage re-lays-out.
const RESIZE_SETTLE_SECONDS: f64 = 0.15;

/// Bookkeeping for one contact whose start event hit a target. The
/// `None` slot in the pointer table marks a contact that started outside
/// every interactive node.
#[derive(Clone, Copy, Debug)]
struct RecordedStart {
    target: NodeId,
    default_prevented: bool,
}

/// The tree's top end: owns the root node and the drawing surface, feeds raw
/// input through hit testing into bubbling events, and runs the per-frame
/// pipeline the scheduler coalesces.
///
/// Everything here is single-threaded and frame-driven. The embedder calls
/// the input entry points as events arrive and `run_frame` whenever the
/// injected [`FramePump`] fires; within one frame, animations run before node
/// updates before renders, so freshly animated values are always visible in
/// that frame's paint.
pub struct Stage<S: Surface> {
    root: Node,
    surface: S,
    scheduler: Rc<RefCell<Scheduler>>,
    pointers: FxHashMap<PointerId, Option<RecordedStart>>,
    ignore_hover: bool,
    resize: Debounce,
    animations: FxHashMap<u64, SharedAnimation>,
}

impl<S: Surface> Stage<S> {
    pub fn new(surface: S, pump: Rc<dyn FramePump>) -> Self {
        let mut root = Node::group().with_flag(NodeFlags::ROOT, true);
        root.core.bounds = Bounds::from_origin_size(DVec2::ZERO, surface.width(), surface.height());
        root.core.style.pixel_ratio = Some(surface.pixel_ratio());
        Self {
            root,
            surface,
            scheduler: Rc::new(RefCell::new(Scheduler::new(pump))),
            pointers: FxHashMap::default(),
            ignore_hover: false,
            resize: Debounce::new(RESIZE_SETTLE_SECONDS),
            animations: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> Rc<RefCell<Scheduler>> {
        self.scheduler.clone()
    }

    /// When set, moves and releases of contacts that started outside every
    /// interactive node are dropped instead of hit-tested.
    pub fn set_ignore_hover(&mut self, ignore: bool) {
        self.ignore_hover = ignore;
    }

    // Scheduled work.

    pub fn request_update(&mut self, uid: NodeId) {
        self.scheduler.borrow_mut().request_update(uid);
    }

    pub fn request_render(&mut self) {
        let root = self.root.uid();
        self.scheduler.borrow_mut().request_render(root);
    }

    /// Runs a full synchronous update pass over the whole tree, outside the
    /// frame loop.
    pub fn update_now(&mut self) {
        self.sync_surface();
        pipeline::update_root(&mut self.root);
    }

    /// Clears the surface and paints the whole tree immediately.
    pub fn render_now(&mut self) {
        let area =
            Bounds::from_origin_size(DVec2::ZERO, self.surface.width(), self.surface.height());
        let ctx = self.surface.context();
        ctx.clear(area);
        pipeline::render(&mut self.root, ctx);
    }

    /// Called by the embedder after the surface changed size. The actual
    /// re-layout waits until the resize burst settles, then one frame does a
    /// full update and render.
    pub fn notify_resized(&mut self, now: f64) {
        self.resize.poke(now);
        let root = self.root.uid();
        let mut scheduler = self.scheduler.borrow_mut();
        scheduler.request_render(root);
    }

    fn sync_surface(&mut self) {
        self.root.core.bounds =
            Bounds::from_origin_size(DVec2::ZERO, self.surface.width(), self.surface.height());
        self.root.core.style.pixel_ratio = Some(self.surface.pixel_ratio());
    }

    // Input entry points. Coordinates are raw device coordinates; each entry
    // point maps them through the surface first.

    /// Returns whether a listener prevented the default action.
    pub fn pointer_start(&mut self, pointer: PointerId, x: f64, y: f64) -> bool {
        let point = self.surface.to_local(x, y);
        let path = detect_target(&self.root, point);
        let Some(&target) = path.last() else {
            trace!("pointer {pointer:?} started outside every target");
            self.pointers.insert(pointer, None);
            return false;
        };
        let sample = PointerSample { pointer, point };
        let mut event = Event::pointer(EventKind::PointerStart, target, sample, true);
        let default_prevented = self.bubble(&path, &mut event);
        self.pointers.insert(
            pointer,
            Some(RecordedStart {
                target,
                default_prevented,
            }),
        );
        default_prevented
    }

    pub fn pointer_move(&mut self, pointer: PointerId, x: f64, y: f64) -> bool {
        if self.ignore_hover && !matches!(self.pointers.get(&pointer), Some(Some(_))) {
            return false;
        }
        let point = self.surface.to_local(x, y);
        let path = detect_target(&self.root, point);
        let Some(&target) = path.last() else {
            return false;
        };
        let sample = PointerSample { pointer, point };
        let mut event = Event::pointer(EventKind::PointerMove, target, sample, true);
        self.bubble(&path, &mut event)
    }

    /// Bubbles `pointerend`, then synthesizes a `click` when this contact's
    /// start and end hit the same node and neither event was canceled. The
    /// recorded start is cleared either way.
    pub fn pointer_end(&mut self, pointer: PointerId, x: f64, y: f64) -> bool {
        let started = self.pointers.remove(&pointer);
        if self.ignore_hover && !matches!(started, Some(Some(_))) {
            return false;
        }
        let point = self.surface.to_local(x, y);
        let path = detect_target(&self.root, point);
        let Some(&target) = path.last() else {
            return false;
        };
        let sample = PointerSample { pointer, point };
        let mut event = Event::pointer(EventKind::PointerEnd, target, sample, true);
        let default_prevented = self.bubble(&path, &mut event);
        if let Some(Some(start)) = started
            && start.target == target
            && !start.default_prevented
            && !default_prevented
        {
            debug!("synthesizing click on {target}");
            let mut click = Event::pointer(EventKind::Click, target, sample, true);
            self.bubble(&path, &mut click);
        }
        default_prevented
    }

    /// Deltas arrive in device units and are scaled by the surface pixel
    /// ratio before dispatch.
    pub fn wheel(
        &mut self,
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
        mode: WheelDeltaMode,
    ) -> bool {
        let point = self.surface.to_local(x, y);
        let path = detect_target(&self.root, point);
        let Some(&target) = path.last() else {
            return false;
        };
        let ratio = self.surface.pixel_ratio();
        let sample = PointerSample {
            pointer: PointerId::MOUSE,
            point,
        };
        let delta = WheelDelta {
            x: delta_x * ratio,
            y: delta_y * ratio,
            mode,
        };
        let mut event = Event::wheel(target, sample, delta);
        self.bubble(&path, &mut event)
    }

    /// Programmatic dispatch: bubbles along the target's full tree ancestry.
    /// Returns whether default was prevented; a target outside this tree is a
    /// no-op.
    pub fn dispatch_event(&mut self, event: &mut Event) -> bool {
        let Some(target) = event.meta.target() else {
            return false;
        };
        let path = ancestry_of(&self.root, target);
        if path.is_empty() {
            return false;
        }
        self.bubble(&path, event)
    }

    /// Deepest-to-outermost dispatch along an ancestor path, stopping between
    /// nodes once propagation is stopped, then applying whatever work the
    /// listeners deferred.
    fn bubble(&mut self, path: &[NodeId], event: &mut Event) -> bool {
        for &uid in path.iter().rev() {
            if let Some(node) = node_by_uid_mut(&mut self.root, uid) {
                node.dispatch_local(event);
            }
            if event.meta.propagation_stopped() {
                break;
            }
        }
        self.apply_actions(event.meta.take_actions());
        event.meta.default_prevented()
    }

    fn apply_actions(&mut self, actions: Vec<EventAction>) {
        for action in actions {
            match action {
                EventAction::AddListener {
                    node,
                    kind,
                    handler,
                    once,
                } => {
                    if let Some(node) = node_by_uid_mut(&mut self.root, node) {
                        node.core.listeners.add(kind, handler, once);
                    }
                }
                EventAction::RemoveListener {
                    node,
                    kind,
                    handler,
                } => {
                    if let Some(node) = node_by_uid_mut(&mut self.root, node) {
                        node.core.listeners.remove(kind, &handler);
                    }
                }
                EventAction::Edit { node, edit } => {
                    if let Some(node) = node_by_uid_mut(&mut self.root, node) {
                        edit.call(node);
                    }
                }
                EventAction::RequestUpdate(uid) => {
                    self.scheduler.borrow_mut().request_update(uid);
                }
                EventAction::RequestRender => {
                    let root = self.root.uid();
                    self.scheduler.borrow_mut().request_render(root);
                }
            }
        }
    }

    // Animation control. Handles are the animation ids.

    /// Starts the animation at `now`, retains it for later control, and
    /// registers it with the scheduler.
    pub fn play(&mut self, animation: impl Animate + 'static, now: f64) -> u64 {
        let id = animation.id();
        let shared: SharedAnimation = Rc::new(RefCell::new(animation));
        shared.borrow_mut().start(now);
        self.animations.insert(id, shared.clone());
        self.scheduler.borrow_mut().request_animate(shared);
        id
    }

    /// Freezes progress and stops delivering ticks until resumed.
    pub fn pause_animation(&mut self, id: u64, now: f64) {
        if let Some(animation) = self.animations.get(&id) {
            animation.borrow_mut().pause(now);
            self.scheduler.borrow_mut().cancel_animation(id);
        }
    }

    pub fn resume_animation(&mut self, id: u64, now: f64) {
        if let Some(animation) = self.animations.get(&id) {
            animation.borrow_mut().resume(now);
            self.scheduler.borrow_mut().request_animate(animation.clone());
        }
    }

    /// Jumps to the end state, stops, and queues a refresh of whatever the
    /// final values touched.
    pub fn finish_animation(&mut self, id: u64) {
        if let Some(animation) = self.animations.remove(&id) {
            let frame = animation.borrow_mut().finish(&mut self.root);
            self.scheduler.borrow_mut().cancel_animation(id);
            self.refresh_after_stop(frame);
        }
    }

    /// Reverts to the start state, stops, and queues a refresh.
    pub fn cancel_animation(&mut self, id: u64) {
        if let Some(animation) = self.animations.remove(&id) {
            let frame = animation.borrow_mut().cancel(&mut self.root);
            self.scheduler.borrow_mut().cancel_animation(id);
            self.refresh_after_stop(frame);
        }
    }

    fn refresh_after_stop(&mut self, frame: AnimFrame) {
        if let Some(uid) = frame.touched {
            let root = self.root.uid();
            let mut scheduler = self.scheduler.borrow_mut();
            scheduler.request_update(uid);
            scheduler.request_render(root);
        }
    }

    /// One scheduler tick. Everything queued before this call runs against
    /// the single `now` timestamp, in fixed order: animations, then node
    /// updates, then renders. Nodes an animation touched are updated and the
    /// root repainted within this same tick, not the next one; requests made
    /// by handlers during the tick land in the next frame.
    pub fn run_frame(&mut self, now: f64) {
        if self.resize.fire_due(now) {
            debug!("resize settled, queueing full re-layout");
            let root = self.root.uid();
            let mut scheduler = self.scheduler.borrow_mut();
            scheduler.request_update(root);
            scheduler.request_render(root);
        }
        let work = self.scheduler.borrow_mut().begin_frame();
        self.sync_surface();

        let mut updates = work.updates;
        let mut renders = work.renders;
        for animation in &work.animations {
            let frame = animation.borrow_mut().tick(&mut self.root, now);
            if let Some(uid) = frame.touched {
                if !updates.contains(&uid) {
                    updates.push(uid);
                }
                let root = self.root.uid();
                if !renders.contains(&root) {
                    renders.push(root);
                }
            }
            if frame.active {
                self.scheduler.borrow_mut().request_animate(animation.clone());
            } else {
                self.animations.remove(&animation.borrow().id());
            }
        }

        for &uid in &updates {
            if !pipeline::update_by_uid(&mut self.root, uid) {
                trace!("queued update target {uid} left the tree");
            }
        }

        let root_uid = self.root.uid();
        for uid in renders {
            if uid == root_uid {
                self.render_now();
            }
        }

        // A still-armed debounce keeps the pump loop alive: without follow-up
        // work in the scheduler, `end_frame` would not re-arm and `fire_due`
        // would never be polled again.
        if self.resize.is_armed() {
            self.scheduler.borrow_mut().request_render(root_uid);
        }
        self.scheduler.borrow_mut().end_frame();
    }
}
