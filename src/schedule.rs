use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::animation::Animate;
use crate::scene::NodeId;

/// The embedder's frame source. `schedule` asks for one callback into
/// `Stage::run_frame`; `cancel` withdraws a scheduled-but-unfired one.
/// Browser embeddings map this onto requestAnimationFrame; tests count calls.
pub trait FramePump {
    fn schedule(&self);
    fn cancel(&self);
}

/// Pump for embeddings that poll `run_frame` themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualPump;

impl FramePump for ManualPump {
    fn schedule(&self) {}

    fn cancel(&self) {}
}

pub type SharedAnimation = Rc<RefCell<dyn Animate>>;

/// Work snapshot for one tick, drained out of the scheduler before any of it
/// runs. Requests made while the tick executes land in the next frame.
#[derive(Default)]
pub struct FrameWork {
    pub animations: Vec<SharedAnimation>,
    pub updates: Vec<NodeId>,
    pub renders: Vec<NodeId>,
}

impl FrameWork {
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty() && self.updates.is_empty() && self.renders.is_empty()
    }
}

/// Coalesces redundant work between frames. Every queue has set semantics in
/// insertion order: requesting the same node update, the same root render or
/// the same animation twice buys exactly one slot in the next frame, and the
/// pump is armed once no matter how many requests are pending.
pub struct Scheduler {
    pump: Rc<dyn FramePump>,
    animations: Vec<SharedAnimation>,
    updates: Vec<NodeId>,
    renders: Vec<NodeId>,
    frame_pending: bool,
}

impl Scheduler {
    pub fn new(pump: Rc<dyn FramePump>) -> Self {
        Self {
            pump,
            animations: Vec::new(),
            updates: Vec::new(),
            renders: Vec::new(),
            frame_pending: false,
        }
    }

    pub fn has_work(&self) -> bool {
        !(self.animations.is_empty() && self.updates.is_empty() && self.renders.is_empty())
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn request_update(&mut self, uid: NodeId) {
        if !self.updates.contains(&uid) {
            trace!("queueing update for {uid}");
            self.updates.push(uid);
            self.arm();
        }
    }

    pub fn request_render(&mut self, root: NodeId) {
        if !self.renders.contains(&root) {
            trace!("queueing render of {root}");
            self.renders.push(root);
            self.arm();
        }
    }

    pub fn request_animate(&mut self, animation: SharedAnimation) {
        let id = animation.borrow().id();
        if !self.animations.iter().any(|queued| queued.borrow().id() == id) {
            self.animations.push(animation);
            self.arm();
        }
    }

    pub fn cancel_update(&mut self, uid: NodeId) {
        self.updates.retain(|queued| *queued != uid);
        self.disarm_if_idle();
    }

    pub fn cancel_render(&mut self, root: NodeId) {
        self.renders.retain(|queued| *queued != root);
        self.disarm_if_idle();
    }

    pub fn cancel_animation(&mut self, id: u64) {
        self.animations.retain(|queued| queued.borrow().id() != id);
        self.disarm_if_idle();
    }

    /// Takes everything queued for this tick and clears the pending flag, so
    /// requests made during the tick arm a fresh frame.
    pub fn begin_frame(&mut self) -> FrameWork {
        self.frame_pending = false;
        FrameWork {
            animations: std::mem::take(&mut self.animations),
            updates: std::mem::take(&mut self.updates),
            renders: std::mem::take(&mut self.renders),
        }
    }

    /// Arms the pump again when the tick itself queued follow-up work.
    pub fn end_frame(&mut self) {
        if self.has_work() {
            self.arm();
        }
    }

    fn arm(&mut self) {
        if !self.frame_pending {
            self.frame_pending = true;
            self.pump.schedule();
        }
    }

    fn disarm_if_idle(&mut self) {
        if self.frame_pending && !self.has_work() {
            self.frame_pending = false;
            self.pump.cancel();
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("animations", &self.animations.len())
            .field("updates", &self.updates)
            .field("renders", &self.renders)
            .field("frame_pending", &self.frame_pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::animation::AnimFrame;
    use crate::scene::{Node, next_node_id};

    #[derive(Default)]
    struct CountingPump {
        scheduled: Cell<u32>,
        cancelled: Cell<u32>,
    }

    impl FramePump for CountingPump {
        fn schedule(&self) {
            self.scheduled.set(self.scheduled.get() + 1);
        }

        fn cancel(&self) {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }

    struct StubAnimation {
        id: u64,
    }

    impl Animate for StubAnimation {
        fn id(&self) -> u64 {
            self.id
        }

        fn tick(&mut self, _root: &mut Node, _now: f64) -> AnimFrame {
            AnimFrame {
                active: false,
                touched: None,
            }
        }
    }

    fn scheduler() -> (Scheduler, Rc<CountingPump>) {
        let pump = Rc::new(CountingPump::default());
        (Scheduler::new(pump.clone()), pump)
    }

    #[test]
    fn duplicate_requests_share_one_frame() {
        let (mut scheduler, pump) = scheduler();
        let uid = next_node_id();
        scheduler.request_update(uid);
        scheduler.request_update(uid);
        scheduler.request_render(uid);

        assert_eq!(pump.scheduled.get(), 1);
        let work = scheduler.begin_frame();
        assert_eq!(work.updates, vec![uid]);
        assert_eq!(work.renders, vec![uid]);
    }

    #[test]
    fn begin_frame_drains_everything() {
        let (mut scheduler, _pump) = scheduler();
        scheduler.request_update(next_node_id());
        scheduler.request_animate(Rc::new(RefCell::new(StubAnimation { id: 7 })));

        let work = scheduler.begin_frame();
        assert_eq!(work.updates.len(), 1);
        assert_eq!(work.animations.len(), 1);
        assert!(!scheduler.has_work());
        assert!(!scheduler.frame_pending());
        assert!(scheduler.begin_frame().is_empty());
    }

    #[test]
    fn requests_during_a_tick_arm_exactly_one_new_frame() {
        let (mut scheduler, pump) = scheduler();
        scheduler.request_render(next_node_id());
        let _work = scheduler.begin_frame();

        scheduler.request_render(next_node_id());
        scheduler.request_update(next_node_id());
        scheduler.end_frame();

        assert_eq!(pump.scheduled.get(), 2);
        assert!(scheduler.frame_pending());
    }

    #[test]
    fn end_frame_without_new_work_stays_idle() {
        let (mut scheduler, pump) = scheduler();
        scheduler.request_update(next_node_id());
        let _work = scheduler.begin_frame();
        scheduler.end_frame();

        assert_eq!(pump.scheduled.get(), 1);
        assert!(!scheduler.frame_pending());
    }

    #[test]
    fn cancelling_the_last_request_withdraws_the_frame() {
        let (mut scheduler, pump) = scheduler();
        let uid = next_node_id();
        scheduler.request_update(uid);
        scheduler.cancel_update(uid);

        assert_eq!(pump.cancelled.get(), 1);
        assert!(!scheduler.frame_pending());

        // One queue draining while another still holds work keeps the frame.
        scheduler.request_update(uid);
        scheduler.request_render(uid);
        scheduler.cancel_update(uid);
        assert!(scheduler.frame_pending());
        assert_eq!(pump.cancelled.get(), 1);
    }

    #[test]
    fn animations_dedupe_by_id() {
        let (mut scheduler, _pump) = scheduler();
        let anim = Rc::new(RefCell::new(StubAnimation { id: 3 }));
        scheduler.request_animate(anim.clone());
        scheduler.request_animate(anim.clone());
        scheduler.request_animate(Rc::new(RefCell::new(StubAnimation { id: 3 })));

        let work = scheduler.begin_frame();
        assert_eq!(work.animations.len(), 1);
    }

    #[test]
    fn cancel_animation_removes_by_id() {
        let (mut scheduler, pump) = scheduler();
        scheduler.request_animate(Rc::new(RefCell::new(StubAnimation { id: 1 })));
        scheduler.request_animate(Rc::new(RefCell::new(StubAnimation { id: 2 })));
        scheduler.cancel_animation(1);
        assert!(scheduler.has_work());
        scheduler.cancel_animation(2);
        assert!(!scheduler.has_work());
        assert_eq!(pump.cancelled.get(), 1);
    }
}
