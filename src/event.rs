use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec2;
use rustc_hash::FxHashMap;

use crate::scene::{Node, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerStart,
    PointerMove,
    PointerEnd,
    Click,
    Wheel,
}

/// Identifier of one concurrent contact. Touch contacts use their platform
/// identifier; mouse input uses the fixed synthetic id so both share the same
/// bookkeeping without collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const MOUSE: Self = Self(u64::MAX);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub pointer: PointerId,
    /// Canvas-local coordinates.
    pub point: DVec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelDelta {
    pub x: f64,
    pub y: f64,
    pub mode: WheelDeltaMode,
}

/// Work a listener asks the stage to do once the current dispatch finishes.
/// Listeners never touch the tree or the queues directly; deferring keeps the
/// dispatch walk free of reentrant mutation.
#[derive(Clone, Debug)]
pub enum EventAction {
    AddListener {
        node: NodeId,
        kind: EventKind,
        handler: EventHandler,
        once: bool,
    },
    RemoveListener {
        node: NodeId,
        kind: EventKind,
        handler: EventHandler,
    },
    Edit {
        node: NodeId,
        edit: NodeEdit,
    },
    RequestUpdate(NodeId),
    RequestRender,
}

#[derive(Default)]
struct EventMetaState {
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    cancelable: bool,
    propagation_stopped: bool,
    default_prevented: bool,
    actions: Vec<EventAction>,
}

/// Shared mutable event state. Clones observe each other's changes, so a
/// listener stopping propagation is visible to the dispatching walk.
#[derive(Clone)]
pub struct EventMeta {
    state: Rc<RefCell<EventMetaState>>,
}

impl fmt::Debug for EventMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventMeta")
            .field("target", &state.target)
            .field("current_target", &state.current_target)
            .field("propagation_stopped", &state.propagation_stopped)
            .field("default_prevented", &state.default_prevented)
            .finish()
    }
}

impl EventMeta {
    pub fn new(target: NodeId, cancelable: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(EventMetaState {
                target: Some(target),
                current_target: Some(target),
                cancelable,
                ..EventMetaState::default()
            })),
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        self.state.borrow().target
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.state.borrow().current_target
    }

    pub fn set_current_target(&self, node: NodeId) {
        self.state.borrow_mut().current_target = Some(node);
    }

    pub fn cancelable(&self) -> bool {
        self.state.borrow().cancelable
    }

    pub fn stop_propagation(&self) {
        self.state.borrow_mut().propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.state.borrow().propagation_stopped
    }

    /// No effect on non-cancelable events.
    pub fn prevent_default(&self) {
        let mut state = self.state.borrow_mut();
        if state.cancelable {
            state.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.state.borrow().default_prevented
    }

    pub fn add_listener(&self, node: NodeId, kind: EventKind, handler: EventHandler, once: bool) {
        self.push_action(EventAction::AddListener {
            node,
            kind,
            handler,
            once,
        });
    }

    pub fn remove_listener(&self, node: NodeId, kind: EventKind, handler: EventHandler) {
        self.push_action(EventAction::RemoveListener {
            node,
            kind,
            handler,
        });
    }

    /// Queues a tree edit against the node; the stage applies it after the
    /// bubble completes.
    pub fn edit(&self, node: NodeId, edit: NodeEdit) {
        self.push_action(EventAction::Edit { node, edit });
    }

    pub fn request_update(&self, node: NodeId) {
        self.push_action(EventAction::RequestUpdate(node));
    }

    pub fn request_render(&self) {
        self.push_action(EventAction::RequestRender);
    }

    fn push_action(&self, action: EventAction) {
        self.state.borrow_mut().actions.push(action);
    }

    pub fn take_actions(&self) -> Vec<EventAction> {
        std::mem::take(&mut self.state.borrow_mut().actions)
    }
}

#[derive(Clone, Debug)]
pub struct Event {
    pub kind: EventKind,
    pub meta: EventMeta,
    pub pointer: PointerSample,
    pub wheel: Option<WheelDelta>,
}

impl Event {
    pub fn pointer(kind: EventKind, target: NodeId, sample: PointerSample, cancelable: bool) -> Self {
        Self {
            kind,
            meta: EventMeta::new(target, cancelable),
            pointer: sample,
            wheel: None,
        }
    }

    pub fn wheel(target: NodeId, sample: PointerSample, delta: WheelDelta) -> Self {
        Self {
            kind: EventKind::Wheel,
            meta: EventMeta::new(target, true),
            pointer: sample,
            wheel: Some(delta),
        }
    }

    pub fn stop_propagation(&self) {
        self.meta.stop_propagation();
    }

    pub fn prevent_default(&self) {
        self.meta.prevent_default();
    }
}

fn next_handler_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Cloneable listener callback. Clones share the same underlying closure and
/// compare equal, so a clone can be used to remove the original.
#[derive(Clone)]
pub struct EventHandler {
    id: u64,
    handler: Rc<RefCell<dyn FnMut(&mut Event)>>,
}

impl EventHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: for<'a> FnMut(&'a mut Event) + 'static,
    {
        Self {
            id: next_handler_id(),
            handler: Rc::new(RefCell::new(handler)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn call(&self, event: &mut Event) {
        (self.handler.borrow_mut())(event);
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").field("id", &self.id).finish()
    }
}

impl<F> From<F> for EventHandler
where
    F: for<'a> FnMut(&'a mut Event) + 'static,
{
    fn from(handler: F) -> Self {
        EventHandler::new(handler)
    }
}

/// Deferred mutation of a single node, queued through `EventMeta::edit`.
#[derive(Clone)]
pub struct NodeEdit {
    id: u64,
    edit: Rc<RefCell<dyn FnMut(&mut Node)>>,
}

impl NodeEdit {
    pub fn new<F>(edit: F) -> Self
    where
        F: for<'a> FnMut(&'a mut Node) + 'static,
    {
        Self {
            id: next_handler_id(),
            edit: Rc::new(RefCell::new(edit)),
        }
    }

    pub fn call(&self, node: &mut Node) {
        (self.edit.borrow_mut())(node);
    }
}

impl PartialEq for NodeEdit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for NodeEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEdit").field("id", &self.id).finish()
    }
}

/// Callback fired when an animation stops; the flag is whether it completed
/// naturally (reached the end) rather than being canceled.
#[derive(Clone)]
pub struct StopHandler {
    id: u64,
    handler: Rc<RefCell<dyn FnMut(bool)>>,
}

impl StopHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(bool) + 'static,
    {
        Self {
            id: next_handler_id(),
            handler: Rc::new(RefCell::new(handler)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn call(&self, finished: bool) {
        (self.handler.borrow_mut())(finished);
    }
}

impl PartialEq for StopHandler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for StopHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandler").field("id", &self.id).finish()
    }
}

#[derive(Clone, Debug)]
struct ListenerEntry {
    handler: EventHandler,
    once: bool,
}

/// Per-node listener table: event kind to ordered listener list.
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    listeners: FxHashMap<EventKind, Vec<ListenerEntry>>,
}

impl ListenerRegistry {
    /// Identical (handler, once) pairs are registered once.
    pub fn add(&mut self, kind: EventKind, handler: EventHandler, once: bool) {
        let entries = self.listeners.entry(kind).or_default();
        if entries.iter().any(|e| e.handler == handler && e.once == once) {
            return;
        }
        entries.push(ListenerEntry { handler, once });
    }

    /// Removes every entry registered for this handler, once or not.
    pub fn remove(&mut self, kind: EventKind, handler: &EventHandler) {
        if let Some(entries) = self.listeners.get_mut(&kind) {
            entries.retain(|e| e.handler != *handler);
            if entries.is_empty() {
                self.listeners.remove(&kind);
            }
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Invokes the listeners registered for the event's kind against a frozen
    /// snapshot: entries appearing after the snapshot do not observe this
    /// event, and `once` entries are dropped only after the snapshot ran.
    pub fn dispatch(&mut self, event: &mut Event) {
        let Some(snapshot) = self.listeners.get(&event.kind).cloned() else {
            return;
        };
        let mut fired_once = Vec::new();
        for entry in &snapshot {
            if entry.once {
                fired_once.push(entry.handler.id());
            }
            entry.handler.call(event);
        }
        if fired_once.is_empty() {
            return;
        }
        if let Some(entries) = self.listeners.get_mut(&event.kind) {
            entries.retain(|e| !(e.once && fired_once.contains(&e.handler.id())));
            if entries.is_empty() {
                self.listeners.remove(&event.kind);
            }
        }
    }
}
