use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use glam::DVec2;
use smol_str::SmolStr;

use crate::event::ListenerRegistry;
use crate::geom::Bounds;
use crate::style::{ComputedStyle, Style};

/// Process-unique numeric identity, distinct from the optional user-facing
/// string id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub fn next_node_id() -> NodeId {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u16 {
        /// Rendered; invisible nodes also skip updates under `SMART_UPDATE`.
        const VISIBLE         = 1 << 0;
        /// Eligible as an event target.
        const INTERACTIVE     = 1 << 1;
        /// Transparent to hit testing: never a target itself, children still
        /// searched.
        const PENETRABLE      = 1 << 2;
        /// Update passes skip this subtree unconditionally.
        const NO_UPDATE       = 1 << 3;
        /// Update passes skip this subtree while it is invisible.
        const SMART_UPDATE    = 1 << 4;
        /// The node schedules its children's updates itself.
        const NO_CHILD_UPDATE = 1 << 5;
        /// The node renders its children itself.
        const NO_CHILD_RENDER = 1 << 6;
        /// Stage root; can never be attached as a child.
        const ROOT            = 1 << 7;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::INTERACTIVE | Self::SMART_UPDATE
    }
}

/// How a node's offset vector is interpreted when resolving its position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OffsetMode {
    /// Offset from the parent's resolved position, plus any layout offset
    /// the parent assigned this pass.
    #[default]
    Relative,
    /// Offset from the root; parent position and layout offsets are ignored.
    Absolute,
}

impl OffsetMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "relative" => Some(Self::Relative),
            "absolute" => Some(Self::Absolute),
            _ => None,
        }
    }
}

/// State every node carries regardless of kind. Behaviors receive it
/// alongside the child list, split borrows keeping the two independent.
#[derive(Debug)]
pub struct NodeCore {
    uid: NodeId,
    pub id: Option<SmolStr>,
    pub classes: Vec<SmolStr>,
    pub offset: DVec2,
    pub offset_mode: OffsetMode,
    pub stretch_x: Option<f64>,
    pub stretch_y: Option<f64>,
    /// Transient per-pass nudge written by a layout parent, consumed by this
    /// node's position resolution, reset at the start of every pass.
    pub layout_offset: DVec2,
    /// Resolved absolute position; written by the update pass.
    pub position: DVec2,
    pub bounds: Bounds,
    pub flags: NodeFlags,
    pub style: Style,
    /// Cache of the last style computation; refreshed every update pass.
    pub computed_style: ComputedStyle,
    pub(crate) parent: Option<NodeId>,
    pub listeners: ListenerRegistry,
}

impl NodeCore {
    pub fn new() -> Self {
        Self {
            uid: next_node_id(),
            id: None,
            classes: Vec::new(),
            offset: DVec2::ZERO,
            offset_mode: OffsetMode::Relative,
            stretch_x: None,
            stretch_y: None,
            layout_offset: DVec2::ZERO,
            position: DVec2::ZERO,
            bounds: Bounds::ZERO,
            flags: NodeFlags::default(),
            style: Style::default(),
            computed_style: ComputedStyle::default(),
            parent: None,
            listeners: ListenerRegistry::default(),
        }
    }

    pub fn uid(&self) -> NodeId {
        self.uid
    }

    /// Non-owning back-reference; `None` while detached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(NodeFlags::VISIBLE, visible);
    }

    pub fn is_interactive(&self) -> bool {
        self.flags.contains(NodeFlags::INTERACTIVE)
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.flags.set(NodeFlags::INTERACTIVE, interactive);
    }

    pub fn is_penetrable(&self) -> bool {
        self.flags.contains(NodeFlags::PENETRABLE)
    }

    pub fn set_penetrable(&mut self, penetrable: bool) {
        self.flags.set(NodeFlags::PENETRABLE, penetrable);
    }

    pub fn is_root(&self) -> bool {
        self.flags.contains(NodeFlags::ROOT)
    }

    /// An update pass ignores this node entirely when true.
    pub fn skips_update(&self) -> bool {
        self.flags.contains(NodeFlags::NO_UPDATE)
            || (self.flags.contains(NodeFlags::SMART_UPDATE) && !self.is_visible())
    }
}

impl Default for NodeCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let a = next_node_id();
        let b = next_node_id();
        assert_ne!(a, b);
    }

    #[test]
    fn smart_update_skips_only_invisible_nodes() {
        let mut core = NodeCore::new();
        assert!(!core.skips_update());

        core.set_visible(false);
        assert!(core.skips_update());

        core.flags.remove(NodeFlags::SMART_UPDATE);
        assert!(!core.skips_update());

        core.flags.insert(NodeFlags::NO_UPDATE);
        assert!(core.skips_update());
    }

    #[test]
    fn offset_mode_parses_its_own_names() {
        assert_eq!(OffsetMode::parse("relative"), Some(OffsetMode::Relative));
        assert_eq!(OffsetMode::parse("absolute"), Some(OffsetMode::Absolute));
        assert_eq!(OffsetMode::parse("fixed"), None);
        assert_eq!(OffsetMode::parse(OffsetMode::Absolute.as_str()), Some(OffsetMode::Absolute));
    }
}
