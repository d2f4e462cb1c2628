use std::fmt;

use glam::DVec2;
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::event::{Event, EventHandler, EventKind};
use crate::scene::{Behavior, Group, NodeCore, NodeFlags, NodeId, OffsetMode};
use crate::style::Style;

/// One entry in the scene tree: shared core state, a kind-specific behavior,
/// and owned children. The child list is the owning side of the tree; the
/// core's parent id is a lookup-only back-reference.
///
/// Structural edits go through the methods here so the parent back-references
/// stay consistent. Attaching takes the node by value, which is what enforces
/// detach-then-attach: an attached node is owned by its parent, so it has to
/// be removed (returning ownership) before it can go anywhere else.
pub struct Node {
    pub core: NodeCore,
    pub behavior: Box<dyn Behavior>,
    pub(crate) children: Vec<Node>,
}

impl Node {
    pub fn new(behavior: impl Behavior) -> Self {
        Self {
            core: NodeCore::new(),
            behavior: Box::new(behavior),
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(Group)
    }

    pub fn uid(&self) -> NodeId {
        self.core.uid()
    }

    pub fn tag(&self) -> &'static str {
        self.behavior.tag()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable access to the children themselves; structural changes still
    /// require the methods below.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub fn behavior_as<T: Behavior>(&self) -> Option<&T> {
        self.behavior.as_any().downcast_ref()
    }

    pub fn behavior_as_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.behavior.as_any_mut().downcast_mut()
    }

    // Builder surface, used by factories, demos and tests.

    pub fn with_id(mut self, id: impl Into<SmolStr>) -> Self {
        self.core.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<SmolStr>) -> Self {
        self.core.classes.push(class.into());
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.core.offset = DVec2::new(x, y);
        self
    }

    pub fn with_offset_mode(mut self, mode: OffsetMode) -> Self {
        self.core.offset_mode = mode;
        self
    }

    /// Sets bounds width/height, leaving the origin for position resolution.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.core.bounds.set_width(width);
        self.core.bounds.set_height(height);
        self
    }

    pub fn with_stretch_x(mut self, stretch: f64) -> Self {
        self.core.stretch_x = Some(stretch);
        self
    }

    pub fn with_stretch_y(mut self, stretch: f64) -> Self {
        self.core.stretch_y = Some(stretch);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.core.style = style;
        self
    }

    pub fn with_flag(mut self, flag: NodeFlags, value: bool) -> Self {
        self.core.flags.set(flag, value);
        self
    }

    // Structural operations.

    /// Appends as the last (topmost-painting) child.
    pub fn append_child(&mut self, mut child: Node) -> Result<NodeId> {
        if child.core.is_root() {
            return Err(Error::RootAsChild(child.uid()));
        }
        let uid = child.uid();
        child.core.parent = Some(self.uid());
        self.children.push(child);
        Ok(uid)
    }

    /// Inserts before the child identified by `reference`.
    pub fn insert_before(&mut self, reference: NodeId, mut child: Node) -> Result<NodeId> {
        if child.core.is_root() {
            return Err(Error::RootAsChild(child.uid()));
        }
        let index = self
            .child_index(reference)
            .ok_or(Error::ChildNotFound(reference))?;
        let uid = child.uid();
        child.core.parent = Some(self.uid());
        self.children.insert(index, child);
        Ok(uid)
    }

    /// Swaps the child identified by `old` for `child`, returning the
    /// detached old child with its parent reference cleared.
    pub fn replace_child(&mut self, old: NodeId, mut child: Node) -> Result<Node> {
        if child.core.is_root() {
            return Err(Error::RootAsChild(child.uid()));
        }
        let index = self.child_index(old).ok_or(Error::ChildNotFound(old))?;
        child.core.parent = Some(self.uid());
        let mut removed = std::mem::replace(&mut self.children[index], child);
        removed.core.parent = None;
        Ok(removed)
    }

    /// Detaches and returns the child identified by `target`.
    pub fn remove_child(&mut self, target: NodeId) -> Result<Node> {
        let index = self.child_index(target).ok_or(Error::ChildNotFound(target))?;
        let mut removed = self.children.remove(index);
        removed.core.parent = None;
        Ok(removed)
    }

    fn child_index(&self, uid: NodeId) -> Option<usize> {
        self.children.iter().position(|c| c.uid() == uid)
    }

    /// True for the node itself and for any descendant.
    pub fn contains(&self, uid: NodeId) -> bool {
        self.uid() == uid || self.children.iter().any(|c| c.contains(uid))
    }

    // Queries, all pre-order depth-first.

    /// First node whose string id matches; uniqueness is not enforced, so
    /// duplicates resolve to the first in traversal order.
    pub fn select_id(&self, id: &str) -> Option<&Node> {
        if self.core.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.select_id(id))
    }

    pub fn select_class(&self, class: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect_class(class, &mut found);
        found
    }

    fn collect_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Node>) {
        if self.core.classes.iter().any(|c| c == class) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_class(class, found);
        }
    }

    pub fn select_tag(&self, tag: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect_tag(tag, &mut found);
        found
    }

    fn collect_tag<'a>(&'a self, tag: &str, found: &mut Vec<&'a Node>) {
        if self.tag() == tag {
            found.push(self);
        }
        for child in &self.children {
            child.collect_tag(tag, found);
        }
    }

    // Listeners.

    /// Registers a listener and hands back the handler for later removal.
    pub fn on(&mut self, kind: EventKind, handler: impl Into<EventHandler>) -> EventHandler {
        let handler = handler.into();
        self.core.listeners.add(kind, handler.clone(), false);
        handler
    }

    /// Registers a listener removed after its first invocation.
    pub fn once(&mut self, kind: EventKind, handler: impl Into<EventHandler>) -> EventHandler {
        let handler = handler.into();
        self.core.listeners.add(kind, handler.clone(), true);
        handler
    }

    pub fn off(&mut self, kind: EventKind, handler: &EventHandler) {
        self.core.listeners.remove(kind, handler);
    }

    /// Fires this node's own listeners without bubbling; the stage drives
    /// bubbling along hit paths and ancestry.
    pub fn dispatch_local(&mut self, event: &mut Event) {
        event.meta.set_current_target(self.uid());
        self.core.listeners.dispatch(event);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("uid", &self.uid())
            .field("tag", &self.tag())
            .field("id", &self.core.id)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized_group(width: f64, height: f64) -> Node {
        Node::group().with_size(width, height)
    }

    fn assert_consistent(node: &Node) {
        for child in node.children() {
            assert_eq!(child.core.parent(), Some(node.uid()));
            assert_consistent(child);
        }
    }

    #[test]
    fn append_links_parent_and_membership() {
        let mut parent = Node::group();
        let child = Node::group();
        let child_uid = parent.append_child(child).expect("append should succeed");

        assert_eq!(parent.children().len(), 1);
        assert_eq!(parent.children()[0].uid(), child_uid);
        assert_consistent(&parent);
    }

    #[test]
    fn remove_clears_the_parent_reference() {
        let mut parent = Node::group();
        let uid = parent.append_child(Node::group()).expect("append");

        let detached = parent.remove_child(uid).expect("remove");
        assert_eq!(detached.core.parent(), None);
        assert!(parent.children().is_empty());
    }

    #[test]
    fn removing_an_unknown_child_is_an_error() {
        let mut parent = Node::group();
        let stranger = Node::group();
        let uid = stranger.uid();
        let err = parent.remove_child(uid).unwrap_err();
        assert_eq!(err, Error::ChildNotFound(uid));
    }

    #[test]
    fn moving_a_node_requires_detaching_first() {
        let mut a = Node::group();
        let mut b = Node::group();
        let uid = a.append_child(Node::group()).expect("append");

        let detached = a.remove_child(uid).expect("remove");
        b.append_child(detached).expect("re-append");

        assert!(a.children().is_empty());
        assert_eq!(b.children()[0].core.parent(), Some(b.uid()));
        assert_consistent(&b);
    }

    #[test]
    fn insert_before_preserves_order() {
        let mut parent = Node::group();
        let first = parent.append_child(Node::group()).expect("append");
        let third = parent.append_child(Node::group()).expect("append");
        let second = parent
            .insert_before(third, Node::group())
            .expect("insert_before");

        let order: Vec<NodeId> = parent.children().iter().map(Node::uid).collect();
        assert_eq!(order, vec![first, second, third]);
        assert_consistent(&parent);
    }

    #[test]
    fn insert_before_unknown_reference_fails() {
        let mut parent = Node::group();
        let ghost = Node::group().uid();
        let err = parent.insert_before(ghost, Node::group()).unwrap_err();
        assert_eq!(err, Error::ChildNotFound(ghost));
    }

    #[test]
    fn replace_swaps_atomically() {
        let mut parent = Node::group();
        let old_uid = parent.append_child(Node::group()).expect("append");
        let replacement = Node::group();
        let new_uid = replacement.uid();

        let removed = parent.replace_child(old_uid, replacement).expect("replace");

        assert_eq!(removed.uid(), old_uid);
        assert_eq!(removed.core.parent(), None);
        assert_eq!(parent.children().len(), 1);
        assert_eq!(parent.children()[0].uid(), new_uid);
        assert_consistent(&parent);
    }

    #[test]
    fn a_root_node_cannot_become_a_child() {
        let mut parent = Node::group();
        let root = Node::group().with_flag(NodeFlags::ROOT, true);
        let uid = root.uid();
        let err = parent.append_child(root).unwrap_err();
        assert_eq!(err, Error::RootAsChild(uid));
    }

    #[test]
    fn contains_matches_self_and_descendants() {
        let mut root = Node::group();
        let mut mid = Node::group();
        let leaf_uid = mid.append_child(Node::group()).expect("append");
        let mid_uid = root.append_child(mid).expect("append");

        assert!(root.contains(root.uid()));
        assert!(root.contains(mid_uid));
        assert!(root.contains(leaf_uid));
        assert!(!root.contains(Node::group().uid()));
    }

    #[test]
    fn select_id_returns_the_first_match_in_preorder() {
        let mut root = Node::group();
        let mut left = Node::group();
        left.append_child(Node::group().with_id("dup")).expect("append");
        let left_child_uid = left.children()[0].uid();
        root.append_child(left).expect("append");
        root.append_child(Node::group().with_id("dup")).expect("append");

        let hit = root.select_id("dup").expect("should find a match");
        assert_eq!(hit.uid(), left_child_uid);
        assert!(root.select_id("missing").is_none());
    }

    #[test]
    fn select_class_and_tag_collect_in_traversal_order() {
        let mut root = Node::group().with_class("panel");
        let mut inner = Node::group().with_class("panel");
        inner
            .append_child(Node::group().with_class("panel"))
            .expect("append");
        root.append_child(inner).expect("append");

        let panels = root.select_class("panel");
        assert_eq!(panels.len(), 3);
        assert_eq!(panels[0].uid(), root.uid());

        assert_eq!(root.select_tag("group").len(), 3);
        assert!(root.select_tag("rect").is_empty());
    }

    #[test]
    fn sized_builder_keeps_the_origin_for_the_pipeline() {
        let node = sized_group(120.0, 40.0);
        assert_eq!(node.core.bounds.width(), 120.0);
        assert_eq!(node.core.bounds.height(), 40.0);
        assert_eq!(node.core.bounds.left, 0.0);
        assert_eq!(node.core.bounds.top, 0.0);
    }
}
