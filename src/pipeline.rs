use glam::DVec2;
use log::trace;

use crate::geom::Bounds;
use crate::scene::{Node, NodeFlags, NodeId, OffsetMode};
use crate::style::{ComputedStyle, compute_style};
use crate::surface::DrawContext;

/// Runs one full update pass over a tree that has no parent context (a stage
/// root, or any detached subtree treated as its own origin).
pub fn update_root(root: &mut Node) {
    update(root, None, DVec2::ZERO, None);
}

/// One full update pass for a node inside known parent context. The pass is
/// three recursive phases over the subtree:
///
/// 1. prepare: stretch sizing from the parent bounds, `before_update`, then
///    layout-offset reset — everything that fixes sizes.
/// 2. locate + layout: position resolution, `after_locating`, style
///    computation, `update_layout`. A parent's `update_layout` runs before
///    the recursion, so layout offsets it writes are consumed by the
///    children's position step in this same pass.
/// 3. finalize: `after_update` over the fully resolved subtree.
pub fn update(
    node: &mut Node,
    parent_bounds: Option<Bounds>,
    parent_position: DVec2,
    parent_style: Option<&ComputedStyle>,
) {
    if node.core.skips_update() {
        return;
    }
    trace!("update pass for {} <{}>", node.uid(), node.tag());
    prepare(node, parent_bounds);
    locate_and_layout(node, parent_position, parent_style);
    finalize(node);
}

/// Finds the node and runs a full pass on it within its parent's current
/// bounds, position and computed style. Returns false when the node is not
/// in this tree.
pub fn update_by_uid(root: &mut Node, uid: NodeId) -> bool {
    if root.uid() == uid {
        update_root(root);
        return true;
    }
    fn walk(node: &mut Node, uid: NodeId) -> bool {
        let Node {
            core,
            children,
            ..
        } = node;
        for child in children.iter_mut() {
            if child.uid() == uid {
                update(
                    child,
                    Some(core.bounds),
                    core.position,
                    Some(&core.computed_style),
                );
                return true;
            }
            if walk(child, uid) {
                return true;
            }
        }
        false
    }
    walk(root, uid)
}

fn prepare(node: &mut Node, parent_bounds: Option<Bounds>) {
    if node.core.skips_update() {
        return;
    }
    if let Some(parent_bounds) = parent_bounds {
        if let Some(stretch) = node.core.stretch_x {
            node.core.bounds.set_width(parent_bounds.width() * stretch);
        }
        if let Some(stretch) = node.core.stretch_y {
            node.core.bounds.set_height(parent_bounds.height() * stretch);
        }
    }
    let Node {
        core,
        behavior,
        children,
    } = node;
    behavior.before_update(core, children);
    core.layout_offset = DVec2::ZERO;
    if !core.flags.contains(NodeFlags::NO_CHILD_UPDATE) {
        let bounds = core.bounds;
        for child in children.iter_mut() {
            prepare(child, Some(bounds));
        }
    }
}

fn locate_and_layout(node: &mut Node, parent_position: DVec2, parent_style: Option<&ComputedStyle>) {
    if node.core.skips_update() {
        return;
    }
    let Node {
        core,
        behavior,
        children,
    } = node;
    core.position = match core.offset_mode {
        OffsetMode::Absolute => core.offset,
        OffsetMode::Relative => core.offset + parent_position + core.layout_offset,
    };
    core.bounds.set_origin(core.position);
    behavior.after_locating(core, children);
    core.computed_style = compute_style(&core.style, parent_style);
    behavior.update_layout(core, children);
    if !core.flags.contains(NodeFlags::NO_CHILD_UPDATE) {
        let position = core.position;
        for child in children.iter_mut() {
            locate_and_layout(child, position, Some(&core.computed_style));
        }
    }
}

fn finalize(node: &mut Node) {
    if node.core.skips_update() {
        return;
    }
    let Node {
        core,
        behavior,
        children,
    } = node;
    behavior.after_update(core, children);
    if !core.flags.contains(NodeFlags::NO_CHILD_UPDATE) {
        for child in children.iter_mut() {
            finalize(child);
        }
    }
}

/// Re-resolves positions only (position step plus `after_locating`),
/// recursively; style and layout hooks do not run. For propagating a
/// position-affecting mutation made after the main pass.
pub fn locate(node: &mut Node, parent_position: DVec2) {
    if node.core.skips_update() {
        return;
    }
    let Node {
        core,
        behavior,
        children,
    } = node;
    core.position = match core.offset_mode {
        OffsetMode::Absolute => core.offset,
        OffsetMode::Relative => core.offset + parent_position + core.layout_offset,
    };
    core.bounds.set_origin(core.position);
    behavior.after_locating(core, children);
    if !core.flags.contains(NodeFlags::NO_CHILD_UPDATE) {
        let position = core.position;
        for child in children.iter_mut() {
            locate(child, position);
        }
    }
}

/// Finds the node and relocates its subtree within the parent's current
/// position. Returns false when the node is not in this tree.
pub fn locate_by_uid(root: &mut Node, uid: NodeId) -> bool {
    if root.uid() == uid {
        locate(root, DVec2::ZERO);
        return true;
    }
    fn walk(node: &mut Node, uid: NodeId) -> bool {
        let Node { core, children, .. } = node;
        for child in children.iter_mut() {
            if child.uid() == uid {
                locate(child, core.position);
                return true;
            }
            if walk(child, uid) {
                return true;
            }
        }
        false
    }
    walk(root, uid)
}

/// Paints the subtree back-to-front: each node saves the context, applies
/// its computed style, draws itself, then its children in list order (later
/// children over earlier ones), and restores.
pub fn render(node: &mut Node, ctx: &mut dyn DrawContext) {
    if !node.core.is_visible() {
        return;
    }
    let Node {
        core,
        behavior,
        children,
    } = node;
    ctx.save();
    core.computed_style.apply_to(ctx);
    behavior.render_self(core, ctx);
    if !core.flags.contains(NodeFlags::NO_CHILD_RENDER) {
        for child in children.iter_mut() {
            render(child, ctx);
        }
    }
    ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::scene::{Align, AlignX, AlignY, Behavior, Flow, NodeCore};
    use crate::style::Style;

    /// Records which hooks fire and in what order.
    struct Probe {
        label: &'static str,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn node(label: &'static str, journal: &Rc<RefCell<Vec<String>>>) -> Node {
            Node::new(Self {
                label,
                journal: journal.clone(),
            })
        }

        fn log(&self, hook: &str) {
            self.journal.borrow_mut().push(format!("{}:{}", self.label, hook));
        }
    }

    impl Behavior for Probe {
        fn tag(&self) -> &'static str {
            "probe"
        }

        fn before_update(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {
            self.log("before_update");
        }

        fn after_locating(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {
            self.log("after_locating");
        }

        fn update_layout(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {
            self.log("update_layout");
        }

        fn after_update(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {
            self.log("after_update");
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn hooks_fire_in_the_documented_order() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut parent = Probe::node("parent", &journal);
        parent
            .append_child(Probe::node("child", &journal))
            .expect("append");

        update_root(&mut parent);

        let log = journal.borrow();
        assert_eq!(
            *log,
            vec![
                "parent:before_update",
                "child:before_update",
                "parent:after_locating",
                "parent:update_layout",
                "child:after_locating",
                "child:update_layout",
                "parent:after_update",
                "child:after_update",
            ]
        );
    }

    #[test]
    fn stretch_sizes_from_parent_bounds_exactly() {
        let mut parent = Node::group().with_size(250.0, 80.0);
        let child = parent
            .append_child(Node::group().with_stretch_x(0.4).with_stretch_y(1.0))
            .expect("append");

        update_root(&mut parent);

        let child = crate::scene::node_by_uid(&parent, child).expect("child");
        assert_eq!(child.core.bounds.width(), 0.4 * 250.0);
        assert_eq!(child.core.bounds.height(), 80.0);
    }

    #[test]
    fn relative_position_adds_parent_position_and_layout_offset() {
        let mut root = Node::group().with_offset(10.0, 20.0).with_size(300.0, 300.0);
        let mid = root
            .append_child(Node::group().with_offset(5.0, 5.0).with_size(100.0, 100.0))
            .expect("append");

        update_root(&mut root);

        assert_eq!(root.core.position, DVec2::new(10.0, 20.0));
        let mid = crate::scene::node_by_uid(&root, mid).expect("mid");
        assert_eq!(mid.core.position, DVec2::new(15.0, 25.0));
        assert_eq!(mid.core.bounds.origin(), DVec2::new(15.0, 25.0));
    }

    #[test]
    fn absolute_position_ignores_parent_and_layout_offset() {
        let mut root = Node::new(Align::center()).with_offset(50.0, 50.0).with_size(200.0, 200.0);
        let pinned = root
            .append_child(
                Node::group()
                    .with_offset(7.0, 9.0)
                    .with_offset_mode(OffsetMode::Absolute)
                    .with_size(10.0, 10.0),
            )
            .expect("append");

        update_root(&mut root);

        let pinned = crate::scene::node_by_uid(&root, pinned).expect("pinned");
        assert_eq!(pinned.core.position, DVec2::new(7.0, 9.0));
    }

    #[test]
    fn flow_offsets_cascade_into_child_positions_the_same_pass() {
        let mut row = Node::new(Flow::row(10.0)).with_size(400.0, 50.0);
        let first = row
            .append_child(Node::group().with_size(100.0, 50.0))
            .expect("append");
        let second = row
            .append_child(Node::group().with_size(60.0, 50.0))
            .expect("append");
        let third = row
            .append_child(Node::group().with_size(30.0, 50.0))
            .expect("append");

        update_root(&mut row);

        let x = |uid| {
            crate::scene::node_by_uid(&row, uid)
                .expect("child")
                .core
                .position
                .x
        };
        assert_eq!(x(first), 0.0);
        assert_eq!(x(second), 110.0);
        assert_eq!(x(third), 180.0);
    }

    #[test]
    fn align_centers_children_inside_the_container() {
        let mut boxed = Node::new(Align::new(AlignX::Center, AlignY::End)).with_size(200.0, 100.0);
        let child = boxed
            .append_child(Node::group().with_size(50.0, 20.0))
            .expect("append");

        update_root(&mut boxed);

        let child = crate::scene::node_by_uid(&boxed, child).expect("child");
        assert_eq!(child.core.position, DVec2::new(75.0, 80.0));
    }

    #[test]
    fn layout_offsets_do_not_accumulate_across_passes() {
        let mut row = Node::new(Flow::row(0.0)).with_size(300.0, 50.0);
        let second = {
            row.append_child(Node::group().with_size(100.0, 50.0)).expect("append");
            row.append_child(Node::group().with_size(100.0, 50.0)).expect("append")
        };

        update_root(&mut row);
        update_root(&mut row);

        let second = crate::scene::node_by_uid(&row, second).expect("second");
        assert_eq!(second.core.position.x, 100.0);
    }

    #[test]
    fn style_cascade_flows_through_the_pass() {
        let mut root = Node::group().with_style(Style::default().font("12px serif"));
        let mut mid = Node::group();
        let leaf = mid.append_child(Node::group()).expect("append");
        let _mid = root.append_child(mid).expect("append");

        update_root(&mut root);

        let leaf = crate::scene::node_by_uid(&root, leaf).expect("leaf");
        assert_eq!(leaf.core.computed_style.font, "12px serif");
    }

    #[test]
    fn invisible_smart_update_subtree_is_skipped() {
        let mut root = Node::group().with_size(100.0, 100.0);
        let hidden = root
            .append_child(Node::group().with_offset(30.0, 0.0).with_flag(NodeFlags::VISIBLE, false))
            .expect("append");

        update_root(&mut root);
        let node = crate::scene::node_by_uid(&root, hidden).expect("hidden");
        assert_eq!(node.core.position, DVec2::ZERO);

        // Clearing SMART_UPDATE opts the node back into passes while hidden.
        crate::scene::node_by_uid_mut(&mut root, hidden)
            .expect("hidden")
            .core
            .flags
            .remove(NodeFlags::SMART_UPDATE);
        update_root(&mut root);
        let node = crate::scene::node_by_uid(&root, hidden).expect("hidden");
        assert_eq!(node.core.position, DVec2::new(30.0, 0.0));
    }

    #[test]
    fn no_child_update_stops_recursion() {
        let mut root = Node::group()
            .with_size(100.0, 100.0)
            .with_flag(NodeFlags::NO_CHILD_UPDATE, true);
        let child = root
            .append_child(Node::group().with_offset(40.0, 0.0))
            .expect("append");

        update_root(&mut root);

        let child = crate::scene::node_by_uid(&root, child).expect("child");
        assert_eq!(child.core.position, DVec2::ZERO);
    }

    #[test]
    fn locate_moves_positions_without_touching_style() {
        let mut root = Node::group().with_size(100.0, 100.0);
        let child = root
            .append_child(Node::group().with_style(Style::default().font("9px mono")))
            .expect("append");
        update_root(&mut root);

        // Mutate the offset, clear the style, then locate: positions move,
        // stale computed style stays.
        {
            let child = crate::scene::node_by_uid_mut(&mut root, child).expect("child");
            child.core.offset = DVec2::new(25.0, 0.0);
            child.core.style = Style::default();
        }
        assert!(locate_by_uid(&mut root, child));

        let child = crate::scene::node_by_uid(&root, child).expect("child");
        assert_eq!(child.core.position, DVec2::new(25.0, 0.0));
        assert_eq!(child.core.computed_style.font, "9px mono");
    }

    #[test]
    fn update_by_uid_uses_the_parent_context() {
        let mut root = Node::group()
            .with_offset(10.0, 0.0)
            .with_size(200.0, 200.0)
            .with_style(Style::default().font("11px serif"));
        let child = root
            .append_child(Node::group().with_stretch_x(0.5).with_offset(5.0, 5.0))
            .expect("append");
        update_root(&mut root);

        // Change the child's offset and re-run only its subtree.
        crate::scene::node_by_uid_mut(&mut root, child)
            .expect("child")
            .core
            .offset = DVec2::new(50.0, 0.0);
        assert!(update_by_uid(&mut root, child));

        let child = crate::scene::node_by_uid(&root, child).expect("child");
        assert_eq!(child.core.position, DVec2::new(60.0, 0.0));
        assert_eq!(child.core.bounds.width(), 100.0);
        assert_eq!(child.core.computed_style.font, "11px serif");
        assert!(!update_by_uid(&mut root, Node::group().uid()));
    }
}
