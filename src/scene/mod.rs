use glam::DVec2;

mod behavior;
mod containers;
mod core;
mod node;
pub use behavior::*;
pub use containers::*;
pub use core::*;
pub use node::*;

/// Finds a node anywhere in the subtree by its numeric id.
pub fn node_by_uid(node: &Node, uid: NodeId) -> Option<&Node> {
    if node.uid() == uid {
        return Some(node);
    }
    node.children().iter().find_map(|c| node_by_uid(c, uid))
}

pub fn node_by_uid_mut(node: &mut Node, uid: NodeId) -> Option<&mut Node> {
    if node.uid() == uid {
        return Some(node);
    }
    node.children_mut()
        .iter_mut()
        .find_map(|c| node_by_uid_mut(c, uid))
}

/// Tree path from `root` down to the node, both inclusive; empty when the
/// node is not in this subtree.
pub fn ancestry_of(root: &Node, uid: NodeId) -> Vec<NodeId> {
    fn walk(node: &Node, uid: NodeId, path: &mut Vec<NodeId>) -> bool {
        path.push(node.uid());
        if node.uid() == uid {
            return true;
        }
        for child in node.children() {
            if walk(child, uid, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    if walk(root, uid, &mut path) { path } else { Vec::new() }
}

/// Hit test: the ordered ancestor path from the outermost candidate down to
/// the deepest interactive node containing the point, or empty when nothing
/// interactive is under it. Empty is the expected miss outcome, not an error.
///
/// Children are tested last-to-first so later siblings, painted on top, win
/// ties. Penetrable nodes are never targets themselves but appear in the
/// path as pass-through ancestors, keeping the path true tree ancestry for
/// bubbling.
pub fn detect_target(node: &Node, point: DVec2) -> Vec<NodeId> {
    if node.core.is_penetrable() {
        for child in node.children().iter().rev() {
            let mut path = detect_target(child, point);
            if !path.is_empty() {
                path.insert(0, node.uid());
                return path;
            }
        }
        return Vec::new();
    }
    if !node.core.is_interactive() || !node.behavior.contains_point(&node.core, point) {
        return Vec::new();
    }
    let mut path = vec![node.uid()];
    descend(node, point, &mut path);
    path
}

/// Extends the path with the topmost hit chain below `node`, penetrable
/// pass-throughs included. Search at each level stops at the first hit.
fn descend(node: &Node, point: DVec2, path: &mut Vec<NodeId>) {
    for child in node.children().iter().rev() {
        if child.core.is_penetrable() {
            let before = path.len();
            path.push(child.uid());
            descend(child, point, path);
            if path.len() == before + 1 {
                // Nothing interactive under the pass-through; keep looking
                // at the siblings beneath it.
                path.pop();
                continue;
            }
            return;
        }
        if child.core.is_interactive() && child.behavior.contains_point(&child.core, point) {
            path.push(child.uid());
            descend(child, point, path);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Bounds;

    fn block(left: f64, top: f64, width: f64, height: f64) -> Node {
        let mut node = Node::group();
        node.core.bounds = Bounds::from_origin_size(DVec2::new(left, top), width, height);
        node
    }

    #[test]
    fn by_uid_walkers_find_nested_nodes() {
        let mut root = Node::group();
        let mut mid = Node::group();
        let leaf = mid.append_child(Node::group()).expect("append");
        let mid_uid = root.append_child(mid).expect("append");

        assert_eq!(node_by_uid(&root, leaf).map(Node::uid), Some(leaf));
        assert!(node_by_uid(&root, Node::group().uid()).is_none());

        node_by_uid_mut(&mut root, leaf)
            .expect("leaf should resolve")
            .core
            .set_visible(false);
        assert!(!node_by_uid(&root, leaf).expect("leaf").core.is_visible());

        assert_eq!(ancestry_of(&root, leaf), vec![root.uid(), mid_uid, leaf]);
        assert!(ancestry_of(&root, Node::group().uid()).is_empty());
    }

    #[test]
    fn hit_returns_the_full_chain_to_the_deepest_node() {
        let mut root = block(0.0, 0.0, 200.0, 200.0);
        let mut panel = block(10.0, 10.0, 100.0, 100.0);
        let button = panel
            .append_child(block(20.0, 20.0, 40.0, 40.0))
            .expect("append");
        let panel_uid = root.append_child(panel).expect("append");

        let path = detect_target(&root, DVec2::new(30.0, 30.0));
        assert_eq!(path, vec![root.uid(), panel_uid, button]);
    }

    #[test]
    fn miss_is_an_empty_path() {
        let root = block(0.0, 0.0, 50.0, 50.0);
        assert!(detect_target(&root, DVec2::new(60.0, 10.0)).is_empty());
    }

    #[test]
    fn later_sibling_wins_the_overlap() {
        let mut root = block(0.0, 0.0, 200.0, 200.0);
        let _under = root.append_child(block(0.0, 0.0, 100.0, 100.0)).expect("append");
        let over = root.append_child(block(50.0, 0.0, 100.0, 100.0)).expect("append");

        // The overlap region belongs to the later-added sibling.
        let path = detect_target(&root, DVec2::new(75.0, 50.0));
        assert_eq!(path, vec![root.uid(), over]);
    }

    #[test]
    fn non_interactive_node_blocks_its_subtree() {
        let mut root = block(0.0, 0.0, 200.0, 200.0);
        let mut wall = block(0.0, 0.0, 100.0, 100.0);
        wall.core.set_interactive(false);
        wall.append_child(block(0.0, 0.0, 100.0, 100.0)).expect("append");
        root.append_child(wall).expect("append");

        let path = detect_target(&root, DVec2::new(10.0, 10.0));
        assert_eq!(path, vec![root.uid()]);
    }

    #[test]
    fn penetrable_wrapper_is_an_ancestor_entry_but_never_the_target() {
        let mut root = block(0.0, 0.0, 200.0, 200.0);
        let mut wrapper = block(0.0, 0.0, 200.0, 200.0);
        wrapper.core.set_penetrable(true);
        let left = wrapper
            .append_child(block(0.0, 0.0, 80.0, 80.0))
            .expect("append");
        wrapper
            .append_child(block(100.0, 0.0, 80.0, 80.0))
            .expect("append");
        let wrapper_uid = root.append_child(wrapper).expect("append");

        let path = detect_target(&root, DVec2::new(40.0, 40.0));
        assert_eq!(path, vec![root.uid(), wrapper_uid, left]);
        assert_ne!(*path.last().expect("non-empty"), wrapper_uid);

        // A point inside the wrapper but outside both children hits nothing
        // below the root: the wrapper itself is transparent.
        let path = detect_target(&root, DVec2::new(90.0, 150.0));
        assert_eq!(path, vec![root.uid()]);
    }

    #[test]
    fn penetrable_root_prepends_itself_to_a_child_hit() {
        let mut root = block(0.0, 0.0, 200.0, 200.0);
        root.core.set_penetrable(true);
        let child = root.append_child(block(10.0, 10.0, 50.0, 50.0)).expect("append");

        let path = detect_target(&root, DVec2::new(20.0, 20.0));
        assert_eq!(path, vec![root.uid(), child]);

        assert!(detect_target(&root, DVec2::new(150.0, 150.0)).is_empty());
    }

    #[test]
    fn empty_penetrable_sibling_does_not_mask_nodes_beneath() {
        let mut root = block(0.0, 0.0, 200.0, 200.0);
        let under = root.append_child(block(0.0, 0.0, 100.0, 100.0)).expect("append");
        let mut veil = block(0.0, 0.0, 200.0, 200.0);
        veil.core.set_penetrable(true);
        root.append_child(veil).expect("append");

        // The veil is on top but transparent and empty, so the hit falls
        // through to the sibling beneath it.
        let path = detect_target(&root, DVec2::new(50.0, 50.0));
        assert_eq!(path, vec![root.uid(), under]);
    }
}
