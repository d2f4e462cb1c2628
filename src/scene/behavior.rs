use std::any::Any;

use glam::DVec2;
use smol_str::SmolStr;

use crate::record::OptionValue;
use crate::scene::{Node, NodeCore};
use crate::surface::DrawContext;

/// Kind-specific hooks invoked by the pipeline. Every hook defaults to a
/// no-op so the pipeline's control flow stays in one place; concrete kinds
/// override only what they need.
///
/// Hooks receive the node's core and child list as split borrows: a layout
/// parent writes `layout_offset` onto children in `update_layout` without
/// touching its own position fields.
pub trait Behavior: Any {
    fn tag(&self) -> &'static str;

    /// Runs before positions resolve; the place for self-sizing (an image
    /// adopting its natural size, a container measuring children).
    fn before_update(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {}

    /// Runs immediately after this node's position resolved, before style
    /// and layout.
    fn after_locating(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {}

    /// Runs after this node's position and style resolved but before
    /// children resolve their positions, so layout offsets written here are
    /// seen by the children's position step in the same pass.
    fn update_layout(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {}

    /// Runs after the whole subtree finished the pass.
    fn after_update(&mut self, _core: &mut NodeCore, _children: &mut [Node]) {}

    fn render_self(&mut self, _core: &NodeCore, _ctx: &mut dyn DrawContext) {}

    /// Point containment for hit testing; defaults to the bounds rectangle.
    fn contains_point(&self, core: &NodeCore, point: DVec2) -> bool {
        core.bounds.contains(point)
    }

    /// Kind-specific entries appended to the option bag during
    /// serialization; the kind's registered factory reads them back.
    fn write_options(&self, _core: &NodeCore, _out: &mut Vec<(SmolStr, OptionValue)>) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Plain container with no hooks of its own.
#[derive(Debug, Default)]
pub struct Group;

impl Behavior for Group {
    fn tag(&self) -> &'static str {
        "group"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
