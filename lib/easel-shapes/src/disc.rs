use std::any::Any;

use glam::DVec2;

use easel::scene::{Behavior, Node, NodeCore};
use easel::surface::DrawContext;

/// Circle inscribed in the node's bounds. Hit testing is radial, so corners
/// of the bounding box are not part of the disc.
#[derive(Clone, Copy, Debug, Default)]
pub struct Disc;

impl Disc {
    pub fn node() -> Node {
        Node::new(Self)
    }

    fn center_radius(core: &NodeCore) -> (DVec2, f64) {
        let bounds = core.bounds;
        let center = DVec2::new(
            (bounds.left + bounds.right) / 2.0,
            (bounds.top + bounds.bottom) / 2.0,
        );
        (center, bounds.width().min(bounds.height()) / 2.0)
    }
}

impl Behavior for Disc {
    fn tag(&self) -> &'static str {
        "disc"
    }

    fn render_self(&mut self, core: &NodeCore, ctx: &mut dyn DrawContext) {
        let (center, radius) = Self::center_radius(core);
        if radius <= 0.0 {
            return;
        }
        if core.computed_style.fill.is_some() {
            ctx.fill_circle(center, radius);
        }
        if core.computed_style.stroke.is_some() {
            ctx.stroke_circle(center, radius);
        }
    }

    fn contains_point(&self, core: &NodeCore, point: DVec2) -> bool {
        let (center, radius) = Self::center_radius(core);
        point.distance_squared(center) <= radius * radius
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
