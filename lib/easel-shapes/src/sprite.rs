use std::any::Any;

use glam::DVec2;
use smol_str::SmolStr;

use easel::record::OptionValue;
use easel::scene::{Behavior, Node, NodeCore};
use easel::surface::DrawContext;

/// Image-slot node. Decoding and rasterization live behind the surface, so
/// the sprite itself carries only the natural size of its content: before
/// positions resolve, a zero-sized axis adopts the natural dimension, the
/// same way an image element sizes itself once its bitmap is known. Explicit
/// sizes and stretch factors win because they land on the bounds first.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sprite {
    pub natural_size: Option<DVec2>,
}

impl Sprite {
    pub fn node(natural_width: f64, natural_height: f64) -> Node {
        Node::new(Self {
            natural_size: Some(DVec2::new(natural_width, natural_height)),
        })
    }
}

impl Behavior for Sprite {
    fn tag(&self) -> &'static str {
        "sprite"
    }

    fn before_update(&mut self, core: &mut NodeCore, _children: &mut [Node]) {
        let Some(natural) = self.natural_size else {
            return;
        };
        if core.bounds.width() == 0.0 {
            core.bounds.set_width(natural.x);
        }
        if core.bounds.height() == 0.0 {
            core.bounds.set_height(natural.y);
        }
    }

    fn render_self(&mut self, core: &NodeCore, ctx: &mut dyn DrawContext) {
        // Placeholder paint until the embedder draws real content.
        if core.computed_style.fill.is_some() {
            ctx.fill_rect(core.bounds);
        }
    }

    fn write_options(&self, _core: &NodeCore, out: &mut Vec<(SmolStr, OptionValue)>) {
        if let Some(natural) = self.natural_size {
            out.push((
                SmolStr::new_static("natural_width"),
                OptionValue::Float(natural.x),
            ));
            out.push((
                SmolStr::new_static("natural_height"),
                OptionValue::Float(natural.y),
            ));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
