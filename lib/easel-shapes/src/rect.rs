use std::any::Any;

use easel::scene::{Behavior, Node, NodeCore};
use easel::surface::DrawContext;

/// Axis-aligned rectangle filling and/or stroking its bounds. Which of the
/// two happens follows the computed style: an unset paint skips that pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rect;

impl Rect {
    pub fn node() -> Node {
        Node::new(Self)
    }
}

impl Behavior for Rect {
    fn tag(&self) -> &'static str {
        "rect"
    }

    fn render_self(&mut self, core: &NodeCore, ctx: &mut dyn DrawContext) {
        if core.computed_style.fill.is_some() {
            ctx.fill_rect(core.bounds);
        }
        if core.computed_style.stroke.is_some() {
            ctx.stroke_rect(core.bounds);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel::pipeline;
    use easel::style::{Color, Style};
    use easel::surface::{RecordedOp, RecordingSurface, Surface};

    #[test]
    fn paints_only_the_declared_passes() {
        let mut surface = RecordingSurface::new(100.0, 100.0);

        let mut node = Rect::node()
            .with_size(40.0, 20.0)
            .with_style(Style::default().fill(Color::rgb(10, 20, 30)));
        pipeline::update_root(&mut node);
        pipeline::render(&mut node, surface.context());

        let ops = surface.take_ops();
        assert!(ops.iter().any(|op| matches!(op, RecordedOp::FillRect(_))));
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::StrokeRect(_))));
    }

    #[test]
    fn stroke_only_rect_strokes() {
        let mut surface = RecordingSurface::new(100.0, 100.0);

        let mut node = Rect::node()
            .with_size(40.0, 20.0)
            .with_style(Style::default().stroke(Color::BLACK));
        pipeline::update_root(&mut node);
        pipeline::render(&mut node, surface.context());

        let ops = surface.take_ops();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::FillRect(_))));
        assert!(ops.iter().any(|op| matches!(op, RecordedOp::StrokeRect(_))));
    }
}
