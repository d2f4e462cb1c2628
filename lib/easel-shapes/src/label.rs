use std::any::Any;

use smol_str::SmolStr;

use easel::record::OptionValue;
use easel::scene::{Behavior, Node, NodeCore};
use easel::surface::DrawContext;

/// Single line of text drawn at the node's origin with the computed font and
/// alignment. The text is part of the node's record, so labels round-trip
/// through serialization.
#[derive(Clone, Debug, Default)]
pub struct Label {
    pub text: SmolStr,
}

impl Label {
    pub fn node(text: impl Into<SmolStr>) -> Node {
        Node::new(Self { text: text.into() })
    }
}

impl Behavior for Label {
    fn tag(&self) -> &'static str {
        "label"
    }

    fn render_self(&mut self, core: &NodeCore, ctx: &mut dyn DrawContext) {
        if self.text.is_empty() {
            return;
        }
        ctx.fill_text(&self.text, core.bounds.origin());
    }

    fn write_options(&self, _core: &NodeCore, out: &mut Vec<(SmolStr, OptionValue)>) {
        if !self.text.is_empty() {
            out.push((
                SmolStr::new_static("text"),
                OptionValue::Str(self.text.clone()),
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

#[cfg(test)]
mod tests {
    use super::*;
    use easel::pipeline;
    use easel::surface::{RecordedOp, RecordingSurface, Surface};
    use glam::DVec2;

    #[test]
    fn draws_its_text_at_the_resolved_origin() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let mut node = Label::node("hi").with_offset(12.0, 7.0);
        pipeline::update_root(&mut node);
        pipeline::render(&mut node, surface.context());

        assert!(
            surface
                .ops()
                .contains(&RecordedOp::FillText("hi".into(), DVec2::new(12.0, 7.0)))
        );
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let mut node = Label::node("");
        pipeline::update_root(&mut node);
        pipeline::render(&mut node, surface.context());

        assert!(
            !surface
                .ops()
                .iter()
                .any(|op| matches!(op, RecordedOp::FillText(..)))
        );
    }

    #[test]
    fn text_serializes_into_the_record() {
        let record = Label::node("title").to_record().expect("record");
        assert_eq!(record.tag, "label");
        assert!(
            record
                .options
                .contains(&("text".into(), OptionValue::Str("title".into())))
        );
    }
}
