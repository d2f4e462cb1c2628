use smol_str::SmolStr;

use crate::style::{Direction, LineCap, LineJoin, Paint, Shadow, Style, TextAlign};
use crate::surface::DrawContext;

pub const DEFAULT_FONT: &str = "10px sans-serif";

/// Fully resolved style for one node, recomputed every pipeline pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub line_dash: Vec<f64>,
    pub line_dash_offset: f64,
    pub shadow: Option<Shadow>,
    pub opacity: f64,
    pub font: SmolStr,
    pub text_align: TextAlign,
    pub direction: Direction,
    pub pixel_ratio: f64,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            shadow: None,
            opacity: 1.0,
            font: SmolStr::new_static(DEFAULT_FONT),
            text_align: TextAlign::Start,
            direction: Direction::Ltr,
            pixel_ratio: 1.0,
        }
    }
}

/// Resolves one node's style. Inherited fields (font, text alignment,
/// direction, pixel ratio) fall back to the parent's computed values; local
/// fields (paints, line styling, shadow, opacity) fall back to the global
/// defaults no matter what ancestors declare. Own overrides win when the
/// value is meaningful for the field: empty font strings, non-positive or
/// non-finite line widths and pixel ratios are ignored, opacity clamps to
/// [0, 1].
pub fn compute_style(own: &Style, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut computed = ComputedStyle::default();

    if let Some(parent) = parent {
        computed.font = parent.font.clone();
        computed.text_align = parent.text_align;
        computed.direction = parent.direction;
        computed.pixel_ratio = parent.pixel_ratio;
    }

    if let Some(fill) = &own.fill {
        computed.fill = Some(fill.clone());
    }
    if let Some(stroke) = &own.stroke {
        computed.stroke = Some(stroke.clone());
    }
    if let Some(width) = own.line_width
        && width.is_finite()
        && width > 0.0
    {
        computed.line_width = width;
    }
    if let Some(cap) = own.line_cap {
        computed.line_cap = cap;
    }
    if let Some(join) = own.line_join {
        computed.line_join = join;
    }
    if let Some(limit) = own.miter_limit
        && limit.is_finite()
        && limit > 0.0
    {
        computed.miter_limit = limit;
    }
    if let Some(dash) = &own.line_dash {
        computed.line_dash = dash.clone();
    }
    if let Some(offset) = own.line_dash_offset {
        computed.line_dash_offset = offset;
    }
    if let Some(shadow) = own.shadow {
        computed.shadow = Some(shadow);
    }
    if let Some(opacity) = own.opacity
        && opacity.is_finite()
    {
        computed.opacity = opacity.clamp(0.0, 1.0);
    }
    if let Some(font) = &own.font
        && !font.is_empty()
    {
        computed.font = font.clone();
    }
    if let Some(align) = own.text_align {
        computed.text_align = align;
    }
    if let Some(direction) = own.direction {
        computed.direction = direction;
    }
    if let Some(ratio) = own.pixel_ratio
        && ratio.is_finite()
        && ratio > 0.0
    {
        computed.pixel_ratio = ratio;
    }

    computed
}

impl ComputedStyle {
    /// Pushes the resolved state into a drawing context. Callers pair this
    /// with `save`/`restore` around each node.
    pub fn apply_to(&self, ctx: &mut dyn DrawContext) {
        if let Some(fill) = &self.fill {
            ctx.set_fill(fill);
        }
        if let Some(stroke) = &self.stroke {
            ctx.set_stroke(stroke);
        }
        ctx.set_line_width(self.line_width);
        ctx.set_line_cap(self.line_cap);
        ctx.set_line_join(self.line_join);
        ctx.set_miter_limit(self.miter_limit);
        if !self.line_dash.is_empty() {
            ctx.set_line_dash(&self.line_dash, self.line_dash_offset);
        }
        ctx.set_shadow(self.shadow.as_ref());
        ctx.set_global_alpha(self.opacity);
        ctx.set_font(&self.font);
        ctx.set_text_align(self.text_align);
        ctx.set_direction(self.direction);
    }
}
