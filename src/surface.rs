use glam::DVec2;
use smol_str::SmolStr;

use crate::geom::Bounds;
use crate::style::{Direction, LineCap, LineJoin, Paint, Shadow, TextAlign};

/// Canvas-like drawing API nodes paint through. Backends keep a state stack:
/// `save` pushes the current style state, `restore` pops back to it.
pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);

    fn set_fill(&mut self, paint: &Paint);
    fn set_stroke(&mut self, paint: &Paint);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_miter_limit(&mut self, limit: f64);
    fn set_line_dash(&mut self, dash: &[f64], offset: f64);
    fn set_shadow(&mut self, shadow: Option<&Shadow>);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_direction(&mut self, direction: Direction);

    fn clear(&mut self, area: Bounds);
    fn fill_rect(&mut self, area: Bounds);
    fn stroke_rect(&mut self, area: Bounds);
    fn fill_circle(&mut self, center: DVec2, radius: f64);
    fn stroke_circle(&mut self, center: DVec2, radius: f64);
    fn fill_text(&mut self, text: &str, at: DVec2);
    fn measure_text(&mut self, text: &str) -> f64;
}

/// One drawing target: a logical pixel area plus the context drawing into it.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    fn context(&mut self) -> &mut dyn DrawContext;

    /// Maps device input coordinates into the scene's coordinate space.
    fn to_local(&self, x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }
}

/// Everything a [`RecordingContext`] was asked to do, one entry per call.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedOp {
    Save,
    Restore,
    Fill(Paint),
    Stroke(Paint),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f64),
    LineDash(Vec<f64>, f64),
    Shadow(Option<Shadow>),
    GlobalAlpha(f64),
    Font(SmolStr),
    TextAlign(TextAlign),
    Direction(Direction),
    Clear(Bounds),
    FillRect(Bounds),
    StrokeRect(Bounds),
    FillCircle(DVec2, f64),
    StrokeCircle(DVec2, f64),
    FillText(SmolStr, DVec2),
}

/// Context that only logs. Text measurement is a flat per-character estimate
/// so layout-dependent assertions stay deterministic.
#[derive(Debug, Default)]
pub struct RecordingContext {
    ops: Vec<RecordedOp>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<RecordedOp> {
        std::mem::take(&mut self.ops)
    }
}

const MEASURE_ADVANCE: f64 = 8.0;

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.ops.push(RecordedOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(RecordedOp::Restore);
    }

    fn set_fill(&mut self, paint: &Paint) {
        self.ops.push(RecordedOp::Fill(paint.clone()));
    }

    fn set_stroke(&mut self, paint: &Paint) {
        self.ops.push(RecordedOp::Stroke(paint.clone()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(RecordedOp::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.ops.push(RecordedOp::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.ops.push(RecordedOp::LineJoin(join));
    }

    fn set_miter_limit(&mut self, limit: f64) {
        self.ops.push(RecordedOp::MiterLimit(limit));
    }

    fn set_line_dash(&mut self, dash: &[f64], offset: f64) {
        self.ops.push(RecordedOp::LineDash(dash.to_vec(), offset));
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.ops.push(RecordedOp::Shadow(shadow.copied()));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(RecordedOp::GlobalAlpha(alpha));
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(RecordedOp::Font(font.into()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ops.push(RecordedOp::TextAlign(align));
    }

    fn set_direction(&mut self, direction: Direction) {
        self.ops.push(RecordedOp::Direction(direction));
    }

    fn clear(&mut self, area: Bounds) {
        self.ops.push(RecordedOp::Clear(area));
    }

    fn fill_rect(&mut self, area: Bounds) {
        self.ops.push(RecordedOp::FillRect(area));
    }

    fn stroke_rect(&mut self, area: Bounds) {
        self.ops.push(RecordedOp::StrokeRect(area));
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64) {
        self.ops.push(RecordedOp::FillCircle(center, radius));
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64) {
        self.ops.push(RecordedOp::StrokeCircle(center, radius));
    }

    fn fill_text(&mut self, text: &str, at: DVec2) {
        self.ops.push(RecordedOp::FillText(text.into(), at));
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * MEASURE_ADVANCE
    }
}

/// In-memory surface over a [`RecordingContext`]. Tests and the demo binary
/// render into this and assert on (or print) the op log.
#[derive(Debug)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    pixel_ratio: f64,
    ctx: RecordingContext,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            ctx: RecordingContext::new(),
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn ops(&self) -> &[RecordedOp] {
        self.ctx.ops()
    }

    pub fn take_ops(&mut self) -> Vec<RecordedOp> {
        self.ctx.take_ops()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn context(&mut self) -> &mut dyn DrawContext {
        &mut self.ctx
    }
}
