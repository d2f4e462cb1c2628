use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec2;
use smol_str::SmolStr;

mod color;
mod computed_style;
pub use color::*;
pub use computed_style::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

impl TextAlign {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "ltr" => Some(Self::Ltr),
            "rtl" => Some(Self::Rtl),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "butt" => Some(Self::Butt),
            "round" => Some(Self::Round),
            "square" => Some(Self::Square),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "miter" => Some(Self::Miter),
            "round" => Some(Self::Round),
            "bevel" => Some(Self::Bevel),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset: DVec2,
}

static NEXT_PAINT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque reference to a renderer-created paint resource (gradient, pattern).
/// It draws like any other paint but cannot be serialized into a record.
#[derive(Clone, Debug)]
pub struct PaintHandle {
    id: u64,
}

impl PaintHandle {
    pub fn acquire() -> Self {
        Self {
            id: NEXT_PAINT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for PaintHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    Handle(PaintHandle),
}

impl Paint {
    pub const fn solid(color: Color) -> Self {
        Self::Solid(color)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Sparse per-node style overrides. Unset fields resolve through the cascade:
/// inherited fields from the parent's computed style, local fields from the
/// global defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub line_width: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub miter_limit: Option<f64>,
    pub line_dash: Option<Vec<f64>>,
    pub line_dash_offset: Option<f64>,
    pub shadow: Option<Shadow>,
    pub opacity: Option<f64>,
    pub font: Option<SmolStr>,
    pub text_align: Option<TextAlign>,
    pub direction: Option<Direction>,
    pub pixel_ratio: Option<f64>,
}

impl Style {
    pub fn fill(mut self, paint: impl Into<Paint>) -> Self {
        self.fill = Some(paint.into());
        self
    }

    pub fn stroke(mut self, paint: impl Into<Paint>) -> Self {
        self.stroke = Some(paint.into());
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn font(mut self, font: impl Into<SmolStr>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
