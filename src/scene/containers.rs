use std::any::Any;

use glam::DVec2;
use smol_str::SmolStr;

use crate::record::OptionValue;
use crate::scene::{Behavior, Node, NodeCore, OffsetMode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignX {
    #[default]
    Start,
    Center,
    End,
}

impl AlignX {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "start" => Some(Self::Start),
            "center" => Some(Self::Center),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignY {
    #[default]
    Start,
    Center,
    End,
}

impl AlignY {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "start" => Some(Self::Start),
            "center" => Some(Self::Center),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

/// Container placing each relative child inside its own bounds per axis.
/// Placement goes through the children's layout offsets, so it lands before
/// the children resolve their positions in the same pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct Align {
    pub x: AlignX,
    pub y: AlignY,
}

impl Align {
    pub const fn new(x: AlignX, y: AlignY) -> Self {
        Self { x, y }
    }

    pub const fn center() -> Self {
        Self::new(AlignX::Center, AlignY::Center)
    }
}

impl Behavior for Align {
    fn tag(&self) -> &'static str {
        "align"
    }

    fn update_layout(&mut self, core: &mut NodeCore, children: &mut [Node]) {
        let area = core.bounds.size();
        for child in children {
            if child.core.offset_mode == OffsetMode::Absolute {
                continue;
            }
            let size = child.core.bounds.size();
            let x = match self.x {
                AlignX::Start => 0.0,
                AlignX::Center => (area.x - size.x) / 2.0,
                AlignX::End => area.x - size.x,
            };
            let y = match self.y {
                AlignY::Start => 0.0,
                AlignY::Center => (area.y - size.y) / 2.0,
                AlignY::End => area.y - size.y,
            };
            child.core.layout_offset = DVec2::new(x, y);
        }
    }

    fn write_options(&self, _core: &NodeCore, out: &mut Vec<(SmolStr, OptionValue)>) {
        if self.x != AlignX::Start {
            out.push(("align_x".into(), OptionValue::Str(self.x.as_str().into())));
        }
        if self.y != AlignY::Start {
            out.push(("align_y".into(), OptionValue::Str(self.y.as_str().into())));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowDirection {
    #[default]
    Row,
    Column,
}

impl FlowDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "row" => Some(Self::Row),
            "column" => Some(Self::Column),
            _ => None,
        }
    }
}

/// Container stacking relative children along one axis with a fixed gap.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flow {
    pub direction: FlowDirection,
    pub gap: f64,
}

impl Flow {
    pub const fn new(direction: FlowDirection, gap: f64) -> Self {
        Self { direction, gap }
    }

    pub const fn row(gap: f64) -> Self {
        Self::new(FlowDirection::Row, gap)
    }

    pub const fn column(gap: f64) -> Self {
        Self::new(FlowDirection::Column, gap)
    }
}

impl Behavior for Flow {
    fn tag(&self) -> &'static str {
        "flow"
    }

    fn update_layout(&mut self, _core: &mut NodeCore, children: &mut [Node]) {
        let mut cursor = 0.0;
        for child in children {
            if child.core.offset_mode == OffsetMode::Absolute {
                continue;
            }
            let size = child.core.bounds.size();
            match self.direction {
                FlowDirection::Row => {
                    child.core.layout_offset = DVec2::new(cursor, 0.0);
                    cursor += size.x + self.gap;
                }
                FlowDirection::Column => {
                    child.core.layout_offset = DVec2::new(0.0, cursor);
                    cursor += size.y + self.gap;
                }
            }
        }
    }

    fn write_options(&self, _core: &NodeCore, out: &mut Vec<(SmolStr, OptionValue)>) {
        if self.direction != FlowDirection::Row {
            out.push((
                "direction".into(),
                OptionValue::Str(self.direction.as_str().into()),
            ));
        }
        if self.gap != 0.0 {
            out.push(("gap".into(), OptionValue::Float(self.gap)));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
