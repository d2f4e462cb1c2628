//! `easel` is a retained-mode scene graph for 2D canvas-like surfaces: a tree
//! of nodes with layout, styling, event dispatch and keyframe animation,
//! updated and rendered on coalesced frame ticks.
//!
//! The [`Stage`] ties everything together: it owns the root node and the
//! drawing [`Surface`], translates raw pointer/wheel input into bubbling
//! events, and drives the per-frame pipeline (animations, then node updates,
//! then renders) through the [`Scheduler`].

pub mod animation;
pub mod error;
pub mod event;
pub mod geom;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod scene;
pub mod schedule;
pub mod stage;
pub mod style;
pub mod surface;
pub mod util;

pub use animation::{
    AnimFrame, AnimProperty, Animate, Keyframe, KeyframeAnimation, TimeFunction, Timeline, Tween,
};
pub use error::{Error, Result};
pub use event::{
    Event, EventAction, EventHandler, EventKind, EventMeta, NodeEdit, PointerId, PointerSample,
    StopHandler, WheelDelta, WheelDeltaMode,
};
pub use geom::Bounds;
pub use record::{NodeRecord, OptionBag, OptionValue};
pub use registry::{NodeFactory, node_from_record, register_node_kind};
pub use scene::{
    Align, AlignX, AlignY, Behavior, Flow, FlowDirection, Group, Node, NodeCore, NodeFlags, NodeId,
    OffsetMode, detect_target,
};
pub use schedule::{FramePump, ManualPump, Scheduler};
pub use stage::Stage;
pub use style::{Color, ComputedStyle, Paint, PaintHandle, Shadow, Style};
pub use surface::{DrawContext, RecordedOp, RecordingSurface, Surface};
