//! Concrete node kinds for the `easel` scene graph: filled/stroked
//! rectangles, single-line labels, discs with radial hit testing, and
//! sprites that adopt their natural size. Call [`register_shape_kinds`] once
//! to make every kind available to record instantiation.

mod disc;
mod label;
mod rect;
mod register;
mod sprite;

pub use disc::Disc;
pub use label::Label;
pub use rect::Rect;
pub use register::register_shape_kinds;
pub use sprite::Sprite;
