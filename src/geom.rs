use glam::DVec2;

/// Axis-aligned rectangle stored as edges. Width/height are derived; their
/// setters move the right/bottom edge so the origin stays put.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_origin_size(origin: DVec2, width: f64, height: f64) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + width,
            bottom: origin.y + height,
        }
    }

    pub const fn width(&self) -> f64 {
        self.right - self.left
    }

    pub const fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub const fn set_width(&mut self, width: f64) {
        self.right = self.left + width;
    }

    pub const fn set_height(&mut self, height: f64) {
        self.bottom = self.top + height;
    }

    pub const fn origin(&self) -> DVec2 {
        DVec2::new(self.left, self.top)
    }

    /// Moves left/top, preserving width and height.
    pub const fn set_origin(&mut self, origin: DVec2) {
        let width = self.width();
        let height = self.height();
        self.left = origin.x;
        self.top = origin.y;
        self.right = origin.x + width;
        self.bottom = origin.y + height;
    }

    pub const fn size(&self) -> DVec2 {
        DVec2::new(self.width(), self.height())
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Minimal rectangle enclosing every given bounds. Empty input yields
    /// `Bounds::ZERO`.
    pub fn enclosing<I>(bounds: I) -> Self
    where
        I: IntoIterator<Item = Bounds>,
    {
        let mut iter = bounds.into_iter();
        let Some(first) = iter.next() else {
            return Self::ZERO;
        };
        iter.fold(first, |acc, b| Self {
            left: acc.left.min(b.left),
            top: acc.top.min(b.top),
            right: acc.right.max(b.right),
            bottom: acc.bottom.max(b.bottom),
        })
    }
}
