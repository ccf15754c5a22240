//! Shared geometric primitives used by the viewport and panel controllers.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta_x: f64, delta_y: f64) -> Self {
        Self::new(self.x + delta_x, self.y + delta_y)
    }

    /// Vector from `origin` to `self`.
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Converts a client-space point into coordinates local to this rect.
    pub fn to_local(self, client: Point) -> Point {
        Point::new(client.x - self.x, client.y - self.y)
    }

    /// Center in local coordinates.
    pub fn local_center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Pointer position and tracked position captured when a drag starts.
///
/// Moves are always resolved against this anchor rather than accumulated
/// from the previous event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub pointer: Point,
    pub origin: Point,
}

impl DragAnchor {
    pub const fn new(pointer: Point, origin: Point) -> Self {
        Self { pointer, origin }
    }

    pub fn resolve(&self, pointer: Point) -> Point {
        let (delta_x, delta_y) = pointer.delta_from(self.pointer);
        self.origin.offset(delta_x, delta_y)
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Clamps the origin of a `size` rectangle so it stays inside `bounds` with
/// `margin` on every side.
///
/// When `bounds` is too small to honour both edges the rectangle pins to the
/// leading (left/top) margin.
pub fn clamp_rect_origin(origin: Point, size: Size, bounds: Size, margin: f64) -> Point {
    let max_x = bounds.width - size.width - margin;
    let max_y = bounds.height - size.height - margin;
    Point::new(
        origin.x.min(max_x).max(margin),
        origin.y.min(max_y).max(margin),
    )
}
