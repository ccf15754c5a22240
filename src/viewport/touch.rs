use crate::geometry::{distance, DragAnchor, Point};

/// Transient state kept while at least one finger is down on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchSession {
    points: Vec<Point>,
    start_point: Point,
    anchor_position: Point,
    initial_pinch_distance: f64,
    initial_scale: f64,
}

impl TouchSession {
    /// Starts a session from the active contacts; only the first two are tracked.
    pub(super) fn begin(contacts: &[Point], position: Point, scale: f64) -> Option<Self> {
        let first = *contacts.first()?;
        let points: Vec<Point> = contacts.iter().take(2).copied().collect();
        let initial_pinch_distance = match points.as_slice() {
            [a, b] => distance(*a, *b),
            _ => 0.0,
        };
        Some(Self {
            points,
            start_point: first,
            anchor_position: position,
            initial_pinch_distance,
            initial_scale: scale,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_pinch(&self) -> bool {
        self.points.len() >= 2
    }

    pub const fn anchor_position(&self) -> Point {
        self.anchor_position
    }

    pub const fn initial_pinch_distance(&self) -> f64 {
        self.initial_pinch_distance
    }

    pub const fn initial_scale(&self) -> f64 {
        self.initial_scale
    }

    pub(super) fn drag_anchor(&self) -> DragAnchor {
        DragAnchor::new(self.start_point, self.anchor_position)
    }

    /// Ratio between the current finger spread and the spread at touch start.
    ///
    /// `None` when the baseline is degenerate, so callers hold the scale.
    pub(super) fn pinch_ratio(&self, a: Point, b: Point) -> Option<f64> {
        let baseline = self.initial_pinch_distance;
        if !(baseline.is_finite() && baseline > 0.0) {
            return None;
        }
        let ratio = distance(a, b) / baseline;
        ratio.is_finite().then_some(ratio)
    }

    pub(super) fn track(&mut self, contacts: &[Point]) {
        for (slot, contact) in self.points.iter_mut().zip(contacts) {
            *slot = *contact;
        }
    }
}
