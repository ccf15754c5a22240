//! Pan/zoom transform of the image inside the full-viewport canvas.
//!
//! `position` is the on-screen translation of the image center in
//! coordinates local to the viewport bounding box. Every scale change that
//! originates from a pointer (wheel, pinch) is anchor-corrected so the image
//! point under that pointer stays put.

mod touch;

pub use touch::TouchSession;

use crate::geometry::{midpoint, DragAnchor, Point, Rect};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;
const WHEEL_ZOOM_PER_DELTA: f64 = -0.001;
const ZOOM_STEP_FACTOR: f64 = 1.2;

pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Pinching,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Pointer(DragAnchor),
    Touch(TouchSession),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    position: Point,
    bounds: Option<Rect>,
    gesture: Gesture,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub const fn new() -> Self {
        Self {
            scale: 1.0,
            position: Point::new(0.0, 0.0),
            bounds: None,
            gesture: Gesture::Idle,
        }
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    pub const fn position(&self) -> Point {
        self.position
    }

    pub const fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn phase(&self) -> GesturePhase {
        match &self.gesture {
            Gesture::Idle => GesturePhase::Idle,
            Gesture::Pointer(_) => GesturePhase::Dragging,
            Gesture::Touch(session) if session.is_pinch() => GesturePhase::Pinching,
            Gesture::Touch(_) => GesturePhase::Dragging,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.phase() == GesturePhase::Dragging
    }

    pub fn touch_session(&self) -> Option<&TouchSession> {
        match &self.gesture {
            Gesture::Touch(session) => Some(session),
            _ => None,
        }
    }

    /// Records the viewport bounding box in client coordinates.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Resets the transform for a freshly opened viewer.
    pub fn open(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds.or(self.bounds);
        self.gesture = Gesture::Idle;
        self.scale = 1.0;
        if let Some(bounds) = self.bounds {
            self.position = bounds.local_center();
        }
        tracing::debug!(position = ?self.position, "viewport opened");
    }

    pub fn apply_wheel(&mut self, client: Point, delta_y: f64) -> bool {
        if !delta_y.is_finite() || !client.is_finite() {
            return false;
        }
        let Some(bounds) = self.bounds else {
            tracing::debug!("wheel ignored without viewport bounds");
            return false;
        };
        let next_scale = clamp_scale(self.scale + delta_y * WHEEL_ZOOM_PER_DELTA);
        self.rescale_around(next_scale, bounds.to_local(client), bounds)
    }

    pub fn pointer_down(&mut self, client: Point) {
        if !client.is_finite() {
            return;
        }
        self.gesture = Gesture::Pointer(DragAnchor::new(client, self.position));
    }

    pub fn pointer_move(&mut self, client: Point) -> bool {
        let Gesture::Pointer(anchor) = &self.gesture else {
            return false;
        };
        if !client.is_finite() {
            return false;
        }
        self.position = anchor.resolve(client);
        true
    }

    pub fn pointer_up(&mut self) {
        if matches!(self.gesture, Gesture::Pointer(_)) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn touch_start(&mut self, contacts: &[Point]) {
        if contacts.iter().any(|point| !point.is_finite()) {
            return;
        }
        if let Some(session) = TouchSession::begin(contacts, self.position, self.scale) {
            tracing::debug!(
                contacts = session.points().len(),
                baseline = session.initial_pinch_distance(),
                "touch session started"
            );
            self.gesture = Gesture::Touch(session);
        }
    }

    pub fn touch_move(&mut self, contacts: &[Point]) -> bool {
        if contacts.iter().any(|point| !point.is_finite()) {
            return false;
        }
        let Gesture::Touch(session) = &mut self.gesture else {
            return false;
        };
        session.track(contacts);

        if !session.is_pinch() {
            let Some(first) = contacts.first() else {
                return false;
            };
            self.position = session.drag_anchor().resolve(*first);
            return true;
        }

        let [a, b, ..] = contacts else {
            return false;
        };
        let Some(ratio) = session.pinch_ratio(*a, *b) else {
            return false;
        };
        let next_scale = clamp_scale(session.initial_scale() * ratio);
        let Some(bounds) = self.bounds else {
            return false;
        };
        self.rescale_around(next_scale, bounds.to_local(midpoint(*a, *b)), bounds)
    }

    pub fn touch_end(&mut self) {
        if matches!(self.gesture, Gesture::Touch(_)) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Center-fixed zoom step; no anchor correction.
    pub fn zoom_in(&mut self) {
        self.scale = clamp_scale(self.scale * ZOOM_STEP_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.scale = clamp_scale(self.scale / ZOOM_STEP_FACTOR);
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        if let Some(bounds) = self.bounds {
            self.position = bounds.local_center();
        }
    }

    /// Maps a local viewport point to image coordinates relative to the image center.
    pub fn local_to_image(&self, local: Point) -> Point {
        Point::new(
            (local.x - self.position.x) / self.scale,
            (local.y - self.position.y) / self.scale,
        )
    }

    pub fn image_to_local(&self, image: Point) -> Point {
        Point::new(
            self.position.x + image.x * self.scale,
            self.position.y + image.y * self.scale,
        )
    }

    fn rescale_around(&mut self, next_scale: f64, anchor: Point, bounds: Rect) -> bool {
        if next_scale == self.scale {
            return false;
        }
        let ratio = next_scale / self.scale;
        let center = bounds.local_center();
        self.position = Point::new(
            center.x + (self.position.x - center.x) * ratio + (anchor.x - center.x) * (1.0 - ratio),
            center.y + (self.position.y - center.y) * ratio + (anchor.y - center.y) * (1.0 - ratio),
        );
        self.scale = next_scale;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened_viewport() -> Viewport {
        let mut viewport = Viewport::new();
        viewport.open(Some(Rect::new(40.0, 20.0, 1200.0, 800.0)));
        viewport
    }

    fn assert_close(a: f64, b: f64, tolerance: f64) {
        assert!((a - b).abs() < tolerance, "{a} != {b}");
    }

    #[test]
    fn open_centers_image_at_unit_scale() {
        let viewport = opened_viewport();
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.position(), Point::new(600.0, 400.0));
        assert_eq!(viewport.phase(), GesturePhase::Idle);
        assert_eq!(viewport.zoom_percent(), 100);
    }

    #[test]
    fn wheel_keeps_image_point_under_cursor_fixed() {
        let mut viewport = opened_viewport();
        viewport.pointer_down(Point::new(300.0, 300.0));
        viewport.pointer_move(Point::new(180.0, 340.0));
        viewport.pointer_up();

        let cursors = [
            Point::new(40.0, 20.0),
            Point::new(355.0, 610.0),
            Point::new(1239.0, 819.0),
            Point::new(640.0, 420.0),
        ];
        let deltas = [-120.0, -2400.0, 53.0, 900.0, -15000.0, 20000.0];
        for cursor in cursors {
            for delta in deltas {
                let local = viewport.bounds().expect("bounds").to_local(cursor);
                let image_point = viewport.local_to_image(local);
                viewport.apply_wheel(cursor, delta);
                let after = viewport.image_to_local(image_point);
                assert_close(after.x, local.x, 1.0);
                assert_close(after.y, local.y, 1.0);
            }
        }
    }

    #[test]
    fn wheel_scale_is_clamped_for_large_and_repeated_deltas() {
        let mut viewport = opened_viewport();
        viewport.apply_wheel(Point::new(100.0, 100.0), -1.0e9);
        assert_eq!(viewport.scale(), MAX_SCALE);
        for _ in 0..500 {
            viewport.apply_wheel(Point::new(500.0, 300.0), 400.0);
            assert!(viewport.scale() >= MIN_SCALE && viewport.scale() <= MAX_SCALE);
        }
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn wheel_at_clamp_limit_leaves_position_alone() {
        let mut viewport = opened_viewport();
        viewport.apply_wheel(Point::new(100.0, 100.0), -1.0e9);
        let position = viewport.position();
        assert!(!viewport.apply_wheel(Point::new(900.0, 700.0), -500.0));
        assert_eq!(viewport.position(), position);
    }

    #[test]
    fn wheel_without_bounds_changes_nothing() {
        let mut viewport = Viewport::new();
        assert!(!viewport.apply_wheel(Point::new(10.0, 10.0), -300.0));
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.position(), Point::default());
    }

    #[test]
    fn wheel_ignores_non_finite_delta() {
        let mut viewport = opened_viewport();
        assert!(!viewport.apply_wheel(Point::new(10.0, 10.0), f64::NAN));
        assert_eq!(viewport.scale(), 1.0);
    }

    #[test]
    fn pointer_drag_translates_from_anchor_without_scaling() {
        let mut viewport = opened_viewport();
        viewport.pointer_down(Point::new(500.0, 500.0));
        assert_eq!(viewport.phase(), GesturePhase::Dragging);
        assert!(viewport.pointer_move(Point::new(520.0, 470.0)));
        assert!(viewport.pointer_move(Point::new(550.0, 480.0)));
        assert_eq!(viewport.position(), Point::new(650.0, 380.0));
        assert_eq!(viewport.scale(), 1.0);

        viewport.pointer_up();
        assert_eq!(viewport.phase(), GesturePhase::Idle);
        assert!(!viewport.pointer_move(Point::new(0.0, 0.0)));
        assert_eq!(viewport.position(), Point::new(650.0, 380.0));
    }

    #[test]
    fn discrete_zoom_is_center_fixed() {
        let mut viewport = opened_viewport();
        viewport.zoom_in();
        viewport.zoom_in();
        assert_close(viewport.scale(), 1.44, 1e-9);
        assert_eq!(viewport.position(), Point::new(600.0, 400.0));

        viewport.zoom_out();
        assert_close(viewport.scale(), 1.2, 1e-9);

        for _ in 0..100 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.scale(), MAX_SCALE);
        for _ in 0..100 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn reset_restores_unit_scale_and_center() {
        let mut viewport = opened_viewport();
        viewport.apply_wheel(Point::new(100.0, 100.0), -800.0);
        viewport.pointer_down(Point::new(0.0, 0.0));
        viewport.pointer_move(Point::new(90.0, 90.0));
        viewport.pointer_up();

        viewport.reset();
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.position(), Point::new(600.0, 400.0));
    }

    #[test]
    fn pinch_scales_from_initial_scale_and_anchors_midpoint() {
        let mut viewport = opened_viewport();
        let a = Point::new(400.0, 420.0);
        let b = Point::new(600.0, 420.0);
        viewport.touch_start(&[a, b]);
        assert_eq!(viewport.phase(), GesturePhase::Pinching);

        let bounds = viewport.bounds().expect("bounds");
        let mid_local = bounds.to_local(midpoint(a, b));
        let image_point = viewport.local_to_image(mid_local);

        assert!(viewport.touch_move(&[Point::new(300.0, 420.0), Point::new(700.0, 420.0)]));
        assert_close(viewport.scale(), 2.0, 1e-9);
        let after = viewport.image_to_local(image_point);
        assert_close(after.x, mid_local.x, 1.0);
        assert_close(after.y, mid_local.y, 1.0);

        assert!(viewport.touch_move(&[Point::new(450.0, 420.0), Point::new(550.0, 420.0)]));
        assert_close(viewport.scale(), 0.5, 1e-9);

        viewport.touch_end();
        assert_eq!(viewport.phase(), GesturePhase::Idle);
        assert!(viewport.touch_session().is_none());
    }

    #[test]
    fn pinch_is_clamped() {
        let mut viewport = opened_viewport();
        viewport.touch_start(&[Point::new(500.0, 400.0), Point::new(501.0, 400.0)]);
        viewport.touch_move(&[Point::new(0.0, 400.0), Point::new(1200.0, 400.0)]);
        assert_eq!(viewport.scale(), MAX_SCALE);
    }

    #[test]
    fn pinch_with_zero_baseline_holds_scale() {
        let mut viewport = opened_viewport();
        let p = Point::new(500.0, 400.0);
        viewport.touch_start(&[p, p]);
        let position = viewport.position();

        assert!(!viewport.touch_move(&[Point::new(400.0, 400.0), Point::new(700.0, 400.0)]));
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.position(), position);
    }

    #[test]
    fn single_finger_drag_uses_touch_start_anchor() {
        let mut viewport = opened_viewport();
        viewport.touch_start(&[Point::new(100.0, 100.0)]);
        assert_eq!(viewport.phase(), GesturePhase::Dragging);

        viewport.touch_move(&[Point::new(130.0, 90.0)]);
        viewport.touch_move(&[Point::new(150.0, 120.0)]);
        assert_eq!(viewport.position(), Point::new(650.0, 420.0));
        assert_eq!(viewport.scale(), 1.0);
    }

    #[test]
    fn second_finger_switches_single_drag_into_pinch() {
        let mut viewport = opened_viewport();
        viewport.touch_start(&[Point::new(100.0, 100.0)]);
        viewport.touch_move(&[Point::new(120.0, 100.0)]);
        viewport.touch_start(&[Point::new(120.0, 100.0), Point::new(220.0, 100.0)]);

        let session = viewport.touch_session().expect("session");
        assert!(session.is_pinch());
        assert_eq!(session.anchor_position(), Point::new(620.0, 400.0));
        assert_eq!(session.initial_pinch_distance(), 100.0);
    }
}
