//! Floating edit panel that can be dragged by its header.
//!
//! The panel position is an offset from its default top-right corner. After
//! every mutation the on-screen rectangle stays inside
//! `[margin, width - panel_width - margin] x [margin, height - panel_height - margin]`.

use crate::geometry::{clamp_rect_origin, DragAnchor, Point, Rect, Size};

pub const PANEL_WIDTH: f64 = 320.0;
pub const PANEL_MAX_HEIGHT: f64 = 600.0;
pub const PANEL_MARGIN: f64 = 8.0;
const PANEL_VERTICAL_INSET: f64 = 24.0;

pub fn panel_size(viewport: Size) -> Size {
    let height = (viewport.height - PANEL_VERTICAL_INSET)
        .min(PANEL_MAX_HEIGHT)
        .max(0.0);
    Size::new(PANEL_WIDTH, height)
}

fn default_origin(viewport: Size) -> Point {
    Point::new(viewport.width - PANEL_WIDTH - PANEL_MARGIN, PANEL_MARGIN)
}

/// Clamps an offset so the panel rectangle it produces stays inside `viewport`.
pub fn constrain_panel_offset(offset: Point, viewport: Size) -> Point {
    let origin = default_origin(viewport);
    let requested = origin.offset(offset.x, offset.y);
    let clamped = clamp_rect_origin(requested, panel_size(viewport), viewport, PANEL_MARGIN);
    Point::new(clamped.x - origin.x, clamped.y - origin.y)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelDrag {
    offset: Point,
    viewport: Size,
    drag: Option<DragAnchor>,
}

impl PanelDrag {
    pub fn new(viewport: Size) -> Self {
        Self {
            offset: constrain_panel_offset(Point::default(), viewport),
            viewport,
            drag: None,
        }
    }

    pub const fn offset(&self) -> Point {
        self.offset
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn rect(&self) -> Rect {
        let origin = default_origin(self.viewport).offset(self.offset.x, self.offset.y);
        let size = panel_size(self.viewport);
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn pointer_down(&mut self, client: Point) {
        if !client.is_finite() {
            return;
        }
        self.drag = Some(DragAnchor::new(client, self.offset));
    }

    pub fn pointer_move(&mut self, client: Point) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        if !client.is_finite() {
            return false;
        }
        let next = constrain_panel_offset(anchor.resolve(client), self.viewport);
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Re-clamps the current offset for a new window size.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        let next = constrain_panel_offset(self.offset, viewport);
        if next != self.offset {
            tracing::debug!(from = ?self.offset, to = ?next, "panel offset re-clamped after resize");
        }
        self.offset = next;
    }
}
