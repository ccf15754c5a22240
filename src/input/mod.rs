//! Host event vocabulary consumed by the viewer.

mod pointer;
mod shortcut;

pub use pointer::{PointerCapture, PointerOwner, PointerTarget};
pub use shortcut::{resolve_shortcut, ShortcutAction, ShortcutKey, ShortcutModifiers};

use crate::geometry::{Point, Rect};

/// Document/window-level listeners that live exactly as long as the viewer is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Wheel,
    PointerMove,
    PointerUp,
    TouchMove,
    TouchEnd,
    Resize,
    KeyDown,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 7] = [
        ListenerKind::Wheel,
        ListenerKind::PointerMove,
        ListenerKind::PointerUp,
        ListenerKind::TouchMove,
        ListenerKind::TouchEnd,
        ListenerKind::Resize,
        ListenerKind::KeyDown,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerInput {
    Wheel {
        client: Point,
        delta_y: f64,
    },
    PointerDown {
        target: PointerTarget,
        client: Point,
    },
    PointerMove {
        client: Point,
    },
    PointerUp,
    TouchStart {
        contacts: Vec<Point>,
    },
    TouchMove {
        contacts: Vec<Point>,
    },
    /// Touch end or cancel.
    TouchEnd,
    /// New viewport bounding box in client coordinates.
    Resize {
        bounds: Rect,
    },
    Key {
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
    },
}

impl ViewerInput {
    /// Listener that delivers this event; `None` for element-level events.
    pub const fn listener(&self) -> Option<ListenerKind> {
        match self {
            Self::Wheel { .. } => Some(ListenerKind::Wheel),
            Self::PointerMove { .. } => Some(ListenerKind::PointerMove),
            Self::PointerUp => Some(ListenerKind::PointerUp),
            Self::TouchMove { .. } => Some(ListenerKind::TouchMove),
            Self::TouchEnd => Some(ListenerKind::TouchEnd),
            Self::Resize { .. } => Some(ListenerKind::Resize),
            Self::Key { .. } => Some(ListenerKind::KeyDown),
            Self::PointerDown { .. } | Self::TouchStart { .. } => None,
        }
    }
}
