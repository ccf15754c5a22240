/// Element that received a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The image canvas; starts a viewport pan.
    Canvas,
    /// The edit panel header; starts a panel drag.
    PanelHeader,
    /// Buttons, sliders and the panel body; starts no drag.
    Chrome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOwner {
    Viewport,
    Panel,
}

/// Ownership of the current pointer sequence.
///
/// Set on pointer-down from the receiving element, consulted by every move
/// and cleared on pointer-up, so the viewport and panel drags never both see
/// the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerCapture {
    owner: Option<PointerOwner>,
}

impl PointerCapture {
    pub const fn new() -> Self {
        Self { owner: None }
    }

    pub const fn owner(&self) -> Option<PointerOwner> {
        self.owner
    }

    /// Claims the sequence for `target`; an existing owner is kept.
    pub fn press(&mut self, target: PointerTarget) -> Option<PointerOwner> {
        if self.owner.is_some() {
            return None;
        }
        self.owner = match target {
            PointerTarget::Canvas => Some(PointerOwner::Viewport),
            PointerTarget::PanelHeader => Some(PointerOwner::Panel),
            PointerTarget::Chrome => None,
        };
        self.owner
    }

    pub fn release(&mut self) -> Option<PointerOwner> {
        self.owner.take()
    }
}
