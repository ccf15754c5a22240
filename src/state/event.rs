use super::ViewerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ViewerState,
    pub event: ViewerEvent,
    pub to: ViewerState,
}

impl StateTransition {
    pub const fn new(from: ViewerState, event: ViewerEvent, to: ViewerState) -> Self {
        Self { from, event, to }
    }
}
