use super::error::{StateError, StateResult};
use super::{StateTransition, ViewerEvent, ViewerState};

#[derive(Debug)]
pub struct StateMachine {
    state: ViewerState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: ViewerState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }

    pub fn can_transition(&self, event: ViewerEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: ViewerEvent) -> Option<ViewerState> {
        match (self.state, event) {
            (ViewerState::Closed, ViewerEvent::Open) => Some(ViewerState::Open),
            (ViewerState::Open, ViewerEvent::Close) => Some(ViewerState::Closed),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: ViewerEvent) -> StateResult<ViewerState> {
        tracing::debug!(from = ?self.state, event = ?event, "request viewer transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid viewer transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        self.transition_history
            .push(StateTransition::new(self.state, event, next));
        self.state = next;

        Ok(self.state)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ViewerState::{:?}", self.state)
    }
}
