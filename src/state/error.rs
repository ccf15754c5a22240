use super::event::ViewerEvent;
use super::model::ViewerState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid viewer transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: ViewerState,
        event: ViewerEvent,
    },
}
