//! The control transition table.

use super::{ControlAction, ControlState};
use thiserror::Error;

/// A control action was applied in a state where it has no meaning.
///
/// Only the loop acknowledgements can produce this; external requests are
/// defined in every state. Seeing it means the execution loop and the control
/// state have drifted apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid control transition: {action} in state {state}")]
pub struct InvalidTransition {
    pub state: ControlState,
    pub action: ControlAction,
}

/// Applies `action` to `state`.
pub fn next_state(
    state: ControlState,
    action: ControlAction,
) -> Result<ControlState, InvalidTransition> {
    use ControlAction as A;
    use ControlState as S;

    let next = match (state, action) {
        (S::NoRequest, A::Pause) => S::PauseRequested,
        (S::NoRequest, A::Resume) => S::NoRequest,
        (S::NoRequest, A::Stop) => S::StopRequested,

        (S::PauseRequested, A::Pause) => S::PauseRequested,
        (S::PauseRequested, A::Resume) => S::ResumeRequested,
        (S::PauseRequested, A::Stop) => S::StopRequested,
        (S::PauseRequested, A::MotionPaused) => S::PauseRequested,

        (S::ResumeRequested, A::Pause) => S::PauseRequested,
        (S::ResumeRequested, A::Resume) => S::ResumeRequested,
        (S::ResumeRequested, A::Stop) => S::StopRequested,
        (S::ResumeRequested, A::MotionResumed) => S::NoRequest,

        // a pending stop dominates pause and resume requests
        (S::StopRequested, A::Pause | A::Resume | A::Stop) => S::StopRequested,
        (S::StopRequested, A::MotionStopped) => S::NoRequest,

        (state, action) => return Err(InvalidTransition { state, action }),
    };
    Ok(next)
}
