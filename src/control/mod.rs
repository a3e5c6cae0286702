//! Pause/resume/stop request tracking for running motion commands.
//!
//! External callers raise requests (`Pause`, `Resume`, `Stop`) from any thread.
//! The execution loop observes them and answers with the `Motion*`
//! acknowledgements once it has acted on the request.

pub mod state_machine;
pub mod transition;

use serde::Serialize;
use std::fmt;

pub use state_machine::{ControlGuard, ControlStateMachine};
pub use transition::{next_state, InvalidTransition};

/// Current pause/resume/stop intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    #[default]
    NoRequest,
    PauseRequested,
    ResumeRequested,
    StopRequested,
}

impl ControlState {
    pub const ALL: [ControlState; 4] = [
        ControlState::NoRequest,
        ControlState::PauseRequested,
        ControlState::ResumeRequested,
        ControlState::StopRequested,
    ];
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlState::NoRequest => "NO_REQUEST",
            ControlState::PauseRequested => "PAUSE_REQUESTED",
            ControlState::ResumeRequested => "RESUME_REQUESTED",
            ControlState::StopRequested => "STOP_REQUESTED",
        };
        f.write_str(name)
    }
}

/// Signals driving the control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Pause,
    Resume,
    Stop,
    MotionPaused,
    MotionResumed,
    MotionStopped,
}

impl ControlAction {
    pub const ALL: [ControlAction; 6] = [
        ControlAction::Pause,
        ControlAction::Resume,
        ControlAction::Stop,
        ControlAction::MotionPaused,
        ControlAction::MotionResumed,
        ControlAction::MotionStopped,
    ];

    /// True for the acknowledgements only the execution loop may issue.
    pub fn is_acknowledgement(self) -> bool {
        matches!(
            self,
            ControlAction::MotionPaused | ControlAction::MotionResumed | ControlAction::MotionStopped
        )
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlAction::Pause => "PAUSE",
            ControlAction::Resume => "RESUME",
            ControlAction::Stop => "STOP",
            ControlAction::MotionPaused => "MOTION_PAUSED",
            ControlAction::MotionResumed => "MOTION_RESUMED",
            ControlAction::MotionStopped => "MOTION_STOPPED",
        };
        f.write_str(name)
    }
}
