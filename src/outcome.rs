// src/outcome.rs - Backend result codes and their three-valued interpretation
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw result code reported by the motion backend.
///
/// Values follow the MoveIt error code numbering used by the planning and
/// execution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const SUCCESS: ResultCode = ResultCode(1);
    pub const FAILURE: ResultCode = ResultCode(99999);
    pub const PLANNING_FAILED: ResultCode = ResultCode(-1);
    pub const INVALID_MOTION_PLAN: ResultCode = ResultCode(-2);
    pub const CONTROL_FAILED: ResultCode = ResultCode(-4);
    pub const TIMED_OUT: ResultCode = ResultCode(-6);
    pub const PREEMPTED: ResultCode = ResultCode(-7);
    pub const INVALID_GOAL_CONSTRAINTS: ResultCode = ResultCode(-16);

    pub fn outcome(self) -> ExecutionOutcome {
        ExecutionOutcome::from(self)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            ResultCode::SUCCESS => "SUCCESS",
            ResultCode::FAILURE => "FAILURE",
            ResultCode::PLANNING_FAILED => "PLANNING_FAILED",
            ResultCode::INVALID_MOTION_PLAN => "INVALID_MOTION_PLAN",
            ResultCode::CONTROL_FAILED => "CONTROL_FAILED",
            ResultCode::TIMED_OUT => "TIMED_OUT",
            ResultCode::PREEMPTED => "PREEMPTED",
            ResultCode::INVALID_GOAL_CONSTRAINTS => "INVALID_GOAL_CONSTRAINTS",
            ResultCode(other) => return write!(f, "code {}", other),
        };
        write!(f, "{} ({})", name, self.0)
    }
}

/// What one `execute` call amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    /// The running motion was canceled before it finished.
    Preempted,
    Failure,
}

impl From<ResultCode> for ExecutionOutcome {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::SUCCESS => ExecutionOutcome::Success,
            ResultCode::PREEMPTED => ExecutionOutcome::Preempted,
            _ => ExecutionOutcome::Failure,
        }
    }
}
