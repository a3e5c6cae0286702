//! Interface to the motion backend that actually drives the arm.
//!
//! Planning and trajectory execution live behind [`MotionBackend`]; this crate
//! only submits goals, waits for their result code and cancels them.

use crate::outcome::ResultCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend is already tracking goal {0}")]
    Busy(GoalId),
    #[error("backend disconnected: {0}")]
    Disconnected(String),
    #[error("goal rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GoalId(pub u64);

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the backend's goal handle is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No goal in flight.
    Idle,
    /// A goal was accepted and has not reported a result yet.
    Active { goal: GoalId },
    /// Contact with the tracked goal was lost; nothing left to cancel.
    Lost,
}

/// Cartesian pose, position in meters and orientation as an `[x, y, z, w]` quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f64; 3],
    #[serde(default = "identity_orientation")]
    pub orientation: [f64; 4],
}

impl Pose {
    pub fn from_position(position: [f64; 3]) -> Self {
        Self {
            position,
            orientation: identity_orientation(),
        }
    }
}

fn identity_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlannerId {
    Ptp,
    Lin,
    Circ,
}

/// Helper point of a circular motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CircAuxiliary {
    Center([f64; 3]),
    Interim([f64; 3]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GoalTarget {
    Joints(Vec<f64>),
    Pose(Pose),
    Arc { goal: Pose, auxiliary: CircAuxiliary },
    GripperWidth(f64),
}

/// One motion request inside a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalItem {
    pub planner: PlannerId,
    pub planning_group: String,
    pub target_link: String,
    pub reference_frame: String,
    pub target: GoalTarget,
    pub vel_scale: f64,
    pub acc_scale: f64,
    /// Zero means the motion stops at the target before the next item starts.
    pub blend_radius: f64,
}

/// A goal as submitted to the backend: one or more blended motion requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionGoal {
    pub items: Vec<GoalItem>,
}

impl MotionGoal {
    pub fn single(item: GoalItem) -> Self {
        Self { items: vec![item] }
    }
}

/// The motion execution subsystem.
///
/// Implementations must tolerate `cancel_active` from any thread at any time,
/// including while nothing is running.
pub trait MotionBackend: Send + Sync {
    /// Registers `goal` with the backend without waiting for it to finish.
    fn send_goal(&self, goal: MotionGoal) -> Result<GoalId, BackendError>;

    /// Blocks until the tracked goal reports a result.
    ///
    /// Returns `None` when `timeout` elapses first or no goal was ever sent.
    fn wait_for_result(&self, timeout: Option<Duration>) -> Option<ResultCode>;

    fn cancel_active(&self);

    fn handle_state(&self) -> HandleState;
}
