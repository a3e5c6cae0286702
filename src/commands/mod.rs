//! Robot motion commands.
//!
//! Every command turns into a [`MotionGoal`](crate::backend::MotionGoal) and is
//! executed through the [`ExecutionContext`] handed in by the execution loop.
//! `execute` may be called again after a pause, so it must not consume the
//! command.

pub mod gripper;
pub mod motion;
pub mod sequence;
pub mod spec;

use crate::executor::ExecutionContext;
use crate::outcome::ResultCode;
use std::fmt;

pub use gripper::Gripper;
pub use motion::{Circ, Lin, Ptp, Target};
pub use sequence::{Sequence, SequenceItem, SequenceMotion};
pub use spec::CommandSpec;

pub const DEFAULT_PLANNING_GROUP: &str = "manipulator";
pub const DEFAULT_TARGET_LINK: &str = "prbt_tcp";
pub const DEFAULT_BASE_LINK: &str = "prbt_base";
pub const DEFAULT_GRIPPER_GROUP: &str = "gripper";

/// Something the robot can execute.
pub trait Command: fmt::Debug + Send {
    /// Short type name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Checks the parameters before the command is bound to a move.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Runs the command once and reports the backend result code.
    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode;
}

pub(crate) fn validate_scale(name: &str, value: f64) -> Result<(), String> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(format!("{} must be in (0, 1], got {}", name, value))
    }
}
