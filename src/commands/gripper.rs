// src/commands/gripper.rs - Opening and closing the gripper
use super::{validate_scale, Command, DEFAULT_BASE_LINK, DEFAULT_GRIPPER_GROUP};
use crate::backend::{GoalItem, GoalTarget, MotionGoal, PlannerId};
use crate::executor::ExecutionContext;
use crate::outcome::ResultCode;
use serde::{Deserialize, Serialize};

/// Moves the gripper jaws to `goal` meters apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gripper {
    pub goal: f64,
    #[serde(default = "default_vel_scale")]
    pub vel_scale: f64,
}

impl Gripper {
    pub fn new(goal: f64) -> Self {
        Self {
            goal,
            vel_scale: default_vel_scale(),
        }
    }
}

impl Command for Gripper {
    fn name(&self) -> &'static str {
        "Gripper"
    }

    fn validate(&self) -> Result<(), String> {
        validate_scale("vel_scale", self.vel_scale)?;
        if !self.goal.is_finite() || self.goal < 0.0 {
            return Err(format!("gripper width must be >= 0, got {}", self.goal));
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode {
        ctx.execute_goal(MotionGoal::single(GoalItem {
            planner: PlannerId::Ptp,
            planning_group: DEFAULT_GRIPPER_GROUP.to_string(),
            target_link: String::new(),
            reference_frame: DEFAULT_BASE_LINK.to_string(),
            target: GoalTarget::GripperWidth(self.goal),
            vel_scale: self.vel_scale,
            acc_scale: 1.0,
            blend_radius: 0.0,
        }))
    }
}

fn default_vel_scale() -> f64 { 1.0 }
