// src/commands/motion.rs - Single point-to-point, linear and circular motions
use super::{validate_scale, Command, DEFAULT_BASE_LINK, DEFAULT_PLANNING_GROUP, DEFAULT_TARGET_LINK};
use crate::backend::{CircAuxiliary, GoalItem, GoalTarget, MotionGoal, PlannerId, Pose};
use crate::executor::ExecutionContext;
use crate::outcome::ResultCode;
use serde::{Deserialize, Serialize};

/// Goal of a Ptp or Lin motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Joints(Vec<f64>),
    Pose(Pose),
}

impl From<Target> for GoalTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Joints(joints) => GoalTarget::Joints(joints),
            Target::Pose(pose) => GoalTarget::Pose(pose),
        }
    }
}

fn validate_target(target: &Target) -> Result<(), String> {
    match target {
        Target::Joints(joints) if joints.is_empty() => Err("joint goal is empty".to_string()),
        Target::Joints(joints) if joints.iter().any(|j| !j.is_finite()) => {
            Err("joint goal contains a non-finite value".to_string())
        }
        Target::Joints(_) => Ok(()),
        Target::Pose(pose) => validate_pose("goal", pose),
    }
}

fn validate_pose(name: &str, pose: &Pose) -> Result<(), String> {
    validate_point(&format!("{} position", name), &pose.position)?;
    if pose.orientation.iter().any(|q| !q.is_finite()) {
        return Err(format!("{} orientation contains a non-finite value", name));
    }
    Ok(())
}

fn validate_point(name: &str, point: &[f64; 3]) -> Result<(), String> {
    if point.iter().any(|c| !c.is_finite()) {
        return Err(format!("{} contains a non-finite value", name));
    }
    Ok(())
}

/// Point-to-point motion, moves every joint along its shortest path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ptp {
    pub goal: Target,
    #[serde(default = "full_scale")]
    pub vel_scale: f64,
    #[serde(default = "full_scale")]
    pub acc_scale: f64,
    #[serde(default = "default_planning_group")]
    pub planning_group: String,
    #[serde(default = "default_target_link")]
    pub target_link: String,
    #[serde(default = "default_reference_frame")]
    pub reference_frame: String,
}

impl Ptp {
    pub fn new(goal: Target) -> Self {
        Self {
            goal,
            vel_scale: full_scale(),
            acc_scale: full_scale(),
            planning_group: default_planning_group(),
            target_link: default_target_link(),
            reference_frame: default_reference_frame(),
        }
    }

    pub fn with_scaling(mut self, vel_scale: f64, acc_scale: f64) -> Self {
        self.vel_scale = vel_scale;
        self.acc_scale = acc_scale;
        self
    }

    pub(crate) fn goal_item(&self, blend_radius: f64) -> GoalItem {
        GoalItem {
            planner: PlannerId::Ptp,
            planning_group: self.planning_group.clone(),
            target_link: self.target_link.clone(),
            reference_frame: self.reference_frame.clone(),
            target: self.goal.clone().into(),
            vel_scale: self.vel_scale,
            acc_scale: self.acc_scale,
            blend_radius,
        }
    }
}

impl Command for Ptp {
    fn name(&self) -> &'static str {
        "Ptp"
    }

    fn validate(&self) -> Result<(), String> {
        validate_scale("vel_scale", self.vel_scale)?;
        validate_scale("acc_scale", self.acc_scale)?;
        validate_target(&self.goal)
    }

    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode {
        ctx.execute_goal(MotionGoal::single(self.goal_item(0.0)))
    }
}

/// Linear motion of the target link in cartesian space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lin {
    pub goal: Target,
    #[serde(default = "cartesian_scale")]
    pub vel_scale: f64,
    #[serde(default = "cartesian_scale")]
    pub acc_scale: f64,
    #[serde(default = "default_planning_group")]
    pub planning_group: String,
    #[serde(default = "default_target_link")]
    pub target_link: String,
    #[serde(default = "default_reference_frame")]
    pub reference_frame: String,
}

impl Lin {
    pub fn new(goal: Target) -> Self {
        Self {
            goal,
            vel_scale: cartesian_scale(),
            acc_scale: cartesian_scale(),
            planning_group: default_planning_group(),
            target_link: default_target_link(),
            reference_frame: default_reference_frame(),
        }
    }

    pub fn with_scaling(mut self, vel_scale: f64, acc_scale: f64) -> Self {
        self.vel_scale = vel_scale;
        self.acc_scale = acc_scale;
        self
    }

    pub(crate) fn goal_item(&self, blend_radius: f64) -> GoalItem {
        GoalItem {
            planner: PlannerId::Lin,
            planning_group: self.planning_group.clone(),
            target_link: self.target_link.clone(),
            reference_frame: self.reference_frame.clone(),
            target: self.goal.clone().into(),
            vel_scale: self.vel_scale,
            acc_scale: self.acc_scale,
            blend_radius,
        }
    }
}

impl Command for Lin {
    fn name(&self) -> &'static str {
        "Lin"
    }

    fn validate(&self) -> Result<(), String> {
        validate_scale("vel_scale", self.vel_scale)?;
        validate_scale("acc_scale", self.acc_scale)?;
        validate_target(&self.goal)
    }

    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode {
        ctx.execute_goal(MotionGoal::single(self.goal_item(0.0)))
    }
}

/// Circular motion, defined by either a center or an interim point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circ {
    pub goal: Pose,
    #[serde(default)]
    pub center: Option<[f64; 3]>,
    #[serde(default)]
    pub interim: Option<[f64; 3]>,
    #[serde(default = "cartesian_scale")]
    pub vel_scale: f64,
    #[serde(default = "cartesian_scale")]
    pub acc_scale: f64,
    #[serde(default = "default_planning_group")]
    pub planning_group: String,
    #[serde(default = "default_target_link")]
    pub target_link: String,
    #[serde(default = "default_reference_frame")]
    pub reference_frame: String,
}

impl Circ {
    pub fn with_center(goal: Pose, center: [f64; 3]) -> Self {
        Self::new(goal, Some(center), None)
    }

    pub fn with_interim(goal: Pose, interim: [f64; 3]) -> Self {
        Self::new(goal, None, Some(interim))
    }

    fn new(goal: Pose, center: Option<[f64; 3]>, interim: Option<[f64; 3]>) -> Self {
        Self {
            goal,
            center,
            interim,
            vel_scale: cartesian_scale(),
            acc_scale: cartesian_scale(),
            planning_group: default_planning_group(),
            target_link: default_target_link(),
            reference_frame: default_reference_frame(),
        }
    }

    fn auxiliary(&self) -> Option<CircAuxiliary> {
        match (self.center, self.interim) {
            (Some(center), None) => Some(CircAuxiliary::Center(center)),
            (None, Some(interim)) => Some(CircAuxiliary::Interim(interim)),
            _ => None,
        }
    }

    pub(crate) fn goal_item(&self, blend_radius: f64) -> GoalItem {
        let target = match self.auxiliary() {
            Some(auxiliary) => GoalTarget::Arc {
                goal: self.goal,
                auxiliary,
            },
            // rejected by validate before a move starts
            None => GoalTarget::Pose(self.goal),
        };
        GoalItem {
            planner: PlannerId::Circ,
            planning_group: self.planning_group.clone(),
            target_link: self.target_link.clone(),
            reference_frame: self.reference_frame.clone(),
            target,
            vel_scale: self.vel_scale,
            acc_scale: self.acc_scale,
            blend_radius,
        }
    }
}

impl Command for Circ {
    fn name(&self) -> &'static str {
        "Circ"
    }

    fn validate(&self) -> Result<(), String> {
        validate_scale("vel_scale", self.vel_scale)?;
        validate_scale("acc_scale", self.acc_scale)?;
        validate_pose("goal", &self.goal)?;
        match self.auxiliary() {
            Some(CircAuxiliary::Center(center)) => validate_point("center", &center),
            Some(CircAuxiliary::Interim(interim)) => validate_point("interim", &interim),
            None => Err("exactly one of center or interim must be given".to_string()),
        }
    }

    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode {
        ctx.execute_goal(MotionGoal::single(self.goal_item(0.0)))
    }
}

fn full_scale() -> f64 { 1.0 }
fn cartesian_scale() -> f64 { 0.1 }
fn default_planning_group() -> String { DEFAULT_PLANNING_GROUP.to_string() }
fn default_target_link() -> String { DEFAULT_TARGET_LINK.to_string() }
fn default_reference_frame() -> String { DEFAULT_BASE_LINK.to_string() }
