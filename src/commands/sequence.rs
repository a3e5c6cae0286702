// src/commands/sequence.rs - Blended chains of motion commands
use super::{Circ, Command, Lin, Ptp};
use crate::backend::{GoalItem, MotionGoal};
use crate::executor::ExecutionContext;
use crate::outcome::ResultCode;
use serde::{Deserialize, Serialize};

/// A motion allowed inside a sequence. Gripper commands are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SequenceMotion {
    Ptp(Ptp),
    Lin(Lin),
    Circ(Circ),
}

impl SequenceMotion {
    fn as_command(&self) -> &dyn Command {
        match self {
            SequenceMotion::Ptp(cmd) => cmd,
            SequenceMotion::Lin(cmd) => cmd,
            SequenceMotion::Circ(cmd) => cmd,
        }
    }

    fn goal_item(&self, blend_radius: f64) -> GoalItem {
        match self {
            SequenceMotion::Ptp(cmd) => cmd.goal_item(blend_radius),
            SequenceMotion::Lin(cmd) => cmd.goal_item(blend_radius),
            SequenceMotion::Circ(cmd) => cmd.goal_item(blend_radius),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub motion: SequenceMotion,
    #[serde(default)]
    pub blend_radius: f64,
}

/// Several motions executed as one goal, optionally blended into each other.
///
/// The blend radius of an item applies to the transition into the next item,
/// so the radius of the last item must be zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub items: Vec<SequenceItem>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(mut self, motion: impl Into<SequenceMotion>, blend_radius: f64) -> Self {
        self.items.push(SequenceItem {
            motion: motion.into(),
            blend_radius,
        });
        self
    }

    pub fn goal(&self) -> MotionGoal {
        MotionGoal {
            items: self
                .items
                .iter()
                .map(|item| item.motion.goal_item(item.blend_radius))
                .collect(),
        }
    }
}

impl From<Ptp> for SequenceMotion {
    fn from(cmd: Ptp) -> Self {
        SequenceMotion::Ptp(cmd)
    }
}

impl From<Lin> for SequenceMotion {
    fn from(cmd: Lin) -> Self {
        SequenceMotion::Lin(cmd)
    }
}

impl From<Circ> for SequenceMotion {
    fn from(cmd: Circ) -> Self {
        SequenceMotion::Circ(cmd)
    }
}

impl Command for Sequence {
    fn name(&self) -> &'static str {
        "Sequence"
    }

    fn validate(&self) -> Result<(), String> {
        let Some(last) = self.items.last() else {
            return Err("sequence has no items".to_string());
        };
        for (index, item) in self.items.iter().enumerate() {
            if item.blend_radius < 0.0 || !item.blend_radius.is_finite() {
                return Err(format!("item {} has invalid blend radius {}", index, item.blend_radius));
            }
            item.motion
                .as_command()
                .validate()
                .map_err(|reason| format!("item {}: {}", index, reason))?;
        }
        if last.blend_radius != 0.0 {
            return Err("blend radius of the last item must be zero".to_string());
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode {
        ctx.execute_goal(self.goal())
    }
}
