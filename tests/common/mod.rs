// Shared helpers for the integration tests
#![allow(dead_code)]

use armctl::backend::{GoalItem, GoalTarget, PlannerId};
use armctl::config::{RobotConfig, SimulatorConfig};
use armctl::{
    Command, ExecutionContext, MotionGoal, Ptp, ResultCode, Robot, SimulatedArm, Target, API_VERSION,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Command whose every run is answered by a closure.
pub struct FnCommand<F> {
    pub calls: usize,
    f: F,
}

impl<F> FnCommand<F>
where
    F: FnMut(usize, &ExecutionContext<'_>) -> ResultCode + Send,
{
    pub fn new(f: F) -> Self {
        Self { calls: 0, f }
    }
}

impl<F> fmt::Debug for FnCommand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand").field("calls", &self.calls).finish()
    }
}

impl<F> Command for FnCommand<F>
where
    F: FnMut(usize, &ExecutionContext<'_>) -> ResultCode + Send,
{
    fn name(&self) -> &'static str {
        "FnCommand"
    }

    fn execute(&mut self, ctx: &ExecutionContext<'_>) -> ResultCode {
        let call = self.calls;
        self.calls += 1;
        (self.f)(call, ctx)
    }
}

/// Answers the runs with `codes` in order, then keeps repeating the last one.
pub fn scripted(
    codes: Vec<ResultCode>,
) -> FnCommand<impl FnMut(usize, &ExecutionContext<'_>) -> ResultCode + Send> {
    FnCommand::new(move |call, _ctx: &ExecutionContext<'_>| {
        codes
            .get(call)
            .or(codes.last())
            .copied()
            .unwrap_or(ResultCode::SUCCESS)
    })
}

pub fn robot_config() -> RobotConfig {
    RobotConfig {
        shutdown_timeout_ms: 500,
        ..RobotConfig::for_version(API_VERSION)
    }
}

/// Robot on a simulated arm that needs `seconds_per_radian` per radian of joint
/// motion, the same per meter of tool motion, and the same per gripper move.
pub fn sim_robot(seconds_per_radian: f64) -> (Arc<Robot>, Arc<SimulatedArm>) {
    let arm = Arc::new(SimulatedArm::new(SimulatorConfig {
        tick_ms: 1,
        seconds_per_radian,
        seconds_per_meter: seconds_per_radian,
        gripper_seconds: seconds_per_radian,
        min_goal_ms: 5,
        ..SimulatorConfig::default()
    }));
    let robot = Robot::new(&robot_config(), arm.clone()).unwrap();
    (Arc::new(robot), arm)
}

/// Ptp of one radian on the first joint.
pub fn one_radian() -> Ptp {
    Ptp::new(Target::Joints(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
}

/// Raw PTP joint goal, for commands that talk to the context directly.
pub fn joint_goal(joints: Vec<f64>) -> MotionGoal {
    MotionGoal::single(GoalItem {
        planner: PlannerId::Ptp,
        planning_group: "manipulator".to_string(),
        target_link: "prbt_tcp".to_string(),
        reference_frame: "prbt_base".to_string(),
        target: GoalTarget::Joints(joints),
        vel_scale: 1.0,
        acc_scale: 1.0,
        blend_radius: 0.0,
    })
}

pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
