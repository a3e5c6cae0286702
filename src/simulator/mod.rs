//! Simulated arm backend.
//!
//! Goals take wall-clock time proportional to the distance they cover and
//! their velocity scaling. No kinematics are involved: joint goals move the
//! simulated joints, pose goals move the simulated tool point, and the two are
//! tracked independently.

use crate::backend::{BackendError, GoalId, GoalTarget, HandleState, MotionBackend, MotionGoal};
use crate::config::SimulatorConfig;
use crate::outcome::ResultCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct ActiveGoal {
    id: GoalId,
    goal: MotionGoal,
    started: Instant,
    duration: Duration,
    canceled: bool,
}

#[derive(Debug, Default)]
struct SimState {
    active: Option<ActiveGoal>,
    last_result: Option<(GoalId, ResultCode)>,
    joints: Vec<f64>,
    tcp: [f64; 3],
    gripper: f64,
    armed_fault: Option<ResultCode>,
    lost: bool,
    goals_sent: usize,
    cancel_requests: usize,
}

pub struct SimulatedArm {
    config: SimulatorConfig,
    state: Mutex<SimState>,
    changed: Condvar,
    next_goal: AtomicU64,
}

impl SimulatedArm {
    pub fn new(config: SimulatorConfig) -> Self {
        tracing::info!(
            "Simulated arm initialized (tick {} ms, {} s/rad)",
            config.tick_ms,
            config.seconds_per_radian
        );
        Self {
            config,
            state: Mutex::new(SimState::default()),
            changed: Condvar::new(),
            next_goal: AtomicU64::new(1),
        }
    }

    /// Makes the next running goal fail with `code` instead of completing.
    pub fn fail_next_goal(&self, code: ResultCode) {
        self.lock().armed_fault = Some(code);
    }

    /// Drops the connection to the running goal, which then reports failure.
    pub fn disconnect(&self) {
        let mut state = self.lock();
        state.lost = true;
        if let Some(active) = state.active.take() {
            tracing::warn!("Lost goal {}", active.id);
            state.last_result = Some((active.id, ResultCode::CONTROL_FAILED));
        }
        self.changed.notify_all();
    }

    pub fn goals_sent(&self) -> usize {
        self.lock().goals_sent
    }

    pub fn cancel_requests(&self) -> usize {
        self.lock().cancel_requests
    }

    pub fn joint_positions(&self) -> Vec<f64> {
        self.lock().joints.clone()
    }

    pub fn tcp_position(&self) -> [f64; 3] {
        self.lock().tcp
    }

    pub fn gripper_width(&self) -> f64 {
        self.lock().gripper
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn goal_duration(&self, state: &SimState, goal: &MotionGoal) -> Result<Duration, BackendError> {
        let mut joints = state.joints.clone();
        let mut tcp = state.tcp;
        let mut gripper = state.gripper;
        let mut seconds = 0.0;

        for item in &goal.items {
            let scale = item.vel_scale.max(f64::EPSILON);
            match &item.target {
                GoalTarget::Joints(target) => {
                    let distance = target
                        .iter()
                        .enumerate()
                        .map(|(i, t)| (t - joints.get(i).copied().unwrap_or(0.0)).abs())
                        .fold(0.0, |max: f64, d| if d.is_nan() || d > max { d } else { max });
                    seconds += distance * self.config.seconds_per_radian / scale;
                    joints = target.clone();
                }
                GoalTarget::Pose(pose) | GoalTarget::Arc { goal: pose, .. } => {
                    seconds += distance(tcp, pose.position) * self.config.seconds_per_meter / scale;
                    tcp = pose.position;
                }
                GoalTarget::GripperWidth(width) => {
                    if (width - gripper).abs() > f64::EPSILON {
                        seconds += self.config.gripper_seconds / scale;
                    }
                    gripper = *width;
                }
            }
        }

        let duration = Duration::try_from_secs_f64(seconds)
            .map_err(|e| BackendError::Rejected(format!("goal duration of {} s: {}", seconds, e)))?;
        Ok(duration.max(Duration::from_millis(self.config.min_goal_ms)))
    }

    fn finish(&self, state: &mut SimState, code: ResultCode) -> ResultCode {
        if let Some(active) = state.active.take() {
            if code == ResultCode::SUCCESS {
                apply_goal(state, &active.goal);
            }
            tracing::debug!(goal = %active.id, %code, "Goal finished");
            state.last_result = Some((active.id, code));
        }
        self.changed.notify_all();
        code
    }
}

impl MotionBackend for SimulatedArm {
    fn send_goal(&self, goal: MotionGoal) -> Result<GoalId, BackendError> {
        let mut state = self.lock();
        if let Some(active) = &state.active {
            return Err(BackendError::Busy(active.id));
        }
        let id = GoalId(self.next_goal.fetch_add(1, Ordering::SeqCst));
        let duration = self.goal_duration(&state, &goal)?;
        tracing::debug!(goal = %id, items = goal.items.len(), ?duration, "Goal accepted");
        state.active = Some(ActiveGoal {
            id,
            goal,
            started: Instant::now(),
            duration,
            canceled: false,
        });
        state.lost = false;
        state.goals_sent += 1;
        Ok(id)
    }

    fn wait_for_result(&self, timeout: Option<Duration>) -> Option<ResultCode> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let tick = Duration::from_millis(self.config.tick_ms);
        let mut state = self.lock();

        loop {
            let (canceled, started, duration) = match &state.active {
                Some(active) => (active.canceled, active.started, active.duration),
                None => return state.last_result.map(|(_, code)| code),
            };
            if canceled {
                return Some(self.finish(&mut state, ResultCode::PREEMPTED));
            }
            if let Some(code) = state.armed_fault.take() {
                return Some(self.finish(&mut state, code));
            }
            let elapsed = started.elapsed();
            if elapsed >= duration {
                return Some(self.finish(&mut state, ResultCode::SUCCESS));
            }

            let mut wait = tick.min(duration - elapsed);
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return None;
                }
                wait = wait.min(deadline - now);
            }
            state = self
                .changed
                .wait_timeout(state, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn cancel_active(&self) {
        let mut state = self.lock();
        state.cancel_requests += 1;
        if let Some(active) = state.active.as_mut() {
            tracing::debug!(goal = %active.id, "Cancel requested");
            active.canceled = true;
            self.changed.notify_all();
        }
    }

    fn handle_state(&self) -> HandleState {
        let state = self.lock();
        match &state.active {
            Some(active) => HandleState::Active { goal: active.id },
            None if state.lost => HandleState::Lost,
            None => HandleState::Idle,
        }
    }
}

fn apply_goal(state: &mut SimState, goal: &MotionGoal) {
    for item in &goal.items {
        match &item.target {
            GoalTarget::Joints(target) => state.joints = target.clone(),
            GoalTarget::Pose(pose) | GoalTarget::Arc { goal: pose, .. } => state.tcp = pose.position,
            GoalTarget::GripperWidth(width) => state.gripper = *width,
        }
    }
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
