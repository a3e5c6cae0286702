// Move execution against the simulated arm and scripted commands

mod common;

use armctl::backend::{BackendError, GoalId, Pose};
use armctl::control::ControlAction;
use armctl::{
    CommandSpec, ControlState, ControlStateMachine, ExecutionContext, HandleState, MotionBackend,
    MotionGoal, MoveError, Ptp, ResultCode, Robot, Target,
};
use common::{joint_goal, one_radian, robot_config, scripted, sim_robot, wait_until, FnCommand};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Backend that either refuses every goal or never reports a result.
struct UnresponsiveBackend {
    refuse: bool,
    sent: AtomicUsize,
}

impl UnresponsiveBackend {
    fn new(refuse: bool) -> Self {
        Self {
            refuse,
            sent: AtomicUsize::new(0),
        }
    }
}

impl MotionBackend for UnresponsiveBackend {
    fn send_goal(&self, _goal: MotionGoal) -> Result<GoalId, BackendError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            Err(BackendError::Busy(GoalId(7)))
        } else {
            Ok(GoalId(1))
        }
    }

    fn wait_for_result(&self, _timeout: Option<Duration>) -> Option<ResultCode> {
        None
    }

    fn cancel_active(&self) {}

    fn handle_state(&self) -> HandleState {
        HandleState::Idle
    }
}

fn goal_running(arm: &armctl::SimulatedArm) -> bool {
    matches!(arm.handle_state(), HandleState::Active { .. })
}

#[test]
fn test_successful_move_reaches_target() {
    let (robot, arm) = sim_robot(0.01);
    robot.move_cmd(&mut one_radian()).unwrap();
    assert_eq!(arm.joint_positions(), vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(arm.goals_sent(), 1);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
    assert!(!robot.is_moving());
}

#[test]
fn test_failure_aborts_without_retry() {
    let (robot, _arm) = sim_robot(0.01);
    let mut cmd = scripted(vec![ResultCode::CONTROL_FAILED, ResultCode::SUCCESS]);
    let err = robot.move_cmd(&mut cmd).unwrap_err();
    assert!(matches!(
        err,
        MoveError::ExecutionFailed { code: ResultCode::CONTROL_FAILED, .. }
    ));
    assert_eq!(cmd.calls, 1);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_backend_fault_surfaces_as_execution_failure() {
    let (robot, arm) = sim_robot(0.01);
    arm.fail_next_goal(ResultCode::PLANNING_FAILED);
    let err = robot.move_cmd(&mut one_radian()).unwrap_err();
    assert!(matches!(
        err,
        MoveError::ExecutionFailed { code: ResultCode::PLANNING_FAILED, .. }
    ));
}

#[test]
fn test_second_move_is_rejected_while_first_runs() {
    let (robot, arm) = sim_robot(10.0);
    let mover = {
        let robot = robot.clone();
        std::thread::spawn(move || robot.move_cmd(&mut one_radian()))
    };
    assert!(wait_until(TIMEOUT, || goal_running(&arm)));
    assert!(robot.is_moving());

    let mut second = scripted(vec![ResultCode::SUCCESS]);
    assert!(matches!(robot.move_cmd(&mut second), Err(MoveError::MoveAlreadyRunning)));
    assert_eq!(second.calls, 0);
    assert_eq!(robot.control_state(), ControlState::NoRequest);

    robot.stop();
    assert!(matches!(mover.join().unwrap(), Err(MoveError::MotionStopped)));
}

#[test]
fn test_stop_during_motion() {
    let (robot, arm) = sim_robot(10.0);
    let mover = {
        let robot = robot.clone();
        std::thread::spawn(move || robot.move_cmd(&mut one_radian()))
    };
    assert!(wait_until(TIMEOUT, || goal_running(&arm)));

    robot.stop();
    assert!(matches!(mover.join().unwrap(), Err(MoveError::MotionStopped)));
    assert_eq!(robot.control_state(), ControlState::NoRequest);
    assert_eq!(arm.goals_sent(), 1);
    assert!(arm.joint_positions().is_empty());
}

#[test]
fn test_pause_then_resume_reexecutes_command() {
    let (robot, arm) = sim_robot(10.0);
    let mover = {
        let robot = robot.clone();
        std::thread::spawn(move || {
            // long first run, short second run
            let mut cmd = FnCommand::new(|call, ctx: &ExecutionContext<'_>| {
                let joint = if call == 0 { 1.0 } else { 0.001 };
                ctx.execute_goal(joint_goal(vec![joint]))
            });
            let result = robot.move_cmd(&mut cmd);
            (result, cmd.calls)
        })
    };
    assert!(wait_until(TIMEOUT, || goal_running(&arm)));

    robot.pause();
    assert!(wait_until(TIMEOUT, || !goal_running(&arm)));
    // parked: nothing is resubmitted while the pause is pending
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(arm.goals_sent(), 1);
    assert_eq!(robot.control_state(), ControlState::PauseRequested);
    assert!(robot.is_moving());

    robot.resume();
    let (result, calls) = mover.join().unwrap();
    result.unwrap();
    assert_eq!(calls, 2);
    assert_eq!(arm.goals_sent(), 2);
    assert_eq!(arm.joint_positions(), vec![0.001]);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_stop_while_paused() {
    let (robot, arm) = sim_robot(10.0);
    let mover = {
        let robot = robot.clone();
        std::thread::spawn(move || robot.move_cmd(&mut one_radian()))
    };
    assert!(wait_until(TIMEOUT, || goal_running(&arm)));

    robot.pause();
    assert!(wait_until(TIMEOUT, || !goal_running(&arm)));
    robot.stop();
    assert!(matches!(mover.join().unwrap(), Err(MoveError::MotionStopped)));
    assert_eq!(arm.goals_sent(), 1);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_cancel_from_outside_is_external_stop() {
    let (robot, arm) = sim_robot(10.0);
    let mover = {
        let robot = robot.clone();
        std::thread::spawn(move || robot.move_cmd(&mut one_radian()))
    };
    assert!(wait_until(TIMEOUT, || goal_running(&arm)));

    arm.cancel_active();
    assert!(matches!(mover.join().unwrap(), Err(MoveError::ExternalStop)));
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_control_calls_without_move_are_safe() {
    let (robot, arm) = sim_robot(0.01);
    robot.resume();
    assert_eq!(robot.control_state(), ControlState::NoRequest);
    robot.stop();
    robot.pause();
    robot.resume();
    assert_eq!(robot.control_state(), ControlState::StopRequested);

    // the stale stop does not abort the next move
    let mut cmd = scripted(vec![ResultCode::SUCCESS]);
    robot.move_cmd(&mut cmd).unwrap();
    assert_eq!(cmd.calls, 1);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
    assert_eq!(arm.goals_sent(), 0);
}

#[test]
fn test_stale_resume_is_cleared_on_next_move() {
    let (robot, _arm) = sim_robot(0.01);
    robot.pause();
    robot.resume();
    assert_eq!(robot.control_state(), ControlState::ResumeRequested);
    robot.move_cmd(&mut scripted(vec![ResultCode::SUCCESS])).unwrap();
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_pending_pause_holds_next_move_until_resume() {
    let (robot, _arm) = sim_robot(0.01);
    robot.pause();

    let runs = Arc::new(AtomicUsize::new(0));
    let mover = {
        let robot = robot.clone();
        let runs = runs.clone();
        std::thread::spawn(move || {
            let mut cmd = FnCommand::new(move |_, _: &ExecutionContext<'_>| {
                runs.fetch_add(1, Ordering::SeqCst);
                ResultCode::SUCCESS
            });
            robot.move_cmd(&mut cmd)
        })
    };
    assert!(wait_until(TIMEOUT, || robot.is_moving()));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    robot.resume();
    mover.join().unwrap().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_pause_and_resume_inside_one_run_reexecutes() {
    let (robot, _arm) = sim_robot(0.01);
    let control = robot.control().clone();
    let mut cmd = FnCommand::new(move |call, _: &ExecutionContext<'_>| {
        if call == 0 {
            control.switch(ControlAction::Pause).unwrap();
            control.switch(ControlAction::Resume).unwrap();
            ResultCode::PREEMPTED
        } else {
            ResultCode::SUCCESS
        }
    });
    robot.move_cmd(&mut cmd).unwrap();
    assert_eq!(cmd.calls, 2);
    assert_eq!(robot.control_state(), ControlState::NoRequest);
}

#[test]
fn test_goal_not_sent_while_request_pending() {
    let (_robot, arm) = sim_robot(0.01);
    for state in [ControlState::PauseRequested, ControlState::StopRequested] {
        let control = ControlStateMachine::with_state(state);
        let ctx = ExecutionContext::new(&control, arm.as_ref());
        assert_eq!(ctx.control_state(), state);
        assert_eq!(ctx.execute_goal(joint_goal(vec![0.5])), ResultCode::PREEMPTED);
    }
    assert_eq!(arm.goals_sent(), 0);
}

#[test]
fn test_shutdown_cancels_active_goal() {
    let (robot, arm) = sim_robot(10.0);
    let mover = {
        let robot = robot.clone();
        std::thread::spawn(move || robot.move_cmd(&mut one_radian()))
    };
    assert!(wait_until(TIMEOUT, || goal_running(&arm)));

    robot.shutdown();
    assert_eq!(arm.cancel_requests(), 1);
    assert!(matches!(mover.join().unwrap(), Err(MoveError::ExternalStop)));

    // second call is a no-op
    robot.shutdown();
    assert_eq!(arm.cancel_requests(), 1);
}

#[test]
fn test_shutdown_when_idle_sends_no_cancel() {
    let (robot, arm) = sim_robot(0.01);
    robot.move_cmd(&mut one_radian()).unwrap();
    robot.shutdown();
    assert_eq!(arm.cancel_requests(), 0);
}

#[test]
fn test_unknown_command_type_leaves_state_alone() {
    let (robot, arm) = sim_robot(0.01);
    robot.pause();
    let err = robot
        .move_spec(&CommandSpec::new("teleport", toml::Table::new()))
        .unwrap_err();
    assert!(matches!(err, MoveError::UnknownCommandType(ref kind) if kind == "teleport"));
    assert_eq!(robot.control_state(), ControlState::PauseRequested);
    assert_eq!(arm.goals_sent(), 0);
}

#[test]
fn test_invalid_command_is_rejected_before_execution() {
    let (robot, arm) = sim_robot(0.01);
    let mut cmd = Ptp::new(Target::Joints(vec![0.0; 6])).with_scaling(1.5, 1.0);
    let err = robot.move_cmd(&mut cmd).unwrap_err();
    assert!(matches!(err, MoveError::InvalidCommand { ref command, .. } if command == "Ptp"));
    assert_eq!(arm.goals_sent(), 0);
    assert!(!robot.is_moving());
}

#[test]
fn test_non_finite_pose_is_rejected_before_sending() {
    let (robot, arm) = sim_robot(0.01);
    let mut cmd = Ptp::new(Target::Pose(Pose::from_position([f64::NAN, 0.0, 0.0])));
    let err = robot.move_cmd(&mut cmd).unwrap_err();
    assert!(matches!(err, MoveError::InvalidCommand { .. }));
    assert_eq!(arm.goals_sent(), 0);
}

#[test]
fn test_goal_the_arm_cannot_time_fails_the_move() {
    let (robot, arm) = sim_robot(0.01);
    let mut cmd = Ptp::new(Target::Joints(vec![1e300, 0.0, 0.0, 0.0, 0.0, 0.0]));
    let err = robot.move_cmd(&mut cmd).unwrap_err();
    assert!(matches!(
        err,
        MoveError::ExecutionFailed { code: ResultCode::FAILURE, .. }
    ));
    assert_eq!(arm.goals_sent(), 0);
    assert_eq!(robot.control_state(), ControlState::NoRequest);

    // the arm is still usable afterwards
    robot.move_cmd(&mut one_radian()).unwrap();
}

#[test]
fn test_refused_or_silent_backend_fails_after_one_run() {
    for refuse in [true, false] {
        let backend = Arc::new(UnresponsiveBackend::new(refuse));
        let control = Arc::new(ControlStateMachine::new());
        let robot = Robot::with_control(&robot_config(), backend.clone(), control.clone()).unwrap();

        let err = robot.move_cmd(&mut one_radian()).unwrap_err();
        assert!(matches!(
            err,
            MoveError::ExecutionFailed { code: ResultCode::FAILURE, .. }
        ));
        assert_eq!(backend.sent.load(Ordering::SeqCst), 1);

        // requests go to the shared state machine
        robot.pause();
        assert_eq!(control.current_state(), ControlState::PauseRequested);
    }
}
