// src/executor.rs - Per-move execution loop driven by the control state
use crate::backend::{MotionBackend, MotionGoal};
use crate::commands::Command;
use crate::control::{ControlAction, ControlGuard, ControlState, ControlStateMachine};
use crate::error::MoveError;
use crate::outcome::{ExecutionOutcome, ResultCode};

/// What a command sees while it executes.
pub struct ExecutionContext<'a> {
    control: &'a ControlStateMachine,
    backend: &'a dyn MotionBackend,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(control: &'a ControlStateMachine, backend: &'a dyn MotionBackend) -> Self {
        Self { control, backend }
    }

    pub fn control_state(&self) -> ControlState {
        self.control.current_state()
    }

    /// Submits `goal` and blocks until the backend reports its result.
    ///
    /// Submission happens under the control lock. A pause or stop switched in
    /// before it means the goal is not sent at all and `PREEMPTED` is reported;
    /// one switched in after it finds the goal registered and cancels it.
    pub fn execute_goal(&self, goal: MotionGoal) -> ResultCode {
        {
            let control = self.control.lock();
            if control.state() != ControlState::NoRequest {
                tracing::debug!(state = %control.state(), "Control request pending, goal not sent");
                return ResultCode::PREEMPTED;
            }
            match self.backend.send_goal(goal) {
                Ok(id) => tracing::debug!(goal = %id, "Goal sent"),
                Err(e) => {
                    tracing::error!("Failed to send goal: {}", e);
                    return ResultCode::FAILURE;
                }
            }
        }
        self.backend
            .wait_for_result(None)
            .unwrap_or(ResultCode::FAILURE)
    }
}

#[derive(Debug)]
enum Phase {
    Executing,
    AwaitingResume,
    Completed,
    Aborted(MoveError),
}

/// Repeatedly executes one command until it succeeds or must be abandoned.
pub struct CommandExecutor<'a> {
    control: &'a ControlStateMachine,
    backend: &'a dyn MotionBackend,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(control: &'a ControlStateMachine, backend: &'a dyn MotionBackend) -> Self {
        Self { control, backend }
    }

    pub fn run(&self, cmd: &mut dyn Command) -> Result<(), MoveError> {
        let mut phase = Phase::Executing;
        loop {
            tracing::debug!(?phase, "Move execution loop");
            phase = match phase {
                Phase::Executing => self.execute_once(cmd),
                Phase::AwaitingResume => self.await_resume(),
                Phase::Completed => return Ok(()),
                Phase::Aborted(err) => return Err(err),
            };
        }
    }

    fn execute_once(&self, cmd: &mut dyn Command) -> Phase {
        {
            let mut control = self.control.lock();
            match control.state() {
                ControlState::StopRequested => return Self::stopped(control),
                ControlState::PauseRequested => return Phase::AwaitingResume,
                ControlState::ResumeRequested => {
                    if let Err(e) = control.switch(ControlAction::MotionResumed) {
                        return Phase::Aborted(e.into());
                    }
                }
                ControlState::NoRequest => {}
            }
        }

        tracing::debug!("Start execute");
        let code = cmd.execute(&ExecutionContext::new(self.control, self.backend));

        match code.outcome() {
            ExecutionOutcome::Success => Phase::Completed,
            ExecutionOutcome::Failure => {
                tracing::error!("Failure during execution of: {:?}", cmd);
                Phase::Aborted(MoveError::ExecutionFailed {
                    command: cmd.name().to_string(),
                    code,
                })
            }
            ExecutionOutcome::Preempted => {
                let control = self.control.lock();
                match control.state() {
                    ControlState::PauseRequested => Phase::AwaitingResume,
                    // paused and resumed again before the preemption surfaced
                    ControlState::ResumeRequested => Phase::Executing,
                    ControlState::NoRequest => {
                        tracing::error!("External stop of move command");
                        Phase::Aborted(MoveError::ExternalStop)
                    }
                    ControlState::StopRequested => Self::stopped(control),
                }
            }
        }
    }

    fn await_resume(&self) -> Phase {
        let control = self.control.lock().wait_for_resume();
        match control.state() {
            ControlState::StopRequested => Self::stopped(control),
            _ => Phase::Executing,
        }
    }

    /// Acknowledges the pending stop so the next move starts from `NoRequest`.
    fn stopped(mut control: ControlGuard<'_>) -> Phase {
        tracing::error!("Execution of move command is stopped");
        match control.switch(ControlAction::MotionStopped) {
            Ok(_) => Phase::Aborted(MoveError::MotionStopped),
            Err(e) => Phase::Aborted(e.into()),
        }
    }
}
