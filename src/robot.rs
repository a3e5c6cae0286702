// src/robot.rs - Public facade: move, pause, resume, stop
use crate::backend::{HandleState, MotionBackend};
use crate::commands::{Command, CommandSpec};
use crate::config::RobotConfig;
use crate::control::{ControlAction, ControlState, ControlStateMachine};
use crate::error::{MoveError, RobotError};
use crate::executor::CommandExecutor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Duration;

/// Version of the robot API implemented by this crate.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Executes motion commands and lets other threads pause, resume or stop them.
///
/// `move_cmd` blocks the calling thread until the command finished, so the
/// control calls have to come from a different thread. Share the robot through
/// an `Arc`.
pub struct Robot {
    control: Arc<ControlStateMachine>,
    backend: Arc<dyn MotionBackend>,
    move_lock: Mutex<()>,
    moving: AtomicBool,
    shutdown_timeout: Duration,
    shut_down: AtomicBool,
}

/// Held for the duration of one move.
struct MoveInProgress<'a> {
    _lock: MutexGuard<'a, ()>,
    moving: &'a AtomicBool,
}

impl Drop for MoveInProgress<'_> {
    fn drop(&mut self) {
        self.moving.store(false, Ordering::SeqCst);
    }
}

impl Robot {
    pub fn new(config: &RobotConfig, backend: Arc<dyn MotionBackend>) -> Result<Self, RobotError> {
        Self::with_control(config, backend, Arc::new(ControlStateMachine::new()))
    }

    /// Uses an existing control state machine, e.g. one shared with a monitor.
    pub fn with_control(
        config: &RobotConfig,
        backend: Arc<dyn MotionBackend>,
        control: Arc<ControlStateMachine>,
    ) -> Result<Self, RobotError> {
        tracing::debug!("Initialize Robot API");
        check_version(config.api_version.as_deref())?;
        Ok(Self {
            control,
            backend,
            move_lock: Mutex::new(()),
            moving: AtomicBool::new(false),
            shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms),
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn control(&self) -> &Arc<ControlStateMachine> {
        &self.control
    }

    pub fn control_state(&self) -> ControlState {
        self.control.current_state()
    }

    pub fn is_moving(&self) -> bool {
        self.moving.load(Ordering::SeqCst)
    }

    /// Executes `cmd` and blocks until it is done.
    ///
    /// Fails with `MoveAlreadyRunning` instead of waiting when another move is
    /// active. Any error means the command did not complete and no further
    /// commands should be sent blindly.
    pub fn move_cmd(&self, cmd: &mut dyn Command) -> Result<(), MoveError> {
        cmd.validate().map_err(|reason| {
            tracing::error!("Invalid {} command: {}", cmd.name(), reason);
            MoveError::InvalidCommand {
                command: cmd.name().to_string(),
                reason,
            }
        })?;

        let _in_progress = self.begin_move()?;

        tracing::info!("Move: {}", cmd.name());
        tracing::debug!("Move: {:?}", cmd);

        {
            let mut control = self.control.lock();
            if control.state() == ControlState::StopRequested {
                control.switch(ControlAction::MotionStopped)?;
            }
            if control.state() == ControlState::ResumeRequested {
                control.switch(ControlAction::MotionResumed)?;
            }
        }

        let span = tracing::info_span!("move", id = %uuid::Uuid::new_v4(), command = cmd.name());
        let _enter = span.enter();
        CommandExecutor::new(&self.control, self.backend.as_ref()).run(cmd)
    }

    /// Resolves a program-file command and moves it.
    pub fn move_spec(&self, spec: &CommandSpec) -> Result<(), MoveError> {
        let mut cmd = spec.to_command()?;
        self.move_cmd(cmd.as_mut())
    }

    /// Interrupts the running command; `move_cmd` then waits for `resume`.
    pub fn pause(&self) {
        tracing::info!("Pause called.");
        self.request(ControlAction::Pause);
        self.backend.cancel_active();
    }

    /// Continues a paused command. Has no effect when nothing is paused.
    pub fn resume(&self) {
        tracing::info!("Resume called.");
        self.request(ControlAction::Resume);
    }

    /// Cancels the running command, paused or not. `move_cmd` returns `MotionStopped`.
    pub fn stop(&self) {
        tracing::info!("Stop called.");
        self.request(ControlAction::Stop);
        self.backend.cancel_active();
    }

    /// Cancels a goal still in flight and waits for it to settle.
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("Robot shutdown");

        // a goal being submitted right now holds the control lock
        let handle = {
            let _control = self.control.lock();
            self.backend.handle_state()
        };

        if let HandleState::Active { goal } = handle {
            tracing::info!("Canceling goal {} before shutdown", goal);
            self.backend.cancel_active();
            if self.backend.wait_for_result(Some(self.shutdown_timeout)).is_none() {
                tracing::warn!(
                    "Goal {} did not finish within {:?} after cancel",
                    goal,
                    self.shutdown_timeout
                );
            }
        }
    }

    fn begin_move(&self) -> Result<MoveInProgress<'_>, MoveError> {
        let lock = match self.move_lock.try_lock() {
            Ok(lock) => lock,
            // a previous move panicked; the lock protects no data
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::error!("Parallel calls to move are not allowed.");
                return Err(MoveError::MoveAlreadyRunning);
            }
        };
        self.moving.store(true, Ordering::SeqCst);
        Ok(MoveInProgress {
            _lock: lock,
            moving: &self.moving,
        })
    }

    fn request(&self, action: ControlAction) {
        // external requests are defined in every state
        if let Err(e) = self.control.switch(action) {
            tracing::error!("Control request dropped: {}", e);
        }
    }
}

impl Drop for Robot {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn check_version(requested: Option<&str>) -> Result<(), RobotError> {
    let Some(requested) = requested else {
        tracing::error!("Version of Robot API is not set!");
        return Err(RobotError::VersionNotSet {
            installed: API_VERSION,
        });
    };
    let installed_major = API_VERSION.split('.').next().unwrap_or(API_VERSION);
    let requested_major = requested.split('.').next().unwrap_or(requested);
    if requested_major != installed_major {
        tracing::error!("Version of Robot API does not match!");
        return Err(RobotError::Version {
            requested: requested.to_string(),
            installed: API_VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_check() {
        assert!(matches!(check_version(None), Err(RobotError::VersionNotSet { .. })));
        assert!(check_version(Some("1")).is_ok());
        assert!(check_version(Some("1.4")).is_ok());
        assert!(matches!(
            check_version(Some("2")),
            Err(RobotError::Version { ref requested, .. }) if requested == "2"
        ));
    }
}
