// src/error.rs - Errors surfaced by the robot facade
use crate::config::ConfigError;
use crate::control::InvalidTransition;
use crate::outcome::ResultCode;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a `move` call ends without completing its command.
///
/// Every variant aborts the current move. No variant is retried.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("Unknown command type: {0}")]
    UnknownCommandType(String),
    #[error("Invalid {command} command: {reason}")]
    InvalidCommand { command: String, reason: String },
    #[error("Parallel calls to move are not allowed")]
    MoveAlreadyRunning,
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// The backend was preempted through a channel other than pause/stop.
    #[error("External stop of move command")]
    ExternalStop,
    #[error("Execution of move command is stopped")]
    MotionStopped,
    #[error("Failure during execution of {command}: {code}")]
    ExecutionFailed { command: String, code: ResultCode },
}

#[derive(Debug, Error)]
pub enum RobotError {
    #[error("Version of Robot API is not set! Current installed version is {installed}!")]
    VersionNotSet { installed: &'static str },
    #[error("Version of Robot API does not match! Requested {requested}, current installed version is {installed}!")]
    Version {
        requested: String,
        installed: &'static str,
    },
    #[error("Only one instance of Robot can be created (lock held at {})", path.display())]
    MultipleInstances { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
