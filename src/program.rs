// src/program.rs - Motion programs: ordered command lists stored as TOML
use crate::commands::CommandSpec;
use crate::error::MoveError;
use crate::robot::Robot;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Commands run one after another by the host.
///
/// ```toml
/// [[command]]
/// type = "ptp"
/// goal = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
///
/// [[command]]
/// type = "gripper"
/// goal = 0.03
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default, rename = "command")]
    pub commands: Vec<CommandSpec>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::str::FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

pub fn load_program(path: &Path) -> Result<Program, ProgramError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read program '{}': {}", path.display(), e);
        e
    })?;
    let program: Program = contents.parse()?;
    tracing::info!("Loaded {} commands from {}", program.len(), path.display());
    Ok(program)
}

/// Moves the commands of `program` one after another on the calling thread.
///
/// `interrupted` is checked before every command. Once it is set the program
/// ends with `MotionStopped`, even if the stop request itself landed between
/// two commands and was already cleared.
pub fn run_program(robot: &Robot, program: &Program, interrupted: &AtomicBool) -> Result<(), MoveError> {
    let total = program.len();
    for (index, spec) in program.commands.iter().enumerate() {
        if interrupted.load(Ordering::SeqCst) {
            tracing::warn!("Program interrupted before command {}", index + 1);
            return Err(MoveError::MotionStopped);
        }
        tracing::info!("Command {}/{}: {}", index + 1, total, spec.kind);
        if let Err(e) = robot.move_spec(spec) {
            if matches!(e, MoveError::MotionStopped) {
                tracing::warn!("Program stopped at command {}", index + 1);
            } else {
                tracing::error!("Program aborted at command {}: {}", index + 1, e);
            }
            return Err(e);
        }
    }
    tracing::info!("Program finished");
    Ok(())
}
