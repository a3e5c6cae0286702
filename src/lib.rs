//! Pause, resume and stop for long-running robot motion commands.
//!
//! [`Robot::move_cmd`] runs a command on the calling thread while any other
//! thread may call [`Robot::pause`], [`Robot::resume`] or [`Robot::stop`]. The
//! shared [`ControlStateMachine`] decides how the execution loop reacts to the
//! outcome of every backend run.

pub mod backend;
pub mod commands;
pub mod config;
pub mod control;
pub mod error;
pub mod executor;
pub mod instance;
pub mod outcome;
pub mod program;
pub mod robot;
pub mod simulator;
pub mod web;

pub use backend::{GoalId, HandleState, MotionBackend, MotionGoal};
pub use commands::{Circ, Command, CommandSpec, Gripper, Lin, Ptp, Sequence, Target};
pub use config::{load_config, Config, ConfigError};
pub use control::{ControlAction, ControlState, ControlStateMachine, InvalidTransition};
pub use error::{MoveError, RobotError};
pub use executor::{CommandExecutor, ExecutionContext};
pub use outcome::{ExecutionOutcome, ResultCode};
pub use robot::{Robot, API_VERSION};
pub use simulator::SimulatedArm;
