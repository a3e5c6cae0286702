//! # Host Configuration
//!
//! One TOML file configures the robot API, the HTTP control service and the
//! simulated arm.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [robot]
//! api_version = "1"
//! instance_lock = "/tmp/armctl.lock"
//! shutdown_timeout_ms = 2000
//!
//! [control]
//! bind = "127.0.0.1:3000"
//!
//! [simulator]
//! tick_ms = 5
//! seconds_per_radian = 0.5
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration apart
//! from `robot.api_version`, which the robot refuses to start without.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for the robot API, control service and simulator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub control: ControlServiceConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Robot API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    /// Major version of the API the caller was written against.
    #[serde(default)]
    pub api_version: Option<String>,
    /// Lock file guarding against a second robot process.
    #[serde(default)]
    pub instance_lock: Option<PathBuf>,
    #[serde(default = "default_instance_retry_ms")]
    pub instance_retry_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            api_version: None,
            instance_lock: None,
            instance_retry_ms: default_instance_retry_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl RobotConfig {
    /// Default settings requesting `version` of the API.
    pub fn for_version(version: &str) -> Self {
        Self {
            api_version: Some(version.to_string()),
            ..Self::default()
        }
    }
}

/// HTTP trigger endpoints for pause/resume/stop.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlServiceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ControlServiceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            bind: default_bind(),
        }
    }
}

/// Timing model of the simulated arm.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_seconds_per_radian")]
    pub seconds_per_radian: f64,
    #[serde(default = "default_seconds_per_meter")]
    pub seconds_per_meter: f64,
    #[serde(default = "default_gripper_seconds")]
    pub gripper_seconds: f64,
    /// Lower bound for any goal, so even a zero-length motion takes a tick.
    #[serde(default = "default_min_goal_ms")]
    pub min_goal_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            seconds_per_radian: default_seconds_per_radian(),
            seconds_per_meter: default_seconds_per_meter(),
            gripper_seconds: default_gripper_seconds(),
            min_goal_ms: default_min_goal_ms(),
        }
    }
}

impl Config {
    /// Validate value ranges the serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.robot.shutdown_timeout_ms == 0 {
            return Err(ConfigError::Invalid("robot.shutdown_timeout_ms must be > 0".to_string()));
        }
        if self.control.enabled && self.control.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "control.bind '{}' is not a socket address",
                self.control.bind
            )));
        }
        let sim = &self.simulator;
        if sim.tick_ms == 0 {
            return Err(ConfigError::Invalid("simulator.tick_ms must be > 0".to_string()));
        }
        for (name, value) in [
            ("seconds_per_radian", sim.seconds_per_radian),
            ("seconds_per_meter", sim.seconds_per_meter),
            ("gripper_seconds", sim.gripper_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("simulator.{} must be >= 0", name)));
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_instance_retry_ms() -> u64 { 1000 }
fn default_shutdown_timeout_ms() -> u64 { 2000 }
fn default_enabled() -> bool { true }
fn default_bind() -> String { "127.0.0.1:3000".to_string() }
fn default_tick_ms() -> u64 { 5 }
fn default_seconds_per_radian() -> f64 { 0.5 }
fn default_seconds_per_meter() -> f64 { 4.0 }
fn default_gripper_seconds() -> f64 { 0.5 }
fn default_min_goal_ms() -> u64 { 20 }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let config: Config = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate()?;
    Ok(config)
}
