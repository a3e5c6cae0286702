//! Contains the data models for API responses.

use crate::control::ControlState;
use serde::{Deserialize, Serialize};

/// Result of a trigger endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

impl TriggerResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "success".to_string(),
        }
    }
}

/// Represents the current control status of the robot.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub control_state: ControlState,
    pub move_running: bool,
    pub api_version: &'static str,
}
