//! Defines the Axum API routes and handlers.

use crate::robot::{Robot, API_VERSION};
use crate::web::models::{StatusResponse, TriggerResponse};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub type AppState = Arc<Robot>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(robot: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/pause_movement", post(pause_movement))
        .route("/api/v1/resume_movement", post(resume_movement))
        .route("/api/v1/stop_movement", post(stop_movement))
        .with_state(robot)
}

/// Handler to get the control state and whether a move is running.
async fn get_status(State(robot): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        control_state: robot.control_state(),
        move_running: robot.is_moving(),
        api_version: API_VERSION,
    })
}

async fn pause_movement(State(robot): State<AppState>) -> Json<TriggerResponse> {
    robot.pause();
    Json(TriggerResponse::ok())
}

async fn resume_movement(State(robot): State<AppState>) -> Json<TriggerResponse> {
    robot.resume();
    Json(TriggerResponse::ok())
}

async fn stop_movement(State(robot): State<AppState>) -> Json<TriggerResponse> {
    robot.stop();
    Json(TriggerResponse::ok())
}
