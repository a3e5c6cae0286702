//! The web module for the HTTP control service.
//! Exposes the pause/resume/stop triggers to processes that cannot call the
//! robot directly.

pub mod api;
pub mod models;
