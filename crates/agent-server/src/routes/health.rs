use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    agent_team_initialized: bool,
    active_tasks: usize,
    version: &'static str,
}

pub fn health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = state.task_service();
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        agent_team_initialized: service.team_initialized(),
        active_tasks: service.task_count(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
