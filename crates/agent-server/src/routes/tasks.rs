use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::sse::{KeepAlive, Sse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::AppError;
use crate::state::{AppState, SseStream};
use crate::store::{TaskResults, TaskSnapshot, TaskStatus};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub task: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

pub fn task_router() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task).get(list_tasks))
        .route("/tasks/:id", get(get_task))
        .route("/tasks/:id/results", get(get_results))
        .route("/tasks/:id/stream", get(stream_task))
}

#[instrument(skip_all)]
async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<CreateTaskResponse>, AppError> {
    let task = match payload {
        Ok(Json(CreateTaskRequest { task: Some(task) })) if !task.trim().is_empty() => task,
        Ok(_) => return Err(AppError::bad_request("task is required")),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected task body");
            return Err(AppError::bad_request("task is required"));
        }
    };

    let task_id = state.task_service().submit(&task);
    Ok(Json(CreateTaskResponse { task_id }))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskSnapshot>> {
    Json(state.task_service().list())
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskSnapshot>, AppError> {
    state
        .task_service()
        .status(&id)
        .map(Json)
        .ok_or_else(AppError::task_not_found)
}

async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResults>, AppError> {
    let snapshot = state
        .task_service()
        .status(&id)
        .ok_or_else(AppError::task_not_found)?;

    match (snapshot.status, snapshot.results) {
        (TaskStatus::Completed, Some(results)) => Ok(Json(results)),
        _ => Err(AppError::bad_request("task not completed")),
    }
}

async fn stream_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<SseStream>, AppError> {
    match state.task_service().event_stream(&id) {
        Some(stream) => Ok(Sse::new(stream).keep_alive(KeepAlive::new())),
        None => Err(AppError::task_not_found()),
    }
}
