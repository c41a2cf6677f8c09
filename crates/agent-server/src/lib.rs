//! HTTP and SSE front end for the stock analysis team
//!
//! Clients submit a task with `POST /api/tasks`, then attach to
//! `GET /api/tasks/{id}/stream`. The first attachment starts the run; every
//! attachment replays what was recorded before following the live run.

pub mod config;
pub mod error;
pub mod events;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::build_router;
pub use state::{AppState, TaskService};
pub use store::{TaskSnapshot, TaskStatus, TaskStore};
