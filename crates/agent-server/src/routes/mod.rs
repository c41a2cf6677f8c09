mod health;
mod tasks;

use axum::Router;
use health::health_router;
use tasks::task_router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::events::FILES_ROUTE;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let files = ServeDir::new(state.output_dir());
    Router::new()
        .nest("/api", task_router().merge(health_router()))
        .nest_service(FILES_ROUTE, files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
