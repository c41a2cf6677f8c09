use agent_server::{AppState, ServerConfig, build_router};
use agent_stock::StockTeamFactory;
use agent_team::TeamFactory;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    agent_utils::load_env();
    agent_utils::init_tracing();

    let config = ServerConfig::from_env();

    // The server still starts without a team; tasks then fail on start
    let factory: Option<Arc<dyn TeamFactory>> = match StockTeamFactory::from_env() {
        Ok(factory) => Some(Arc::new(factory)),
        Err(e) => {
            warn!(error = %e, "Agent team unavailable");
            None
        }
    };

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let state = AppState::new(factory, config.output_dir.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(address = %config.listen_addr, "agent-server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            error!(error = %err, "Server shut down with error");
            err
        })?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            stream.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received");
}
