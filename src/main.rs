use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

use saboteur::{agent::Agent, api::AppState, config::Config, create_router, logging, shell::SystemShell};

// One request at a time: a single-threaded runtime plus the request lock in AppState.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration before logging so the log directory is known
    let config = Config::load()?;

    logging::init(&config.log_dir);
    tracing::info!("Starting saboteur agent");

    let agent = Agent::from_config(Arc::new(SystemShell), &config);
    let mut state = AppState::new(agent);

    if config.metrics_enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => tracing::warn!("Metrics disabled: {}", e),
        }
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
