use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};

use scholaris::logging::init_tracing;
use scholaris::metrics::{init_metrics, metrics_app};
use scholaris::router::init_router;
use scholaris::scholaris_config::ServerConfig;
use scholaris::scholaris_db::run_migrations;
use scholaris::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server_config = ServerConfig::from_env();
    let _log_guards = init_tracing(&server_config);

    let state = init_app_state().await;
    if state.jwt_config.uses_default_secret() {
        warn!("JWT_SECRET is not set; using the development default");
    }

    run_migrations(&state.db)
        .await
        .context("Failed to apply migrations")?;

    let mut app = init_router(state);
    if let Some(handle) = init_metrics(server_config.observability_enabled) {
        app = app.merge(metrics_app(handle));
    }

    let listener = tokio::net::TcpListener::bind(&server_config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.addr))?;

    info!(addr = %server_config.addr, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
