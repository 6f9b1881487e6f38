use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use meal_forecast as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load application config")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    cfg.ensure_directories()
        .context("failed to create data/artifact directories")?;

    info!(
        version = %cfg.app_version,
        git_hash = env!("GIT_HASH"),
        build_time = env!("BUILD_TIME"),
        environment = %cfg.environment,
        data_dir = %cfg.data_dir.display(),
        artifacts_dir = %cfg.artifacts_dir.display(),
        direct_upload = cfg.enable_direct_upload,
        "starting meal-forecast"
    );

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.host, cfg.port))?;

    let app = api::app_router(api::AppState::from_config(cfg));

    info!("meal-forecast listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
