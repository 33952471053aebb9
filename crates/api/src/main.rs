use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spiral_api::background::campaign_launcher;
use spiral_api::config::ServerConfig;
use spiral_api::notifications::NotificationRouter;
use spiral_api::router::build_app_router;
use spiral_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "spiral_api=debug,spiral_db=info,tower_http=debug,audit=info".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set, admin endpoints are open to every caller");
    }

    // --- Store ---
    let pool = spiral_db::create_store();
    spiral_db::health_check(&pool)
        .await
        .context("Store health check failed")?;
    if config.seed_demo_data {
        spiral_db::seed::seed_demo_data(&pool).await;
    }

    // --- Event bus ---
    let event_bus = Arc::new(spiral_events::EventBus::default());
    tracing::info!("Event bus created");

    // Spawn audit persistence (writes every event to the audit log).
    let persistence_handle = tokio::spawn(spiral_events::AuditPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // Spawn notification router (campaign launch emails and pushes).
    let services_cancel = CancellationToken::new();
    let notification_router = NotificationRouter::new(Arc::clone(&event_bus));
    let router_handle = tokio::spawn(
        notification_router.run(event_bus.subscribe(), services_cancel.clone()),
    );

    // Spawn campaign launcher.
    let launcher_handle = tokio::spawn(campaign_launcher::run(
        pool.clone(),
        Arc::clone(&event_bus),
        Duration::from_secs(config.campaign_tick_secs),
        services_cancel.clone(),
    ));

    tracing::info!("Event services started (audit persistence, notification router, campaign launcher)");

    // --- App ---
    let state = AppState::new(pool, config.clone(), Arc::clone(&event_bus));
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    // The launcher and notification router hold bus handles; stop them first.
    services_cancel.cancel();
    let _ = tokio::time::timeout(drain, launcher_handle).await;
    let _ = tokio::time::timeout(drain, router_handle).await;
    tracing::info!("Campaign launcher and notification router stopped");

    // Drop the last sender to close the channel so persistence drains and exits.
    drop(event_bus);
    let _ = tokio::time::timeout(drain, persistence_handle).await;
    tracing::info!("Audit persistence shut down");

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM (on Unix) to initiate graceful shutdown.
///
/// If a handler cannot be installed the error is logged and that signal is
/// ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
