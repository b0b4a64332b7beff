use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rfpeval_db::DbPool;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rfpeval_api::config::ServerConfig;
use rfpeval_api::router::build_app_router;
use rfpeval_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        max_compare_versions = config.max_compare_versions,
        "Loaded server configuration"
    );

    let pool = connect_database().await;
    let app = build_app_router(AppState::new(pool.clone(), config.clone()), &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    // Serve until a termination signal, then give in-flight requests up to
    // SHUTDOWN_TIMEOUT_SECS to finish.
    let drain = Arc::new(Notify::new());
    let drain_started = Arc::clone(&drain);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { drain_started.notified().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            report_server_exit(result);
            pool.close().await;
            return;
        }
        signal = shutdown_signal() => {
            tracing::info!(signal, "Shutdown requested, draining connections");
            drain.notify_one();
        }
    }

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(shutdown_timeout, &mut server).await {
        Ok(result) => report_server_exit(result),
        Err(_) => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Timed out draining connections, forcing shutdown"
            );
            server.abort();
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
}

/// Connect, ping, and migrate. Any failure aborts startup.
async fn connect_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rfpeval_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    rfpeval_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    rfpeval_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready, migrations applied");
    pool
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rfpeval_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
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
}

fn report_server_exit(result: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => tracing::info!("Server stopped accepting connections"),
        Ok(Err(err)) => tracing::error!(error = %err, "Server error"),
        Err(err) => tracing::error!(error = %err, "Server task failed"),
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix, naming the signal received.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}
