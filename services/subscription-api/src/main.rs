//! Cadence Subscription API
//!
//! Serves the subscription REST endpoints and, unless disabled, runs the
//! daily renew-or-expire sweep in the same process.

use std::future::pending;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::Router;
use cadence_db::{Repositories, SubscriptionRepository};
use cadence_lifecycle::{LifecycleScheduler, SubscriptionService};
use cadence_types::{Clock, SystemClock};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use subscription_api::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("subscription_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cadence Subscription API");

    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        sweep_enabled = config.sweep_enabled,
        sweep_run_at = %config.scheduler.run_at,
        "Configuration loaded"
    );

    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    let pool = cadence_db::create_pool_with_options(&config.database_url, &config.pool).await?;
    tracing::info!("Database pool created");

    if config.run_migrations {
        cadence_db::run_migrations(&pool).await?;
    }

    let repos = Repositories::new(pool.clone());
    let repo: Arc<dyn SubscriptionRepository> = Arc::new(repos.subscriptions);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let service = SubscriptionService::new(repo.clone(), clock.clone());
    let scheduler = LifecycleScheduler::new(repo, clock, config.scheduler.clone());

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let sweep_enabled = config.sweep_enabled;

    let state = AppState::new(service, pool, config);
    let app = build_router(state, metrics_handle);

    tokio::select! {
        result = run_http_server(app, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = ?e, "HTTP server error");
            }
        }
        () = async {
            if sweep_enabled {
                scheduler.run_daily().await;
            } else {
                tracing::info!("Lifecycle sweep disabled");
                pending::<()>().await;
            }
        } => {}
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let service: IntoMakeServiceWithConnectInfo<Router, SocketAddr> =
        app.into_make_service_with_connect_info();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Lifecycle operations are a lookup plus one or two writes
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("subscription_operation_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_histogram!(
        "subscription_operation_duration_seconds",
        "Subscription operation latency in seconds by operation and result"
    );
    metrics::describe_counter!(
        "subscription_sweep_items_total",
        "Subscriptions reconciled by the daily sweep, by outcome"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to listen for Ctrl+C");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
