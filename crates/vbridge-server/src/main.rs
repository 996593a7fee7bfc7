use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use vbridge_api::{BridgeApiAdapter, HttpApi};
use vbridge_core::{
    Bridge, ChannelQueue, InMemoryStreamRegistry, MetricsHandle, StreamRegistry, metrics,
    spawn_housekeeping,
};
use vbridge_observe::logger_init;
use vbridge_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
use vbridge_registry::HttpStreamRegistry;

mod config;
use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Config + logger
    let cfg = ServerConfig::from_env()?;
    logger_init(&cfg.logger)?;
    info!(port = cfg.port, model = %cfg.model, "configuration loaded");

    // 2) Metrics
    let prometheus = if cfg.metrics {
        Some(Arc::new(PrometheusMetrics::new()?))
    } else {
        None
    };
    let metrics_handle: MetricsHandle = match &prometheus {
        Some(m) => m.clone() as MetricsHandle,
        None => metrics::noop(),
    };

    // 3) Stream registry
    let registry: Arc<dyn StreamRegistry> = match cfg.registry_config() {
        Some(registry_cfg) => {
            info!(endpoint = %registry_cfg.endpoint, "using stream service");
            Arc::new(HttpStreamRegistry::new(&registry_cfg)?)
        }
        None => {
            warn!("no registry_endpoint configured, keeping streams in memory");
            Arc::new(InMemoryStreamRegistry::new())
        }
    };

    // 4) Queue + bridge
    let (queue, commands) = ChannelQueue::channel(cfg.queue_capacity);
    let bridge = Arc::new(Bridge::with_metrics(
        cfg.bridge_config(),
        Arc::new(queue),
        registry,
        metrics_handle,
    ));

    // 5) Housekeeping
    let cancel = CancellationToken::new();
    let housekeeping = spawn_housekeeping(
        bridge.tracker().clone(),
        cfg.sweep_interval(),
        cfg.cleanup_horizon(),
        cancel.clone(),
    );

    // 6) HTTP
    let adapter = Arc::new(BridgeApiAdapter::new(bridge, Arc::new(commands)));
    let mut app = HttpApi::new(adapter).router();
    if let Some(prometheus) = prometheus {
        app = app.merge(metrics_router(prometheus));
    }

    let listener = TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    info!(addr = %listener.local_addr()?, "bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    if let Err(e) = housekeeping.await {
        error!(error = %e, "housekeeping task failed");
    }
    info!("bridge stopped");
    Ok(())
}

fn metrics_router(metrics: Arc<PrometheusMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_text))
        .with_state(metrics)
}

/// GET /metrics
async fn metrics_text(State(metrics): State<Arc<PrometheusMetrics>>) -> Response {
    match metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutting down...");
            cancel.cancel();
        }
        _ = cancel.cancelled() => {}
    }
}
