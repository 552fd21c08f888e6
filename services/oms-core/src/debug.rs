//! Debug HTTP server
//!
//! `GET /health` and `GET /debug/ddb` on :8002, for operators checking
//! store connectivity without touching the pipeline.

use crate::OmsContext;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn debug_ddb(State(ctx): State<OmsContext>) -> Json<Value> {
    let ddb_status = match ctx.orders.probe().await {
        Ok(()) => "OK".to_string(),
        Err(err) => format!("FAIL: {err}"),
    };

    Json(json!({
        "service": "oms-core",
        "region": ctx.cfg.region,
        "orders_table": ctx.cfg.orders_table,
        "endpoint_override": ctx.cfg.store_endpoint(),
        "use_ddb_local": ctx.cfg.use_local_ddb,
        "ddb_status": ddb_status,
    }))
}

pub async fn run_debug_server(ctx: OmsContext, cancel: CancellationToken) {
    let app = Router::new()
        .route("/health", get(health))
        .route("/debug/ddb", get(debug_ddb))
        .with_state(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8002));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "debug server failed to bind");
            return;
        }
    };
    info!(%addr, "debug server listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await;
    if let Err(err) = result {
        error!(error = %err, "debug server failed");
    }
}
