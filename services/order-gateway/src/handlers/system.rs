//! Health and store-connectivity probes

use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `GET /debug/ddb`: store connectivity status and resolved configuration.
pub async fn debug_ddb(State(state): State<AppState>) -> Json<Value> {
    let ddb_status = match state.accounts.probe().await {
        Ok(()) => "OK".to_string(),
        Err(err) => format!("FAIL: {err}"),
    };

    Json(json!({
        "service": "order-gateway",
        "region": state.cfg.region,
        "balances_table": state.cfg.balances_table,
        "endpoint_override": state.cfg.store_endpoint(),
        "use_ddb_local": state.cfg.use_local_ddb,
        "ddb_status": ddb_status,
    }))
}
