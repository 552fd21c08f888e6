use crate::handlers::{balances, orders, system, ws};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(orders::submit_order))
        .route("/balances", get(balances::get_balances))
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(system::health))
        .route("/debug/ddb", get(system::debug_ddb))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
