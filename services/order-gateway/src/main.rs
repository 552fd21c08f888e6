//! Atlas Order Gateway
//!
//! The synchronous edge of the platform: admits order commands with
//! idempotency and pre-trade balance reservation, settles execution reports
//! back into the account store, and fans execution reports and market data
//! out to WebSocket subscribers.

mod accounts;
mod consumers;
mod error;
mod handlers;
mod hub;
mod router;
mod settlement;
mod state;

use accounts::AccountStore;
use atlas_bus::{topics, Producer};
use atlas_store::{AwsConfig, StoreClient};
use hub::Hub;
use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let cfg = Arc::new(AwsConfig::load("order-gateway"));

    let store = StoreClient::connect(&cfg).await;
    let accounts = AccountStore::new(store, &cfg);
    let commands = Arc::new(Producer::new(&cfg.kafka_brokers, topics::ORDERS_COMMANDS)?);
    let hub = Hub::new();

    let state = AppState {
        accounts,
        commands: commands.clone(),
        hub,
        cfg: cfg.clone(),
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received");
            cancel.cancel();
        }
    });

    let exec_task = tokio::spawn(consumers::run_exec_consumer(state.clone(), cancel.clone()));
    let md_task = tokio::spawn(consumers::run_market_data_consumer(
        state.clone(),
        cancel.clone(),
    ));

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], 8001));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "order gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let cancel = cancel.clone();
            async move { cancel.cancelled().await }
        })
        .await?;

    cancel.cancel();
    let _ = exec_task.await;
    let _ = md_task.await;
    commands.close();

    tracing::info!("order gateway stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
