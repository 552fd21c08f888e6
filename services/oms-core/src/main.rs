//! Atlas OMS Core
//!
//! Owns the per-order state machine and the orders table. Two consumers:
//! `orders.commands` translates admitted commands into canonical order
//! events (plus a mirror execution report for UI latency), and
//! `exec.reports` reconciles venue reports back into the durable order
//! state. Every status decision goes through the shared pure FSM.

mod commands;
mod debug;
mod orders;
mod reconcile;

use atlas_bus::{topics, Consumer, Producer};
use atlas_store::{AwsConfig, StoreClient};
use orders::OrderRepository;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const COMMAND_GROUP: &str = "oms-core-group-v6";
const EXEC_GROUP: &str = "oms-core-exec-group-v6";

/// Shared handles for both consumer paths.
#[derive(Clone)]
pub struct OmsContext {
    pub orders: OrderRepository,
    /// Producer for `orders.events`.
    pub events: Arc<Producer>,
    /// Producer for `exec.reports`.
    pub execs: Arc<Producer>,
    pub cfg: Arc<AwsConfig>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let cfg = Arc::new(AwsConfig::load("oms-core"));
    let store = StoreClient::connect(&cfg).await;

    let ctx = OmsContext {
        orders: OrderRepository::new(store, &cfg),
        events: Arc::new(Producer::new(&cfg.kafka_brokers, topics::ORDERS_EVENTS)?),
        execs: Arc::new(Producer::new(&cfg.kafka_brokers, topics::EXEC_REPORTS)?),
        cfg: cfg.clone(),
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            cancel.cancel();
        }
    });

    let debug_task = tokio::spawn(debug::run_debug_server(ctx.clone(), cancel.clone()));

    // Reconciliation must be consuming before the blocking command loop
    // starts, or fills raced against startup would sit unprocessed.
    let exec_task = tokio::spawn({
        let ctx = ctx.clone();
        let cancel = cancel.clone();
        async move {
            info!("starting exec-reports consumer");
            let consumer =
                match Consumer::new(&ctx.cfg.kafka_brokers, topics::EXEC_REPORTS, EXEC_GROUP) {
                    Ok(consumer) => consumer,
                    Err(err) => {
                        error!(error = %err, "failed to create exec-report consumer");
                        cancel.cancel();
                        return;
                    }
                };
            let result = consumer
                .run(cancel.clone(), |msg| {
                    let ctx = ctx.clone();
                    async move { reconcile::handle_report(&ctx, msg).await }
                })
                .await;
            if let Err(err) = result {
                error!(error = %err, "exec-report consumer failed");
                cancel.cancel();
            }
        }
    });

    info!("starting orders-commands consumer");
    let consumer = Consumer::new(&cfg.kafka_brokers, topics::ORDERS_COMMANDS, COMMAND_GROUP)?;
    let result = consumer
        .run(cancel.clone(), |msg| {
            let ctx = ctx.clone();
            async move { commands::handle_command(&ctx, msg).await }
        })
        .await;
    if let Err(err) = result {
        error!(error = %err, "command consumer failed");
    }

    cancel.cancel();
    let _ = exec_task.await;
    let _ = debug_task.await;
    ctx.events.close();
    ctx.execs.close();

    info!("oms core stopped");
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
