//! Bus consumers feeding settlement and the push hub
//!
//! Two long-lived consumer tasks: execution reports (settled against the
//! account store, then forwarded to subscribers) and market data
//! (forwarded only). Transient store failures propagate out of the handler
//! so the offset stays uncommitted and the report is re-delivered; the
//! `exec_id` idempotency gate keeps the eventual re-settlement single.

use crate::accounts::DEFAULT_ACCOUNT;
use crate::settlement::settlement_delta;
use crate::state::AppState;
use atlas_bus::{topics, BusMessage, Consumer};
use atlas_types::report::ExecutionReport;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const EXEC_GROUP: &str = "order-gateway-group-v6";
const MARKET_DATA_GROUP: &str = "order-gateway-md-group";

/// Consume `exec.reports`: settle balances and fan out to subscribers.
pub async fn run_exec_consumer(state: AppState, cancel: CancellationToken) {
    let consumer = match Consumer::new(&state.cfg.kafka_brokers, topics::EXEC_REPORTS, EXEC_GROUP) {
        Ok(consumer) => consumer,
        Err(err) => {
            error!(error = %err, "failed to create exec-report consumer");
            cancel.cancel();
            return;
        }
    };
    info!("started consumer for exec.reports");

    let result = consumer
        .run(cancel.clone(), |msg| {
            let state = state.clone();
            async move { handle_exec_report(&state, msg).await }
        })
        .await;

    if let Err(err) = result {
        error!(error = %err, "exec-report consumer failed");
        cancel.cancel();
    }
}

async fn handle_exec_report(state: &AppState, msg: BusMessage) -> anyhow::Result<()> {
    match serde_json::from_slice::<ExecutionReport>(&msg.payload) {
        Ok(report) => settle(state, &report).await?,
        // Undecodable reports are committed, not retried: re-delivery
        // cannot fix a poison message.
        Err(err) => warn!(error = %err, "undecodable exec report, skipping settlement"),
    }

    // Every report reaches subscribers, settled or not.
    state.hub.publish(&msg.payload);
    Ok(())
}

async fn settle(state: &AppState, report: &ExecutionReport) -> anyhow::Result<()> {
    let Some(delta) = settlement_delta(report) else {
        return Ok(());
    };

    // At most one balance mutation per exec_id, across any re-delivery.
    let fresh = state.accounts.mark_processed(&report.exec_id).await?;
    if !fresh {
        debug!(exec_id = %report.exec_id, "duplicate exec report, settlement skipped");
        return Ok(());
    }

    let account_id = if report.client_id.is_empty() {
        DEFAULT_ACCOUNT
    } else {
        report.client_id.as_str()
    };
    state.accounts.apply_delta(account_id, &delta).await?;
    info!(
        account_id,
        order_id = %report.order_id,
        status = %report.status,
        "balances settled"
    );
    Ok(())
}

/// Consume `market.data` and forward every frame to the push hub.
pub async fn run_market_data_consumer(state: AppState, cancel: CancellationToken) {
    let consumer = match Consumer::new(
        &state.cfg.kafka_brokers,
        topics::MARKET_DATA,
        MARKET_DATA_GROUP,
    ) {
        Ok(consumer) => consumer,
        Err(err) => {
            error!(error = %err, "failed to create market-data consumer");
            cancel.cancel();
            return;
        }
    };
    info!("started consumer for market.data");

    let result = consumer
        .run(cancel.clone(), |msg| {
            let hub = state.hub.clone();
            async move {
                hub.publish(&msg.payload);
                Ok(())
            }
        })
        .await;

    if let Err(err) = result {
        error!(error = %err, "market-data consumer failed");
        cancel.cancel();
    }
}
