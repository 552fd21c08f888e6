//! Atlas Venue Simulator
//!
//! Publishes a synthetic market-data stream and matches accepted orders
//! against the synthetic top of book, emitting execution reports.

mod market;
mod matcher;

use atlas_bus::{topics, Consumer, Producer};
use atlas_store::AwsConfig;
use market::MarketState;
use matcher::Matcher;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const MATCHER_GROUP: &str = "venue-sim-group-v6";
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let cfg = AwsConfig::load("venue-sim");
    let market = Arc::new(MarketState::with_default_symbols());

    let execs = Arc::new(Producer::new(&cfg.kafka_brokers, topics::EXEC_REPORTS)?);
    let market_data = Arc::new(Producer::new(&cfg.kafka_brokers, topics::MARKET_DATA)?);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            cancel.cancel();
        }
    });

    let ticker_task = tokio::spawn(run_market_data_loop(
        market.clone(),
        market_data.clone(),
        cancel.clone(),
    ));

    info!("venue simulator started");
    let matcher = Matcher::new(market, execs.clone());
    let consumer = Consumer::new(&cfg.kafka_brokers, topics::ORDERS_EVENTS, MATCHER_GROUP)?;
    let result = consumer
        .run(cancel.clone(), |msg| matcher.handle_event(msg))
        .await;
    if let Err(err) = result {
        error!(error = %err, "matcher consumer failed");
    }

    cancel.cancel();
    let _ = ticker_task.await;
    execs.close();
    market_data.close();

    info!("venue simulator stopped");
    Ok(())
}

/// Once per second, walk every symbol and publish its frames.
async fn run_market_data_loop(
    market: Arc<MarketState>,
    producer: Arc<Producer>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interval.tick() => {}
        }

        // The rng handle must not live across the publish awaits.
        let frames = {
            let mut rng = rand::thread_rng();
            market::tick(&market, &mut rng)
        };

        for frame in frames {
            let payload = match serde_json::to_vec(&frame) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(error = %err, "failed to encode market-data frame");
                    continue;
                }
            };
            // Keyed by symbol so per-symbol ordering holds.
            if let Err(err) = producer.send(&frame.symbol, &payload).await {
                warn!(symbol = %frame.symbol, error = %err, "failed to publish market data");
            }
        }
    }
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
