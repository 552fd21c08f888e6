//! Atlas Audit Exporter
//!
//! One consumer per audited topic, each forwarding every message body to
//! the object store under a replay-idempotent key. Upload failures leave
//! the offset uncommitted, so nothing is ever silently missing from the
//! archive.

mod archiver;

use archiver::Archiver;
use atlas_bus::{topics, Consumer};
use atlas_store::AwsConfig;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const AUDIT_GROUP: &str = "audit-exporter-group-v2";
const AUDITED_TOPICS: [&str; 2] = [topics::ORDERS_EVENTS, topics::EXEC_REPORTS];

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let cfg = AwsConfig::load("audit-exporter");

    let aws = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(cfg.region.clone()))
        .load()
        .await;
    let archiver = Arc::new(Archiver::new(
        aws_sdk_s3::Client::new(&aws),
        cfg.audit_bucket.clone(),
    ));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            cancel.cancel();
        }
    });

    info!(topics = ?AUDITED_TOPICS, "audit exporter started");

    let mut tasks = Vec::new();
    for topic in AUDITED_TOPICS {
        tasks.push(tokio::spawn(consume_and_archive(
            cfg.kafka_brokers.clone(),
            topic,
            archiver.clone(),
            cancel.clone(),
        )));
    }

    cancel.cancelled().await;
    for task in tasks {
        let _ = task.await;
    }

    info!("audit exporter stopped");
    Ok(())
}

async fn consume_and_archive(
    brokers: Vec<String>,
    topic: &'static str,
    archiver: Arc<Archiver>,
    cancel: CancellationToken,
) {
    let consumer = match Consumer::new(&brokers, topic, AUDIT_GROUP) {
        Ok(consumer) => consumer,
        Err(err) => {
            error!(topic, error = %err, "failed to create audit consumer");
            cancel.cancel();
            return;
        }
    };
    info!(topic, "audit consumer started");

    let result = consumer
        .run(cancel.clone(), |msg| {
            let archiver = archiver.clone();
            async move { archiver.archive(&msg).await }
        })
        .await;

    if let Err(err) = result {
        error!(topic, error = %err, "audit consumer failed");
        cancel.cancel();
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
