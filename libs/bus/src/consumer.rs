//! Group consumer with commit-after-success semantics

use crate::{BusError, BusMessage};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as _, StreamConsumer};
use rdkafka::Message as _;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// At-least-once group consumer for a single topic.
///
/// Delivery contract: the handler runs once per fetched message; the offset
/// is committed only when it returns `Ok`. On `Err` the consumer logs and
/// moves on without committing, so the message is re-delivered after a
/// restart or rebalance. When no committed offset exists for the group the
/// consumer starts from the tail (only new messages).
pub struct Consumer {
    inner: StreamConsumer,
    topic: String,
}

impl Consumer {
    /// Create a consumer subscribed to `topic` in group `group_id`.
    pub fn new(brokers: &[String], topic: &str, group_id: &str) -> Result<Self, BusError> {
        let inner: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            // Low-latency fetches: return as soon as one message is ready.
            .set("fetch.min.bytes", "1")
            .set("fetch.wait.max.ms", "100")
            .create()?;
        inner.subscribe(&[topic])?;

        Ok(Self {
            inner,
            topic: topic.to_string(),
        })
    }

    /// Topic this consumer is subscribed to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Fetch-handle-commit loop; returns when `cancel` fires or the broker
    /// connection fails fatally.
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, mut handler: F) -> Result<(), BusError>
    where
        F: FnMut(BusMessage) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        loop {
            let borrowed = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(topic = %self.topic, "consumer cancelled");
                    return Ok(());
                }
                fetched = self.inner.recv() => fetched?,
            };

            let msg = BusMessage {
                topic: borrowed.topic().to_string(),
                partition: borrowed.partition(),
                offset: borrowed.offset(),
                key: borrowed
                    .key()
                    .map(|k| String::from_utf8_lossy(k).into_owned()),
                payload: borrowed.payload().unwrap_or_default().to_vec(),
            };

            match handler(msg).await {
                Ok(()) => {
                    if let Err(err) = self.inner.commit_message(&borrowed, CommitMode::Async) {
                        warn!(topic = %self.topic, error = %err, "failed to commit offset");
                    }
                }
                Err(err) => {
                    // No commit: the message will be re-delivered.
                    warn!(
                        topic = %self.topic,
                        partition = borrowed.partition(),
                        offset = borrowed.offset(),
                        error = %err,
                        "handler failed, leaving offset uncommitted"
                    );
                }
            }
        }
    }
}
