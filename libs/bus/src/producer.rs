//! Keyed producer tuned for latency

use crate::BusError;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::warn;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Keyed producer for a single topic.
///
/// Batching favours latency over throughput (tiny batches, short linger),
/// matching the interactive character of the order pipeline.
pub struct Producer {
    inner: FutureProducer,
    topic: String,
}

impl Producer {
    /// Create a producer for `topic`.
    pub fn new(brokers: &[String], topic: &str) -> Result<Self, BusError> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("linger.ms", "10")
            .set("batch.num.messages", "1")
            .set("message.timeout.ms", "10000")
            .create()?;

        Ok(Self {
            inner,
            topic: topic.to_string(),
        })
    }

    /// Topic this producer writes to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish one keyed message and wait for broker acknowledgement.
    ///
    /// The bus partitions by key, so every message sharing a key is totally
    /// ordered for consumers.
    pub async fn send(&self, key: &str, payload: &[u8]) -> Result<(), BusError> {
        let record = FutureRecord::to(&self.topic).key(key).payload(payload);
        self.inner
            .send(record, Timeout::After(SEND_TIMEOUT))
            .await
            .map_err(|(err, _)| BusError::Kafka(err))?;
        Ok(())
    }

    /// Flush pending writes; call during scoped teardown.
    pub fn close(&self) {
        if let Err(err) = self.inner.flush(Timeout::After(FLUSH_TIMEOUT)) {
            warn!(topic = %self.topic, error = %err, "failed to flush producer");
        }
    }
}
