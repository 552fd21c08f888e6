//! Message-bus client for the Atlas trading platform
//!
//! Thin wrappers over rdkafka giving every service the same two
//! abstractions the pipeline is built on:
//!
//! - [`Consumer`]: a group consumer with at-least-once delivery. The offset
//!   is committed only after the handler succeeds, so a crashed or failing
//!   handler causes re-delivery; downstream idempotency absorbs the
//!   duplicates.
//! - [`Producer`]: a keyed producer tuned for latency over throughput.
//!   Partitioning by key keeps everything for one `order_id` (or one
//!   symbol) totally ordered.
//!
//! Handlers receive an owned [`BusMessage`] so nothing downstream depends
//! on rdkafka types; the audit exporter needs the partition and offset for
//! its replay-safe object keys.

mod consumer;
mod producer;

pub use consumer::Consumer;
pub use producer::Producer;

use thiserror::Error;

/// Topic names shared by every service.
pub mod topics {
    /// Admitted order commands, keyed by `order_id`.
    pub const ORDERS_COMMANDS: &str = "orders.commands";
    /// Canonical order events, keyed by `order_id`.
    pub const ORDERS_EVENTS: &str = "orders.events";
    /// Execution reports, keyed by `order_id`.
    pub const EXEC_REPORTS: &str = "exec.reports";
    /// Market-data frames, keyed by symbol.
    pub const MARKET_DATA: &str = "market.data";
}

/// Bus client failure.
#[derive(Error, Debug)]
pub enum BusError {
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// An owned view of one consumed message.
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    /// Payload as UTF-8, replacing invalid sequences.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
