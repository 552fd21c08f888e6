//! Stream-to-object-store archiver
//!
//! Object keys are a pure function of the message's routing metadata.
//! Because `(partition, offset)` pins a message's identity inside its
//! topic, a re-delivered message lands on the same key with the same
//! bytes: the archive is idempotent under any number of retries.

use atlas_bus::BusMessage;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{NaiveDate, Utc};
use tracing::info;

/// Deterministic object key for an audited message.
pub fn archive_key(topic: &str, partition: i32, offset: i64, date: NaiveDate) -> String {
    format!("events/dt={date}/topic={topic}/p={partition}/offset={offset}.jsonl")
}

pub struct Archiver {
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl Archiver {
    pub fn new(s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { s3, bucket }
    }

    /// Upload one message body as a single JSON line.
    ///
    /// Errors propagate so the consumer leaves the offset uncommitted and
    /// the message is re-delivered.
    pub async fn archive(&self, msg: &BusMessage) -> anyhow::Result<()> {
        let key = archive_key(
            &msg.topic,
            msg.partition,
            msg.offset,
            Utc::now().date_naive(),
        );
        info!(bucket = %self.bucket, %key, "archiving event");

        let mut body = msg.payload.clone();
        body.push(b'\n');

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| anyhow::anyhow!("failed to upload {key}: {}", DisplayErrorContext(err)))?;

        Ok(())
    }
}
