//! Push fan-out hub
//!
//! A single broadcast channel feeds every WebSocket subscriber. Two
//! producers publish into it (the exec-report consumer and the market-data
//! consumer); ordering between the two streams is not guaranteed per
//! subscriber. Each subscriber task performs its own serialized socket
//! writes and drops itself on write failure, so one slow or dead client
//! never stalls the rest.

use tokio::sync::broadcast;
use tracing::debug;

const HUB_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct Hub {
    tx: broadcast::Sender<String>,
}

impl Hub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    /// Broadcast one frame to all current subscribers.
    ///
    /// Frames published while nobody is connected are discarded.
    pub fn publish(&self, payload: &[u8]) {
        let frame = String::from_utf8_lossy(payload).into_owned();
        match self.tx.send(frame) {
            Ok(receivers) => debug!(receivers, "frame broadcast"),
            Err(_) => debug!("no subscribers, frame dropped"),
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let hub = Hub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(br#"{"status":"LIVE"}"#);

        assert_eq!(a.recv().await.unwrap(), r#"{"status":"LIVE"}"#);
        assert_eq!(b.recv().await.unwrap(), r#"{"status":"LIVE"}"#);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let hub = Hub::new();
        hub.publish(b"ignored");
        assert_eq!(hub.subscriber_count(), 0);

        // A later subscriber only sees frames published after it joined.
        let mut rx = hub.subscribe();
        hub.publish(b"seen");
        assert_eq!(rx.recv().await.unwrap(), "seen");
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_drops() {
        let hub = Hub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
