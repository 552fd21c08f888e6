//! WebSocket push channel
//!
//! Subscribers receive execution reports and market-data updates as JSON
//! text frames, interleaved in server arrival order. Client frames other
//! than close are ignored. A failed write drops the subscriber.

use crate::hub::Hub;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub.clone()))
}

async fn handle_socket(socket: WebSocket, hub: Hub) {
    info!(subscribers = hub.subscriber_count() + 1, "websocket client connected");
    let mut frames = hub.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        debug!("websocket write failed, dropping subscriber");
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "slow websocket subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // Client frames are ignored.
                Some(Err(err)) => {
                    debug!(error = %err, "websocket read failed");
                    break;
                }
            },
        }
    }

    info!("websocket client disconnected");
}
