//! Order admission
//!
//! The pipeline for `POST /orders`: idempotency gate, enrichment, lazy
//! account creation, atomic balance reservation, then publish to
//! `orders.commands`. The idempotency row is written before the
//! reservation; a failed publish triggers a best-effort reservation undo.

use crate::accounts::DEFAULT_ACCOUNT;
use crate::error::GatewayError;
use crate::settlement::reservation_for;
use crate::state::AppState;
use atlas_store::StoreError;
use atlas_types::command::{CommandType, OrderCommand};
use atlas_types::ids::new_order_id;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct OrderAck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub command_id: String,
}

impl OrderAck {
    fn accepted(order_id: &str, command_id: &str) -> Self {
        Self {
            status: "accepted",
            order_id: Some(order_id.to_string()),
            command_id: command_id.to_string(),
        }
    }

    fn duplicate(command_id: &str) -> Self {
        Self {
            status: "duplicate",
            order_id: None,
            command_id: command_id.to_string(),
        }
    }
}

pub async fn submit_order(
    State(state): State<AppState>,
    Json(mut cmd): Json<OrderCommand>,
) -> Result<(StatusCode, Json<OrderAck>), GatewayError> {
    if cmd.command_id.is_empty() {
        return Err(GatewayError::BadRequest("command_id is required".into()));
    }
    if cmd.command_type == CommandType::New {
        if cmd.symbol.is_empty() || cmd.side.is_none() {
            return Err(GatewayError::BadRequest(
                "NEW command requires symbol and side".into(),
            ));
        }
        if cmd.quantity.is_zero() || cmd.price.is_zero() {
            return Err(GatewayError::BadRequest(
                "NEW command requires positive quantity and price".into(),
            ));
        }
    }

    // Idempotency gate: one publish per command_id, ever.
    let fresh = state.accounts.mark_processed(&cmd.command_id).await?;
    if !fresh {
        info!(command_id = %cmd.command_id, "duplicate command");
        return Ok((StatusCode::ACCEPTED, Json(OrderAck::duplicate(&cmd.command_id))));
    }

    // Enrich.
    if cmd.order_id.is_empty() {
        cmd.order_id = new_order_id();
    }
    if cmd.timestamp.is_none() {
        cmd.timestamp = Some(Utc::now());
    }

    let account_id = if cmd.client_id.is_empty() {
        DEFAULT_ACCOUNT.to_string()
    } else {
        cmd.client_id.clone()
    };

    state.accounts.get_or_create(&account_id).await.map_err(|err| {
        GatewayError::Internal(anyhow::Error::from(err).context("failed to prepare account"))
    })?;

    // Pre-trade check and persistent reservation; cancels reserve nothing.
    let reservation = cmd
        .side
        .filter(|_| cmd.command_type == CommandType::New)
        .map(|side| reservation_for(side, cmd.quantity, cmd.price));
    if let Some(reservation) = &reservation {
        match state.accounts.reserve(&account_id, reservation).await {
            Ok(()) => {}
            Err(StoreError::ConditionFailed) => {
                warn!(%account_id, order_id = %cmd.order_id, "reservation failed: insufficient funds");
                return Err(GatewayError::InsufficientFunds);
            }
            Err(err) => return Err(GatewayError::Internal(err.into())),
        }
    }

    let payload = serde_json::to_vec(&cmd)
        .map_err(|err| GatewayError::Internal(err.into()))?;
    if let Err(err) = state.commands.send(&cmd.order_id, &payload).await {
        warn!(order_id = %cmd.order_id, error = %err, "failed to publish command");
        if let Some(reservation) = &reservation {
            state.accounts.undo_reserve(&account_id, reservation).await;
        }
        return Err(GatewayError::Internal(
            anyhow::Error::from(err).context("failed to submit order"),
        ));
    }

    info!(order_id = %cmd.order_id, command_id = %cmd.command_id, "command admitted");
    Ok((
        StatusCode::ACCEPTED,
        Json(OrderAck::accepted(&cmd.order_id, &cmd.command_id)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_shapes() {
        let accepted = OrderAck::accepted("ord-1", "cmd-1");
        let json = serde_json::to_string(&accepted).unwrap();
        assert!(json.contains("\"status\":\"accepted\""));
        assert!(json.contains("\"order_id\":\"ord-1\""));

        let duplicate = OrderAck::duplicate("cmd-1");
        let json = serde_json::to_string(&duplicate).unwrap();
        assert!(json.contains("\"status\":\"duplicate\""));
        assert!(!json.contains("order_id"));
    }
}
