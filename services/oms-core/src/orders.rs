//! Order persistence
//!
//! The OMS owns the orders table; no other component writes it. A
//! reconciliation consumer reloads status from here on every message
//! rather than trusting an in-memory replica, because consumer restarts
//! and rebalances would otherwise lose state.

use atlas_store::attrs::{attr_i, attr_n, attr_s, get_s};
use atlas_store::{AwsConfig, StoreClient, StoreError};
use atlas_types::command::OrderCommand;
use atlas_types::numeric::{Price, Quantity};
use atlas_types::order::OrderStatus;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;

#[derive(Clone)]
pub struct OrderRepository {
    store: StoreClient,
    table: String,
}

impl OrderRepository {
    pub fn new(store: StoreClient, cfg: &AwsConfig) -> Self {
        Self {
            store,
            table: cfg.orders_table.clone(),
        }
    }

    /// Load the persisted status; `Ok(None)` when the order is unknown.
    pub async fn get_status(&self, order_id: &str) -> Result<Option<OrderStatus>, StoreError> {
        let Some(item) = self.store.get_item(&self.table, "order_id", order_id).await? else {
            return Ok(None);
        };

        let status = get_s(&item, "status")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| StoreError::Sdk(format!("order {order_id} has no readable status")))?;
        Ok(Some(status))
    }

    /// Persist a freshly accepted order at `PENDING_SUBMIT`.
    pub async fn create(&self, cmd: &OrderCommand) -> Result<(), StoreError> {
        info!(order_id = %cmd.order_id, account_id = %cmd.client_id, "persisting new order");

        let now = Utc::now().timestamp();
        let side = cmd.side.map(|s| s.as_str()).unwrap_or_default();
        let mut item = HashMap::new();
        item.insert("order_id".to_string(), attr_s(&cmd.order_id));
        item.insert("account_id".to_string(), attr_s(&cmd.client_id));
        item.insert("symbol".to_string(), attr_s(&cmd.symbol));
        item.insert("side".to_string(), attr_s(side));
        item.insert("price".to_string(), attr_n(cmd.price.as_decimal()));
        item.insert("order_qty".to_string(), attr_n(cmd.quantity.as_decimal()));
        item.insert("cum_qty".to_string(), attr_n(Decimal::ZERO));
        item.insert("leaves_qty".to_string(), attr_n(cmd.quantity.as_decimal()));
        item.insert("avg_px".to_string(), attr_n(Decimal::ZERO));
        item.insert("last_px".to_string(), attr_n(Decimal::ZERO));
        item.insert(
            "status".to_string(),
            attr_s(OrderStatus::PendingSubmit.as_str()),
        );
        item.insert("created_at".to_string(), attr_i(now));
        item.insert("updated_at".to_string(), attr_i(now));

        self.store.put_item(&self.table, item).await
    }

    /// Advance the persisted status with the report's fill figures.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        cum_qty: Quantity,
        avg_px: Price,
    ) -> Result<(), StoreError> {
        info!(order_id, %status, cum_qty = %cum_qty, avg_px = %avg_px, "updating order status");

        self.store
            .update(
                &self.table,
                "order_id",
                order_id,
                "SET #s = :s, cum_qty = :cq, avg_px = :ap, updated_at = :u",
                None,
                HashMap::from([("#s".to_string(), "status".to_string())]),
                HashMap::from([
                    (":s".to_string(), attr_s(status.as_str())),
                    (":cq".to_string(), attr_n(cum_qty.as_decimal())),
                    (":ap".to_string(), attr_n(avg_px.as_decimal())),
                    (":u".to_string(), attr_i(Utc::now().timestamp())),
                ]),
            )
            .await
    }

    /// Connectivity probe for `/debug/ddb`.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.store.describe_table(&self.table).await
    }
}
