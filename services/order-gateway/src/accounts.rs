//! Account store operations
//!
//! The gateway owns the balances and idempotency tables. Reservations go
//! through conditional updates so the sufficiency check and the debit are
//! one atomic store operation; settlement deltas from
//! [`crate::settlement`] are rendered into update expressions here.

use crate::settlement::{BalanceDelta, Reservation};
use atlas_store::attrs::{attr_i, attr_n, attr_s, get_n};
use atlas_store::{AttributeValue, AwsConfig, StoreClient, StoreError};
use atlas_types::account::{AccountBalances, Balance};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::{info, warn};

/// Account used when a command or query names none.
pub const DEFAULT_ACCOUNT: &str = "ACC_CHILD_1";

/// Seed balances for lazily created accounts.
const SEED_USD: Decimal = dec!(1000000);
const SEED_BTC: Decimal = dec!(50);

#[derive(Clone)]
pub struct AccountStore {
    store: StoreClient,
    balances_table: String,
    idempotency_table: String,
}

impl AccountStore {
    pub fn new(store: StoreClient, cfg: &AwsConfig) -> Self {
        Self {
            store,
            balances_table: cfg.balances_table.clone(),
            idempotency_table: cfg.idempotency_table.clone(),
        }
    }

    /// Record `request_id` as processed. `Ok(true)` when this call claimed
    /// it, `Ok(false)` when it was already present (duplicate).
    pub async fn mark_processed(&self, request_id: &str) -> Result<bool, StoreError> {
        let mut item = HashMap::new();
        item.insert("request_id".to_string(), attr_s(request_id));
        self.store
            .put_if_absent(&self.idempotency_table, "request_id", item)
            .await
    }

    /// Fetch an account, lazily creating it with seed balances.
    pub async fn get_or_create(&self, account_id: &str) -> Result<AccountBalances, StoreError> {
        if let Some(item) = self
            .store
            .get_item(&self.balances_table, "account_id", account_id)
            .await?
        {
            let balances = AccountBalances {
                usd: Balance {
                    available: get_n(&item, "usd_available").unwrap_or_default(),
                    reserved: get_n(&item, "usd_reserved").unwrap_or_default(),
                },
                btc: Balance {
                    available: get_n(&item, "btc_available").unwrap_or_default(),
                    reserved: get_n(&item, "btc_reserved").unwrap_or_default(),
                },
            };
            if !balances.check_invariant() {
                warn!(account_id, "account row has a negative balance bucket");
            }
            return Ok(balances);
        }

        info!(account_id, "initializing new account with seed balances");
        let seeded = AccountBalances::seeded(SEED_USD, SEED_BTC);
        let mut item = HashMap::new();
        item.insert("account_id".to_string(), attr_s(account_id));
        item.insert("usd_available".to_string(), attr_n(seeded.usd.available));
        item.insert("usd_reserved".to_string(), attr_n(seeded.usd.reserved));
        item.insert("btc_available".to_string(), attr_n(seeded.btc.available));
        item.insert("btc_reserved".to_string(), attr_n(seeded.btc.reserved));
        item.insert("updated_at".to_string(), attr_i(Utc::now().timestamp()));
        self.store.put_item(&self.balances_table, item).await?;

        Ok(seeded)
    }

    /// Atomically move funds from available to reserved, guarded by a
    /// sufficiency predicate. [`StoreError::ConditionFailed`] means
    /// insufficient funds/inventory.
    pub async fn reserve(
        &self,
        account_id: &str,
        reservation: &Reservation,
    ) -> Result<(), StoreError> {
        let (update_expr, condition_expr, values) = match reservation {
            Reservation::Buy { cost } => (
                "SET usd_available = usd_available - :cost, usd_reserved = usd_reserved + :cost",
                "usd_available >= :cost",
                HashMap::from([(":cost".to_string(), attr_n(*cost))]),
            ),
            Reservation::Sell { qty } => (
                "SET btc_available = btc_available - :qty, btc_reserved = btc_reserved + :qty",
                "btc_available >= :qty",
                HashMap::from([(":qty".to_string(), attr_n(*qty))]),
            ),
        };

        self.store
            .update(
                &self.balances_table,
                "account_id",
                account_id,
                update_expr,
                Some(condition_expr),
                HashMap::new(),
                values,
            )
            .await
    }

    /// Best-effort inverse of [`reserve`](Self::reserve) after a failed
    /// publish. Unguarded; errors are logged, not propagated.
    pub async fn undo_reserve(&self, account_id: &str, reservation: &Reservation) {
        let (update_expr, values) = match reservation {
            Reservation::Buy { cost } => (
                "SET usd_available = usd_available + :cost, usd_reserved = usd_reserved - :cost",
                HashMap::from([(":cost".to_string(), attr_n(*cost))]),
            ),
            Reservation::Sell { qty } => (
                "SET btc_available = btc_available + :qty, btc_reserved = btc_reserved - :qty",
                HashMap::from([(":qty".to_string(), attr_n(*qty))]),
            ),
        };

        if let Err(err) = self
            .store
            .update(
                &self.balances_table,
                "account_id",
                account_id,
                update_expr,
                None,
                HashMap::new(),
                values,
            )
            .await
        {
            warn!(account_id, error = %err, "failed to undo reservation");
        }
    }

    /// Apply a settlement delta as one signed-add update.
    pub async fn apply_delta(
        &self,
        account_id: &str,
        delta: &BalanceDelta,
    ) -> Result<(), StoreError> {
        let (update_expr, values) = render_delta(delta);
        if values.is_empty() {
            return Ok(());
        }

        self.store
            .update(
                &self.balances_table,
                "account_id",
                account_id,
                &update_expr,
                None,
                HashMap::new(),
                values,
            )
            .await
    }

    /// Connectivity probe for `/debug/ddb`.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.store.describe_table(&self.balances_table).await
    }
}

/// Render the non-zero components of a delta into a signed-add update
/// expression.
fn render_delta(delta: &BalanceDelta) -> (String, HashMap<String, AttributeValue>) {
    let fields = [
        ("usd_available", ":ua", delta.usd_available),
        ("usd_reserved", ":ur", delta.usd_reserved),
        ("btc_available", ":ba", delta.btc_available),
        ("btc_reserved", ":br", delta.btc_reserved),
    ];

    let mut clauses = Vec::new();
    let mut values = HashMap::new();
    for (column, placeholder, amount) in fields {
        if amount != Decimal::ZERO {
            clauses.push(format!("{column} = {column} + {placeholder}"));
            values.insert(placeholder.to_string(), attr_n(amount));
        }
    }

    (format!("SET {}", clauses.join(", ")), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_delta_skips_zero_columns() {
        let delta = BalanceDelta {
            usd_available: dec!(10),
            usd_reserved: dec!(-50000),
            btc_available: dec!(1),
            btc_reserved: Decimal::ZERO,
        };
        let (expr, values) = render_delta(&delta);

        assert_eq!(
            expr,
            "SET usd_available = usd_available + :ua, \
             usd_reserved = usd_reserved + :ur, \
             btc_available = btc_available + :ba"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(values.get(":ur"), Some(&attr_n(dec!(-50000))));
        assert!(!values.contains_key(":br"));
    }

    #[test]
    fn test_render_empty_delta() {
        let (_, values) = render_delta(&BalanceDelta::default());
        assert!(values.is_empty());
    }
}
