//! Order lifecycle types
//!
//! The order status enum and the persisted order row. Legal status
//! transitions live in [`crate::fsm`]; this module only defines the states
//! and the row invariants.

use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Order status over the full lifecycle.
///
/// Legal transitions are enforced by [`crate::fsm::can_transition`]:
/// `NEW → PENDING_SUBMIT → {LIVE, REJECTED}`, `LIVE → {PARTIALLY_FILLED,
/// CANCEL_PENDING, REPLACE_PENDING, FILLED}`, `PARTIALLY_FILLED → {FILLED,
/// CANCEL_PENDING, REPLACE_PENDING}`, `CANCEL_PENDING → CANCELED`,
/// `REPLACE_PENDING → LIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PendingSubmit,
    Live,
    PartiallyFilled,
    Filled,
    CancelPending,
    Canceled,
    ReplacePending,
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::PendingSubmit => "PENDING_SUBMIT",
            OrderStatus::Live => "LIVE",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::CancelPending => "CANCEL_PENDING",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::ReplacePending => "REPLACE_PENDING",
            OrderStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "PENDING_SUBMIT" => Ok(OrderStatus::PendingSubmit),
            "LIVE" => Ok(OrderStatus::Live),
            "PARTIALLY_FILLED" => Ok(OrderStatus::PartiallyFilled),
            "FILLED" => Ok(OrderStatus::Filled),
            "CANCEL_PENDING" => Ok(OrderStatus::CancelPending),
            "CANCELED" => Ok(OrderStatus::Canceled),
            "REPLACE_PENDING" => Ok(OrderStatus::ReplacePending),
            "REJECTED" => Ok(OrderStatus::Rejected),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Persisted order row, keyed by `order_id`.
///
/// Invariant: `cum_qty + leaves_qty = order_qty` whenever
/// `status != REJECTED`; `avg_px` is the VWAP of all fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub account_id: String,
    pub symbol: String,
    pub side: Side,
    /// Limit price.
    pub price: Price,
    pub order_qty: Quantity,
    pub cum_qty: Quantity,
    pub leaves_qty: Quantity,
    pub avg_px: Price,
    pub last_px: Price,
    pub status: OrderStatus,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
}

impl Order {
    /// Check quantity invariant: cum + leaves = order quantity
    pub fn check_invariant(&self) -> bool {
        self.status == OrderStatus::Rejected
            || self.cum_qty.as_decimal() + self.leaves_qty.as_decimal()
                == self.order_qty.as_decimal()
    }
}
