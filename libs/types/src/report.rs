//! Execution reports
//!
//! Venue- or OMS-originated status messages for an order, carried on the
//! `exec.reports` topic. `price` preserves the original limit so the
//! gateway's settlement math can release exactly what the reservation took.

use crate::command::OrderCommand;
use crate::ids::new_exec_id;
use crate::numeric::{Price, Quantity};
use crate::order::{OrderStatus, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution report kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecType {
    New,
    Trade,
    Canceled,
    Rejected,
    PendingCancel,
}

impl ExecType {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecType::New => "NEW",
            ExecType::Trade => "TRADE",
            ExecType::Canceled => "CANCELED",
            ExecType::Rejected => "REJECTED",
            ExecType::PendingCancel => "PENDING_CANCEL",
        }
    }
}

impl fmt::Display for ExecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution report for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub exec_id: String,
    pub order_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default)]
    pub order_qty: Quantity,
    /// Original limit price, preserved for settlement math.
    #[serde(default)]
    pub price: Price,
    #[serde(rename = "type")]
    pub exec_type: ExecType,
    pub status: OrderStatus,
    #[serde(default)]
    pub last_qty: Quantity,
    #[serde(default)]
    pub last_px: Price,
    #[serde(default)]
    pub leaves_qty: Quantity,
    #[serde(default)]
    pub cum_qty: Quantity,
    #[serde(default)]
    pub avg_px: Price,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl ExecutionReport {
    /// Build a non-fill report from a command.
    ///
    /// `leaves_qty` is the full order quantity for `NEW`/`PENDING_SUBMIT`
    /// and `LIVE` statuses (nothing has filled yet).
    pub fn from_command(
        cmd: &OrderCommand,
        exec_type: ExecType,
        status: OrderStatus,
        reason: &str,
    ) -> Self {
        let leaves = match status {
            OrderStatus::New | OrderStatus::PendingSubmit | OrderStatus::Live => cmd.quantity,
            _ => Quantity::zero(),
        };
        Self {
            exec_id: new_exec_id(),
            order_id: cmd.order_id.clone(),
            client_id: cmd.client_id.clone(),
            symbol: cmd.symbol.clone(),
            side: cmd.side,
            order_qty: cmd.quantity,
            price: cmd.price,
            exec_type,
            status,
            last_qty: Quantity::zero(),
            last_px: Price::zero(),
            leaves_qty: leaves,
            cum_qty: Quantity::zero(),
            avg_px: Price::zero(),
            timestamp: Utc::now(),
            reason: reason.to_string(),
        }
    }

    /// Build a full-fill trade report from a command.
    pub fn fill_from_command(cmd: &OrderCommand, fill_qty: Quantity, fill_px: Price) -> Self {
        Self {
            exec_id: new_exec_id(),
            order_id: cmd.order_id.clone(),
            client_id: cmd.client_id.clone(),
            symbol: cmd.symbol.clone(),
            side: cmd.side,
            order_qty: cmd.quantity,
            price: cmd.price,
            exec_type: ExecType::Trade,
            status: OrderStatus::Filled,
            last_qty: fill_qty,
            last_px: fill_px,
            leaves_qty: Quantity::zero(),
            cum_qty: fill_qty,
            avg_px: fill_px,
            timestamp: Utc::now(),
            reason: String::new(),
        }
    }

    /// Limit price with fallback to the fill price when the limit is absent.
    pub fn limit_price(&self) -> Price {
        if self.price.is_zero() {
            self.last_px
        } else {
            self.price
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandType;

    fn new_buy_command() -> OrderCommand {
        OrderCommand {
            command_id: "cmd-1".into(),
            command_type: CommandType::New,
            order_id: "ord-1".into(),
            client_id: "ACC_CHILD_1".into(),
            symbol: "BTC-USD".into(),
            side: Some(Side::Buy),
            quantity: Quantity::from_str("2").unwrap(),
            price: Price::from_u64(50000),
            timestamp: None,
        }
    }

    #[test]
    fn test_live_report_carries_full_leaves() {
        let cmd = new_buy_command();
        let report =
            ExecutionReport::from_command(&cmd, ExecType::New, OrderStatus::Live, "");
        assert_eq!(report.leaves_qty, cmd.quantity);
        assert!(report.cum_qty.is_zero());
        assert_eq!(report.price, cmd.price);
        assert!(!report.exec_id.is_empty());
    }

    #[test]
    fn test_rejected_report_carries_reason() {
        let cmd = new_buy_command();
        let report = ExecutionReport::from_command(
            &cmd,
            ExecType::Rejected,
            OrderStatus::Rejected,
            "invalid transition from FILLED to PENDING_SUBMIT",
        );
        assert!(report.leaves_qty.is_zero());
        assert!(report.reason.contains("invalid transition"));
    }

    #[test]
    fn test_fill_report_quantities() {
        let cmd = new_buy_command();
        let px = Price::from_str("50010").unwrap();
        let report = ExecutionReport::fill_from_command(&cmd, cmd.quantity, px);
        assert_eq!(report.exec_type, ExecType::Trade);
        assert_eq!(report.status, OrderStatus::Filled);
        assert_eq!(report.last_qty, cmd.quantity);
        assert_eq!(report.cum_qty, cmd.quantity);
        assert!(report.leaves_qty.is_zero());
        assert_eq!(report.last_px, px);
        assert_eq!(report.avg_px, px);
    }

    #[test]
    fn test_limit_price_fallback() {
        let cmd = new_buy_command();
        let mut report = ExecutionReport::fill_from_command(
            &cmd,
            cmd.quantity,
            Price::from_u64(49990),
        );
        assert_eq!(report.limit_price(), Price::from_u64(50000));

        report.price = Price::zero();
        assert_eq!(report.limit_price(), Price::from_u64(49990));
    }

    #[test]
    fn test_report_round_trip() {
        let cmd = new_buy_command();
        let report = ExecutionReport::fill_from_command(&cmd, cmd.quantity, cmd.price);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"type\":\"TRADE\""));
        let decoded: ExecutionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, decoded);
    }
}
