//! Reservation and settlement arithmetic
//!
//! Pure functions computing every balance mutation the gateway performs, so
//! the accounting can be tested without a store. All amounts pass through
//! the platform rounding rule (half-even at fixed scale) before they reach
//! a store write; reservation, fill refund, and release therefore agree
//! bit-for-bit.
//!
//! Conservation: a reservation or release moves value between the
//! `available` and `reserved` buckets of one currency without changing
//! their sum; a fill additionally posts the traded asset and returns the
//! unspent part of the reservation.

use atlas_types::numeric::{round_cash, round_qty, Price, Quantity};
use atlas_types::order::{OrderStatus, Side};
use atlas_types::report::ExecutionReport;
use rust_decimal::Decimal;

/// Balance movement required to admit a NEW command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Reserve quote currency: `usd_available -= cost, usd_reserved += cost`
    /// guarded by `usd_available >= cost`.
    Buy { cost: Decimal },
    /// Reserve base inventory: `btc_available -= qty, btc_reserved += qty`
    /// guarded by `btc_available >= qty`.
    Sell { qty: Decimal },
}

/// Compute the reservation for a NEW command.
pub fn reservation_for(side: Side, quantity: Quantity, price: Price) -> Reservation {
    match side {
        Side::Buy => Reservation::Buy {
            cost: round_cash(quantity * price),
        },
        Side::Sell => Reservation::Sell {
            qty: round_qty(quantity.as_decimal()),
        },
    }
}

/// Signed deltas against the four balance columns of one account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceDelta {
    pub usd_available: Decimal,
    pub usd_reserved: Decimal,
    pub btc_available: Decimal,
    pub btc_reserved: Decimal,
}

impl BalanceDelta {
    /// Net USD movement across both buckets.
    pub fn usd_net(&self) -> Decimal {
        self.usd_available + self.usd_reserved
    }

    /// Net BTC movement across both buckets.
    pub fn btc_net(&self) -> Decimal {
        self.btc_available + self.btc_reserved
    }

    /// True when nothing moves.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Settlement delta for a fill (`FILLED` / `PARTIALLY_FILLED`).
///
/// BUY: the reservation held `last_qty × limit_px`; the trade cost
/// `last_qty × last_px`. The difference is refunded (non-negative: a BUY
/// limit fills at or below its limit) and the bought quantity is credited.
/// SELL: proceeds are credited and the sold inventory leaves reservation.
pub fn fill_delta(side: Side, last_qty: Quantity, last_px: Price, limit_px: Price) -> BalanceDelta {
    match side {
        Side::Buy => {
            let reserved_amount = round_cash(last_qty * limit_px);
            let actual_cost = round_cash(last_qty * last_px);
            let refund = reserved_amount - actual_cost;
            BalanceDelta {
                usd_available: refund,
                usd_reserved: -reserved_amount,
                btc_available: round_qty(last_qty.as_decimal()),
                btc_reserved: Decimal::ZERO,
            }
        }
        Side::Sell => {
            let proceeds = round_cash(last_qty * last_px);
            BalanceDelta {
                usd_available: proceeds,
                usd_reserved: Decimal::ZERO,
                btc_available: Decimal::ZERO,
                btc_reserved: -round_qty(last_qty.as_decimal()),
            }
        }
    }
}

/// Unfilled quantity to release on a terminal non-fill status.
///
/// A rejected order never reserved less than its full quantity, so the
/// release covers `order_qty`; a cancel releases whatever is left.
pub fn release_leaves(status: OrderStatus, order_qty: Quantity, leaves_qty: Quantity) -> Quantity {
    if status == OrderStatus::Rejected {
        order_qty
    } else {
        leaves_qty
    }
}

/// Settlement delta for a `CANCELED` / `REJECTED` report; `None` when
/// nothing is left to release.
pub fn release_delta(side: Side, leaves: Quantity, limit_px: Price) -> Option<BalanceDelta> {
    if leaves.is_zero() {
        return None;
    }
    let delta = match side {
        Side::Buy => {
            let amount = round_cash(leaves * limit_px);
            BalanceDelta {
                usd_available: amount,
                usd_reserved: -amount,
                btc_available: Decimal::ZERO,
                btc_reserved: Decimal::ZERO,
            }
        }
        Side::Sell => {
            let qty = round_qty(leaves.as_decimal());
            BalanceDelta {
                usd_available: Decimal::ZERO,
                usd_reserved: Decimal::ZERO,
                btc_available: qty,
                btc_reserved: -qty,
            }
        }
    };
    Some(delta)
}

/// Settlement delta for an execution report, dispatched on status.
///
/// Only fills and terminal non-fill statuses move balances; everything
/// else (`PENDING_SUBMIT`, `LIVE`, `CANCEL_PENDING`, ...) returns `None`.
pub fn settlement_delta(report: &ExecutionReport) -> Option<BalanceDelta> {
    let side = report.side?;
    match report.status {
        OrderStatus::Filled | OrderStatus::PartiallyFilled => Some(fill_delta(
            side,
            report.last_qty,
            report.last_px,
            report.limit_price(),
        )),
        OrderStatus::Canceled | OrderStatus::Rejected => {
            let leaves = release_leaves(report.status, report.order_qty, report.leaves_qty);
            release_delta(side, leaves, report.limit_price())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_types::command::{CommandType, OrderCommand};
    use atlas_types::report::ExecutionReport;
    use rust_decimal_macros::dec;

    fn qty(s: &str) -> Quantity {
        Quantity::from_str(s).unwrap()
    }

    fn px(s: &str) -> Price {
        Price::from_str(s).unwrap()
    }

    fn buy_command(quantity: &str, price: &str) -> OrderCommand {
        OrderCommand {
            command_id: "cmd-1".into(),
            command_type: CommandType::New,
            order_id: "ord-1".into(),
            client_id: "ACC_CHILD_1".into(),
            symbol: "BTC-USD".into(),
            side: Some(Side::Buy),
            quantity: qty(quantity),
            price: px(price),
            timestamp: None,
        }
    }

    #[test]
    fn test_buy_reservation_cost() {
        let res = reservation_for(Side::Buy, qty("1.5"), px("50000"));
        assert_eq!(res, Reservation::Buy { cost: dec!(75000) });
    }

    #[test]
    fn test_sell_reservation_quantity() {
        let res = reservation_for(Side::Sell, qty("0.25"), px("50000"));
        assert_eq!(res, Reservation::Sell { qty: dec!(0.25) });
    }

    #[test]
    fn test_buy_fill_refund() {
        // Reserved 1 × 50000; filled at 49990: refund 10, credit 1 BTC.
        let delta = fill_delta(Side::Buy, qty("1"), px("49990"), px("50000"));
        assert_eq!(delta.usd_reserved, dec!(-50000));
        assert_eq!(delta.usd_available, dec!(10));
        assert_eq!(delta.btc_available, dec!(1));
        assert_eq!(delta.btc_reserved, Decimal::ZERO);

        // Net USD outflow equals the actual cost; BTC inflow the fill qty.
        assert_eq!(delta.usd_net(), dec!(-49990));
        assert_eq!(delta.btc_net(), dec!(1));
    }

    #[test]
    fn test_buy_fill_at_limit_refunds_nothing() {
        let delta = fill_delta(Side::Buy, qty("2"), px("50000"), px("50000"));
        assert_eq!(delta.usd_available, Decimal::ZERO);
        assert_eq!(delta.usd_reserved, dec!(-100000));
        assert_eq!(delta.btc_available, dec!(2));
    }

    #[test]
    fn test_sell_fill_proceeds() {
        let delta = fill_delta(Side::Sell, qty("0.5"), px("50010"), px("50000"));
        assert_eq!(delta.usd_available, dec!(25005));
        assert_eq!(delta.btc_reserved, dec!(-0.5));
        assert_eq!(delta.usd_net(), dec!(25005));
        assert_eq!(delta.btc_net(), dec!(-0.5));
    }

    #[test]
    fn test_partial_fill_uses_last_qty() {
        // A 2-lot order partially filled for 0.75 settles only 0.75.
        let delta = fill_delta(Side::Buy, qty("0.75"), px("50000"), px("50000"));
        assert_eq!(delta.usd_reserved, dec!(-37500));
        assert_eq!(delta.btc_available, dec!(0.75));
    }

    #[test]
    fn test_release_leaves_rejected_is_full_qty() {
        assert_eq!(
            release_leaves(OrderStatus::Rejected, qty("3"), qty("0")),
            qty("3")
        );
        assert_eq!(
            release_leaves(OrderStatus::Canceled, qty("3"), qty("1.5")),
            qty("1.5")
        );
    }

    #[test]
    fn test_buy_release_moves_reservation_back() {
        let delta = release_delta(Side::Buy, qty("1.5"), px("50000")).unwrap();
        assert_eq!(delta.usd_available, dec!(75000));
        assert_eq!(delta.usd_reserved, dec!(-75000));
        // A release never changes net holdings.
        assert_eq!(delta.usd_net(), Decimal::ZERO);
        assert_eq!(delta.btc_net(), Decimal::ZERO);
    }

    #[test]
    fn test_sell_release_moves_inventory_back() {
        let delta = release_delta(Side::Sell, qty("1"), px("100000")).unwrap();
        assert_eq!(delta.btc_available, dec!(1));
        assert_eq!(delta.btc_reserved, dec!(-1));
        assert_eq!(delta.usd_net(), Decimal::ZERO);
        assert_eq!(delta.btc_net(), Decimal::ZERO);
    }

    #[test]
    fn test_release_with_no_leaves_is_noop() {
        assert_eq!(release_delta(Side::Buy, qty("0"), px("50000")), None);
    }

    #[test]
    fn test_reservation_then_fill_conserves_value() {
        // Admission reserves; the fill consumes the reservation exactly.
        let order_qty = qty("1");
        let limit = px("50000");
        let Reservation::Buy { cost } = reservation_for(Side::Buy, order_qty, limit) else {
            panic!("expected buy reservation");
        };

        let fill = fill_delta(Side::Buy, order_qty, px("49995.00"), limit);
        // The whole reservation is consumed: -cost on the reserved bucket.
        assert_eq!(fill.usd_reserved, -cost);
        // Refund + actual cost reconstruct the reservation.
        assert_eq!(fill.usd_available + round_cash(order_qty * px("49995.00")), cost);
    }

    #[test]
    fn test_settlement_delta_dispatch() {
        let cmd = buy_command("1", "50000");

        let live = ExecutionReport::from_command(
            &cmd,
            atlas_types::report::ExecType::New,
            OrderStatus::Live,
            "",
        );
        assert_eq!(settlement_delta(&live), None);

        let fill = ExecutionReport::fill_from_command(&cmd, qty("1"), px("49990"));
        let delta = settlement_delta(&fill).unwrap();
        assert_eq!(delta.btc_available, dec!(1));

        let mut canceled = ExecutionReport::from_command(
            &cmd,
            atlas_types::report::ExecType::Canceled,
            OrderStatus::Canceled,
            "",
        );
        canceled.leaves_qty = qty("1");
        let delta = settlement_delta(&canceled).unwrap();
        assert_eq!(delta.usd_available, dec!(50000));
        assert_eq!(delta.usd_net(), Decimal::ZERO);
    }

    #[test]
    fn test_settlement_delta_without_side_is_noop() {
        let mut report = ExecutionReport::fill_from_command(&buy_command("1", "50000"), qty("1"), px("50000"));
        report.side = None;
        assert_eq!(settlement_delta(&report), None);
    }

    #[test]
    fn test_rounding_is_half_even_at_cash_scale() {
        // 0.33333333 × 0.00000375 = 0.0000012499999875 → rounds to 8 dp.
        let delta = fill_delta(Side::Buy, qty("0.33333333"), px("0.00000375"), px("0.00000375"));
        assert_eq!(delta.usd_reserved, dec!(-0.00000125));
    }
}
