//! Top-of-book matcher
//!
//! Consumes `ORDER_CREATED` events, acknowledges each order with a
//! `NEW/LIVE` report, and fills it in full when its limit crosses the
//! current top of book. Unmatched orders rest silently: there is no book
//! simulation, so they only ever fill at arrival. Dedupe state is an
//! in-memory set; the simulator is not a source of truth and restarting
//! it empty is acceptable.

use crate::market::{top_of_book, MarketState};
use atlas_bus::{BusMessage, Producer};
use atlas_types::command::OrderCommand;
use atlas_types::event::{OrderEvent, OrderEventType};
use atlas_types::numeric::{round_cash, Price};
use atlas_types::order::{OrderStatus, Side};
use atlas_types::report::{ExecType, ExecutionReport};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Simulated venue latency bounds for a fill, in milliseconds.
const FILL_DELAY_MS: std::ops::RangeInclusive<u64> = 50..=250;

/// Crossing check: the fill price, or `None` when the order rests.
///
/// BUY fills iff `limit >= best_ask`, at `best_ask`; SELL fills iff
/// `limit <= best_bid`, at `best_bid`.
pub fn crossing_price(side: Side, limit: Price, best_bid: Decimal, best_ask: Decimal) -> Option<Decimal> {
    match side {
        Side::Buy if limit.as_decimal() >= best_ask => Some(best_ask),
        Side::Sell if limit.as_decimal() <= best_bid => Some(best_bid),
        _ => None,
    }
}

pub struct Matcher {
    market: Arc<MarketState>,
    execs: Arc<Producer>,
    seen: Mutex<HashSet<String>>,
}

impl Matcher {
    pub fn new(market: Arc<MarketState>, execs: Arc<Producer>) -> Self {
        Self {
            market,
            execs,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// True when this order was already handled (re-delivered event).
    fn already_seen(&self, order_id: &str) -> bool {
        match self.seen.lock() {
            Ok(mut seen) => !seen.insert(order_id.to_string()),
            Err(_) => false,
        }
    }

    /// Handle one message from `orders.events`.
    pub async fn handle_event(&self, msg: BusMessage) -> anyhow::Result<()> {
        let event: OrderEvent = match serde_json::from_slice(&msg.payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "undecodable order event");
                return Ok(());
            }
        };
        if event.event_type != OrderEventType::OrderCreated {
            return Ok(());
        }

        let cmd: OrderCommand = match serde_json::from_value(event.payload) {
            Ok(cmd) => cmd,
            Err(err) => {
                warn!(order_id = %event.order_id, error = %err, "event payload is not a command");
                return Ok(());
            }
        };

        if self.already_seen(&cmd.order_id) {
            info!(order_id = %cmd.order_id, "duplicate order ignored");
            return Ok(());
        }

        info!(
            order_id = %cmd.order_id,
            symbol = %cmd.symbol,
            price = %cmd.price,
            quantity = %cmd.quantity,
            "received order"
        );

        // Acknowledge immediately: the order is live at the venue.
        self.send_report(ExecutionReport::from_command(
            &cmd,
            ExecType::New,
            OrderStatus::Live,
            "",
        ))
        .await?;

        let Some(side) = cmd.side else {
            warn!(order_id = %cmd.order_id, "order without side, not matching");
            return Ok(());
        };
        let Some(mid) = self.market.mid(&cmd.symbol) else {
            warn!(symbol = %cmd.symbol, "unknown symbol, ignoring match");
            return Ok(());
        };

        let (best_bid, best_ask) = top_of_book(mid);
        let Some(fill_price) = crossing_price(side, cmd.price, best_bid, best_ask) else {
            info!(order_id = %cmd.order_id, %best_bid, %best_ask, "order resting");
            return Ok(());
        };

        // Simulated venue latency. The rng handle must not live across
        // the await.
        let delay = rand::thread_rng().gen_range(FILL_DELAY_MS);
        info!(order_id = %cmd.order_id, fill_price = %fill_price, delay_ms = delay, "order matched");
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.send_report(ExecutionReport::fill_from_command(
            &cmd,
            cmd.quantity,
            Price::new(round_cash(fill_price)),
        ))
        .await?;

        Ok(())
    }

    async fn send_report(&self, report: ExecutionReport) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&report)?;
        self.execs.send(&report.order_id, &payload).await?;
        info!(order_id = %report.order_id, status = %report.status, "exec report emitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_crosses_the_ask() {
        let (bid, ask) = (dec!(49990), dec!(50010));
        assert_eq!(
            crossing_price(Side::Buy, Price::from_u64(50010), bid, ask),
            Some(dec!(50010))
        );
        assert_eq!(
            crossing_price(Side::Buy, Price::from_u64(60000), bid, ask),
            Some(dec!(50010))
        );
    }

    #[test]
    fn test_buy_below_ask_rests() {
        let (bid, ask) = (dec!(49990), dec!(50010));
        assert_eq!(crossing_price(Side::Buy, Price::from_u64(50000), bid, ask), None);
    }

    #[test]
    fn test_sell_crosses_the_bid() {
        let (bid, ask) = (dec!(49990), dec!(50010));
        assert_eq!(
            crossing_price(Side::Sell, Price::from_u64(49990), bid, ask),
            Some(dec!(49990))
        );
        assert_eq!(
            crossing_price(Side::Sell, Price::from_u64(1), bid, ask),
            Some(dec!(49990))
        );
    }

    #[test]
    fn test_sell_above_bid_rests() {
        // A sell far above the market never fills in this simulator.
        let (bid, ask) = (dec!(49990), dec!(50010));
        assert_eq!(
            crossing_price(Side::Sell, Price::from_u64(100000), bid, ask),
            None
        );
    }

    #[test]
    fn test_fills_happen_at_market_not_limit() {
        let (bid, ask) = (dec!(49990), dec!(50010));
        // An aggressive buy limit fills at the ask, not at its own price.
        let fill = crossing_price(Side::Buy, Price::from_u64(55000), bid, ask).unwrap();
        assert_eq!(fill, ask);
    }
}
