//! Synthetic market data
//!
//! Per-symbol mid prices evolve by a bounded random walk (±0.1% per tick,
//! once per second). Each tick publishes a three-level L2 snapshot per
//! symbol and, with 30% probability, a trade print at a best price. The
//! matcher reads the same mids through [`MarketState`], so quotes and
//! fills always come from one book.

use atlas_types::market::{MarketDataUpdate, PriceLevel, TradeInfo};
use atlas_types::numeric::{round_cash, round_qty, Price, Quantity};
use atlas_types::order::Side;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::RwLock;

/// Fractional half-spread applied around the mid.
const SPREAD_RATIO: Decimal = dec!(0.0002);
/// Per-tick volatility: the walk step is `mid × (U(0,1) − 0.5) × 0.002`.
const WALK_RATIO: f64 = 0.002;
/// Price steps for the second and third book levels.
const LEVEL_2_STEP: Decimal = dec!(0.0005);
const LEVEL_3_STEP: Decimal = dec!(0.0010);
/// Probability of a trade print per symbol per tick.
const TRADE_PRINT_PROB: f64 = 0.3;

/// Current mid prices, written by the ticker and read by the matcher.
pub struct MarketState {
    prices: RwLock<HashMap<String, Decimal>>,
}

impl MarketState {
    /// Seed the venue's known symbols.
    pub fn with_default_symbols() -> Self {
        Self {
            prices: RwLock::new(HashMap::from([
                ("BTC-USD".to_string(), dec!(50000)),
                ("ETH-USD".to_string(), dec!(3000)),
                ("SOL-USD".to_string(), dec!(100)),
            ])),
        }
    }

    /// Current mid for a symbol; `None` for unknown symbols.
    pub fn mid(&self, symbol: &str) -> Option<Decimal> {
        self.prices
            .read()
            .ok()
            .and_then(|prices| prices.get(symbol).copied())
    }

    /// Known symbols, for the ticker.
    pub fn symbols(&self) -> Vec<String> {
        self.prices
            .read()
            .map(|prices| prices.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Advance one symbol's mid by one random-walk step; returns the new mid.
    pub fn step<R: Rng>(&self, symbol: &str, rng: &mut R) -> Option<Decimal> {
        let mut prices = self.prices.write().ok()?;
        let mid = prices.get_mut(symbol)?;
        let factor =
            Decimal::from_f64((rng.gen::<f64>() - 0.5) * WALK_RATIO).unwrap_or_default();
        *mid = round_cash(*mid + *mid * factor);
        Some(*mid)
    }
}

/// Best bid and ask derived from a mid by the fixed spread.
pub fn top_of_book(mid: Decimal) -> (Decimal, Decimal) {
    let spread = mid * SPREAD_RATIO;
    (mid - spread, mid + spread)
}

/// Build one tick's L2 snapshot for a symbol.
pub fn build_l2<R: Rng>(symbol: &str, mid: Decimal, rng: &mut R) -> MarketDataUpdate {
    let (best_bid, best_ask) = top_of_book(mid);
    let step2 = mid * LEVEL_2_STEP;
    let step3 = mid * LEVEL_3_STEP;

    let mut level = |price: Decimal, max_size: f64| PriceLevel {
        price: Price::new(round_cash(price)),
        qty: Quantity::new(round_qty(
            Decimal::from_f64(rng.gen::<f64>() * max_size).unwrap_or_default(),
        )),
    };

    let bids = vec![
        level(best_bid, 5.0),
        level(best_bid - step2, 10.0),
        level(best_bid - step3, 20.0),
    ];
    let asks = vec![
        level(best_ask, 5.0),
        level(best_ask + step2, 10.0),
        level(best_ask + step3, 20.0),
    ];

    MarketDataUpdate::l2(symbol, bids, asks)
}

/// Maybe build a trade print at one of the best prices.
pub fn maybe_trade_print<R: Rng>(
    symbol: &str,
    mid: Decimal,
    rng: &mut R,
) -> Option<MarketDataUpdate> {
    if rng.gen::<f64>() >= TRADE_PRINT_PROB {
        return None;
    }

    let (best_bid, best_ask) = top_of_book(mid);
    let (side, price) = if rng.gen::<f64>() > 0.5 {
        (Side::Sell, best_bid)
    } else {
        (Side::Buy, best_ask)
    };

    Some(MarketDataUpdate::trade(
        symbol,
        TradeInfo {
            price: Price::new(round_cash(price)),
            qty: Quantity::new(round_qty(
                Decimal::from_f64(rng.gen::<f64>() * 2.0).unwrap_or_default(),
            )),
            side,
        },
    ))
}

/// One tick across all symbols: walk each mid, emit its L2 snapshot and
/// any trade print.
pub fn tick<R: Rng>(state: &MarketState, rng: &mut R) -> Vec<MarketDataUpdate> {
    let mut frames = Vec::new();
    for symbol in state.symbols() {
        let Some(mid) = state.step(&symbol, rng) else {
            continue;
        };
        frames.push(build_l2(&symbol, mid, rng));
        if let Some(print) = maybe_trade_print(&symbol, mid, rng) {
            frames.push(print);
        }
    }
    frames
}
