//! Market-data frames
//!
//! L2 snapshots and trade prints published by the venue simulator on the
//! `market.data` topic, keyed by symbol.

use crate::numeric::{Price, Quantity};
use crate::order::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market-data frame kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketDataType {
    #[serde(rename = "L2")]
    L2,
    #[serde(rename = "TRADE")]
    Trade,
}

/// One side of one book level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub qty: Quantity,
}

/// A public trade print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInfo {
    pub price: Price,
    pub qty: Quantity,
    /// Taker side.
    pub side: Side,
}

/// Market-data update: an L2 snapshot or a trade print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataUpdate {
    #[serde(rename = "type")]
    pub update_type: MarketDataType,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bids: Vec<PriceLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asks: Vec<PriceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<TradeInfo>,
    pub timestamp: DateTime<Utc>,
}

impl MarketDataUpdate {
    /// Build an L2 snapshot frame.
    pub fn l2(symbol: &str, bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self {
            update_type: MarketDataType::L2,
            symbol: symbol.to_string(),
            bids,
            asks,
            trade: None,
            timestamp: Utc::now(),
        }
    }

    /// Build a trade-print frame.
    pub fn trade(symbol: &str, trade: TradeInfo) -> Self {
        Self {
            update_type: MarketDataType::Trade,
            symbol: symbol.to_string(),
            bids: Vec::new(),
            asks: Vec::new(),
            trade: Some(trade),
            timestamp: Utc::now(),
        }
    }
}
