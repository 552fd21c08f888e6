//! Client-submitted order commands
//!
//! An [`OrderCommand`] is the unit of admission at the gateway and the value
//! carried on the `orders.commands` topic. `command_id` is the client-chosen
//! idempotency token; `order_id` is the correlation key for the rest of the
//! pipeline.

use crate::numeric::{Price, Quantity};
use crate::order::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandType {
    New,
    Cancel,
    Replace,
}

impl CommandType {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::New => "NEW",
            CommandType::Cancel => "CANCEL",
            CommandType::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order command as submitted by a client.
///
/// CANCEL commands legitimately omit `side`, `quantity`, and `price`; NEW
/// commands must carry all three, which the gateway validates at admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCommand {
    #[serde(default)]
    pub command_id: String,
    #[serde(rename = "type")]
    pub command_type: CommandType,
    #[serde(default)]
    pub order_id: String,
    /// Account identifier, carried as `client_id` on the wire.
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
