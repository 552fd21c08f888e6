//! Error taxonomy for the shared domain types

use crate::order::OrderStatus;
use thiserror::Error;

/// An order-status transition outside the legal table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}
