//! Adjustment error model.

use thiserror::Error;

use shopstock_core::{DomainError, ProductId, ShopId};
use shopstock_ledger::LedgerError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdjustmentError {
    /// The requested quantity equals the current quantity; nothing to record.
    #[error(
        "adjustment for product {product_id} at shop {shop_id} changes nothing (quantity is already {quantity})"
    )]
    NoOpAdjustment {
        shop_id: ShopId,
        product_id: ProductId,
        quantity: i64,
    },

    /// Absolute quantities cannot be negative.
    #[error("adjusted quantity cannot be negative (got {requested})")]
    NegativeTarget { requested: i64 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("adjustment store failed: {0}")]
    Store(#[from] DomainError),
}
