//! Ledger error model.

use thiserror::Error;

use shopstock_core::{ProductId, ShopId};

/// Errors raised by ledger movements and the stores that apply them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A decrementing movement would drive the position below zero.
    ///
    /// Recoverable: the caller must abort or reduce the requested quantity.
    #[error(
        "insufficient stock for product {product_id} at shop {shop_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        shop_id: ShopId,
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The movement itself is malformed (zero delta, sign discipline, batch misuse).
    #[error("invalid movement: {0}")]
    InvalidMovement(String),

    /// A movement batch mixed more than one tenant.
    #[error("movement batch spans multiple tenants")]
    TenantMismatch,

    /// A catalog threshold push carried a negative value.
    #[error("minimum threshold cannot be negative (got {threshold})")]
    NegativeThreshold { threshold: i64 },

    /// A guarded write observed a position that moved since it was read.
    ///
    /// Safe to retry: re-read the position and re-derive the movement.
    #[error("stale position read: expected sequence {expected}, found {found}")]
    SequenceConflict { expected: u64, found: u64 },

    /// The backing store failed to commit.
    ///
    /// Safe to retry: the write is atomic and leaves no partial effect.
    #[error("ledger write failed: {0}")]
    WriteFailed(String),
}
