//! Transfer error model.

use thiserror::Error;

use shopstock_core::{DomainError, ProductId, ShopId};
use shopstock_ledger::LedgerError;

use crate::status::{TransferAction, TransferStatus};
use crate::transfer::TransferId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The transition table does not admit this action from this status.
    ///
    /// Caller logic error, not retryable.
    #[error("invalid transfer transition: cannot {action} a {status} transfer")]
    InvalidTransition {
        status: TransferStatus,
        action: TransferAction,
    },

    /// Source and destination must differ.
    #[error("transfer source and destination are the same shop ({shop_id})")]
    SameShop { shop_id: ShopId },

    /// A transfer proposal needs at least one line.
    #[error("transfer requires at least one line")]
    EmptyLines,

    /// Requested quantities are strictly positive.
    #[error("requested quantity for product {product_id} must be positive (got {quantity})")]
    NonPositiveQuantity { product_id: ProductId, quantity: i64 },

    #[error("transfer {0} not found")]
    NotFound(TransferId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("transfer store failed: {0}")]
    Store(#[from] DomainError),
}
