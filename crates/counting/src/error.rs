//! Count session error model.

use thiserror::Error;

use shopstock_core::{DomainError, ProductId, ShopId};
use shopstock_ledger::LedgerError;

use crate::session::{SessionAction, SessionId, SessionStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountingError {
    /// The shop tracks no stock, so there is nothing to count.
    #[error("shop {shop_id} has no tracked stock to count")]
    EmptyShopInventory { shop_id: ShopId },

    /// The session's status does not permit this action.
    #[error("invalid count session state: cannot {action} a {status} session")]
    InvalidState {
        status: SessionStatus,
        action: SessionAction,
    },

    /// The counted product is not part of the session's snapshot.
    #[error("product {product_id} is not part of this count session")]
    UnknownProduct { product_id: ProductId },

    /// Physical counts cannot be negative.
    #[error("counted quantity cannot be negative (got {quantity})")]
    NegativeCount { quantity: i64 },

    #[error("count session {0} not found")]
    NotFound(SessionId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("count session store failed: {0}")]
    Store(#[from] DomainError),
}
