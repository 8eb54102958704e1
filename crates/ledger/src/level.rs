//! Current on-hand quantity per (tenant, shop, product) position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopstock_core::{ProductId, ShopId, TenantId};

use crate::error::LedgerError;

/// Authoritative on-hand quantity for one position.
///
/// Invariants: `quantity >= 0`, and `quantity` always equals the sum of the
/// position's ledger entry deltas. Only ledger applies mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub tenant_id: TenantId,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Reorder threshold pushed from the product catalog; 0 means untracked.
    pub minimum_threshold: i64,
    pub last_updated: DateTime<Utc>,
}

impl StockLevel {
    /// Fresh position with no recorded stock.
    pub fn empty(
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        minimum_threshold: i64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            shop_id,
            product_id,
            quantity: 0,
            minimum_threshold,
            last_updated: at,
        }
    }

    /// How far the position sits below its threshold (0 when at or above it).
    pub fn shortage(&self) -> i64 {
        (self.minimum_threshold - self.quantity).max(0)
    }

    /// Apply a committed delta to the row.
    pub fn apply(&mut self, delta: i64, at: DateTime<Utc>) {
        self.quantity += delta;
        self.last_updated = at;
    }
}

/// Non-negativity guard for a prospective movement.
///
/// Returns the resulting quantity, or `InsufficientStock` when the delta
/// would drive the position below zero. The store calls this inside its
/// write transaction so the check and the write are one atomic step.
pub fn checked_apply(
    shop_id: ShopId,
    product_id: ProductId,
    current: i64,
    delta: i64,
) -> Result<i64, LedgerError> {
    let next = current + delta;
    if next < 0 {
        return Err(LedgerError::InsufficientStock {
            shop_id,
            product_id,
            requested: -delta,
            available: current,
        });
    }
    Ok(next)
}
