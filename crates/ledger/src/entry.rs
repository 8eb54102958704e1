//! Committed ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopstock_core::{ProductId, ShopId, TenantId, UserId};

use crate::movement::{MovementDraft, MovementKind, MovementRef};

/// An immutable, committed stock movement (assigned a sequence number).
///
/// Entries form an append-only history per (tenant, shop, product) position.
/// Sequence numbers are assigned by the store during apply and are
/// monotonically increasing within a position, starting at 1. Entries are
/// never updated or deleted; reversing a mistake means applying an
/// equal-and-opposite movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: Uuid,
    pub tenant_id: TenantId,
    pub shop_id: ShopId,
    pub product_id: ProductId,

    /// Monotonically increasing position in the per-position stream.
    pub sequence: u64,

    /// Signed quantity change: positive = increase, negative = decrease.
    pub delta: i64,
    pub kind: MovementKind,
    pub reference: MovementRef,

    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl LedgerEntry {
    /// Commit a draft at the given position sequence.
    pub fn from_draft(draft: MovementDraft, sequence: u64) -> Self {
        Self {
            entry_id: draft.entry_id,
            tenant_id: draft.tenant_id,
            shop_id: draft.shop_id,
            product_id: draft.product_id,
            sequence,
            delta: draft.delta,
            kind: draft.kind,
            reference: draft.reference,
            created_by: draft.created_by,
            created_at: draft.occurred_at,
            notes: draft.notes,
        }
    }
}
