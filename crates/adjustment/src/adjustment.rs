//! Manual stock adjustments.
//!
//! The escape hatch for discrepancies not covered by a transfer or a formal
//! count: a single shop, a single product, a single audited movement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopstock_core::{Entity, ProductId, ShopId, TenantId, UserId};
use shopstock_ledger::{MovementDraft, MovementKind, MovementRef};

use crate::error::AdjustmentError;

/// Adjustment identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentId(Uuid);

impl AdjustmentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AdjustmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for AdjustmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Why an operator overrode a quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    Correction,
    Damaged,
    Lost,
    Found,
    InventoryCount,
}

/// Command: set a position to a new absolute quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub tenant_id: TenantId,
    pub adjustment_id: AdjustmentId,
    /// Opaque human-readable number from the external allocator.
    pub adjustment_number: String,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub new_quantity: i64,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Immutable audited record of one quantity override.
///
/// Always paired 1:1 with exactly one ledger entry carrying the same
/// reference id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: AdjustmentId,
    pub tenant_id: TenantId,
    pub adjustment_number: String,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub quantity_before: i64,
    pub quantity_change: i64,
    pub quantity_after: i64,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Adjustment {
    /// Build the adjustment record and its paired ledger draft.
    ///
    /// `quantity_before` must be the position's quantity as read inside the
    /// same store transaction that applies the draft; the change is the
    /// difference to the requested absolute quantity.
    pub fn prepare(
        request: AdjustmentRequest,
        quantity_before: i64,
    ) -> Result<(Adjustment, MovementDraft), AdjustmentError> {
        if request.new_quantity < 0 {
            return Err(AdjustmentError::NegativeTarget {
                requested: request.new_quantity,
            });
        }

        let quantity_change = request.new_quantity - quantity_before;
        if quantity_change == 0 {
            return Err(AdjustmentError::NoOpAdjustment {
                shop_id: request.shop_id,
                product_id: request.product_id,
                quantity: quantity_before,
            });
        }

        let kind = if quantity_change > 0 {
            MovementKind::AdjustmentIn
        } else {
            MovementKind::AdjustmentOut
        };

        let draft = MovementDraft::new(
            request.tenant_id,
            request.shop_id,
            request.product_id,
            quantity_change,
            kind,
            MovementRef::adjustment(*request.adjustment_id.as_uuid()),
            request.created_by,
            request.occurred_at,
            request.notes.clone(),
        )?;

        let adjustment = Adjustment {
            id: request.adjustment_id,
            tenant_id: request.tenant_id,
            adjustment_number: request.adjustment_number,
            shop_id: request.shop_id,
            product_id: request.product_id,
            quantity_before,
            quantity_change,
            quantity_after: request.new_quantity,
            reason: request.reason,
            notes: request.notes,
            created_by: request.created_by,
            created_at: request.occurred_at,
        };

        Ok((adjustment, draft))
    }
}

impl Entity for Adjustment {
    type Id = AdjustmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    // Adjustments are written once and never transition.
    fn version(&self) -> u64 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopstock_ledger::ReferenceKind;

    fn request(new_quantity: i64, reason: AdjustmentReason) -> AdjustmentRequest {
        AdjustmentRequest {
            tenant_id: TenantId::new(),
            adjustment_id: AdjustmentId::new(),
            adjustment_number: "ADJ-0001".to_string(),
            shop_id: ShopId::new(),
            product_id: ProductId::new(),
            new_quantity,
            reason,
            notes: Some("broken in backroom".to_string()),
            created_by: UserId::new(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn damaged_stock_writes_outbound_movement() {
        let req = request(7, AdjustmentReason::Damaged);
        let (adjustment, draft) = Adjustment::prepare(req.clone(), 10).unwrap();

        assert_eq!(adjustment.quantity_before, 10);
        assert_eq!(adjustment.quantity_change, -3);
        assert_eq!(adjustment.quantity_after, 7);
        assert_eq!(draft.delta, -3);
        assert_eq!(draft.kind, MovementKind::AdjustmentOut);
        assert_eq!(draft.reference.kind, ReferenceKind::Adjustment);
        assert_eq!(draft.reference.id, *adjustment.id.as_uuid());
        assert_eq!(draft.notes, adjustment.notes);
    }

    #[test]
    fn found_stock_writes_inbound_movement() {
        let req = request(12, AdjustmentReason::Found);
        let (adjustment, draft) = Adjustment::prepare(req, 10).unwrap();

        assert_eq!(adjustment.quantity_change, 2);
        assert_eq!(draft.delta, 2);
        assert_eq!(draft.kind, MovementKind::AdjustmentIn);
    }

    #[test]
    fn unchanged_quantity_is_rejected() {
        let req = request(10, AdjustmentReason::Correction);
        let err = Adjustment::prepare(req, 10).unwrap_err();
        match err {
            AdjustmentError::NoOpAdjustment { quantity, .. } => assert_eq!(quantity, 10),
            other => panic!("expected NoOpAdjustment, got {other:?}"),
        }
    }

    #[test]
    fn negative_target_is_rejected() {
        let req = request(-1, AdjustmentReason::Correction);
        let err = Adjustment::prepare(req, 10).unwrap_err();
        assert!(matches!(
            err,
            AdjustmentError::NegativeTarget { requested: -1 }
        ));
    }
}
