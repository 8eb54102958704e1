//! Movement kinds, references, and uncommitted movement drafts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopstock_core::{ProductId, ShopId, TenantId, UserId};

use crate::error::LedgerError;

/// Why a ledger entry was created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Initial,
    Sale,
    AdjustmentIn,
    AdjustmentOut,
    TransferOut,
    TransferIn,
    CountReconcile,
    Import,
}

impl MovementKind {
    /// Stable tag for logs and persisted payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Initial => "initial",
            MovementKind::Sale => "sale",
            MovementKind::AdjustmentIn => "adjustment_in",
            MovementKind::AdjustmentOut => "adjustment_out",
            MovementKind::TransferOut => "transfer_out",
            MovementKind::TransferIn => "transfer_in",
            MovementKind::CountReconcile => "count_reconcile",
            MovementKind::Import => "import",
        }
    }

    /// Sign discipline: which deltas a kind admits.
    ///
    /// Inbound kinds carry strictly positive deltas, outbound kinds strictly
    /// negative ones; a count reconciliation can move either way but never by
    /// zero.
    pub fn admits_delta(self, delta: i64) -> bool {
        match self {
            MovementKind::Initial
            | MovementKind::Import
            | MovementKind::TransferIn
            | MovementKind::AdjustmentIn => delta > 0,
            MovementKind::Sale | MovementKind::TransferOut | MovementKind::AdjustmentOut => {
                delta < 0
            }
            MovementKind::CountReconcile => delta != 0,
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of record a ledger entry points back at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Sale,
    Transfer,
    Adjustment,
    CountSession,
    StockImport,
    InitialStock,
}

/// Typed pointer to the originating record of a movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRef {
    pub kind: ReferenceKind,
    pub id: Uuid,
}

impl MovementRef {
    pub fn sale(id: Uuid) -> Self {
        Self { kind: ReferenceKind::Sale, id }
    }

    pub fn transfer(id: Uuid) -> Self {
        Self { kind: ReferenceKind::Transfer, id }
    }

    pub fn adjustment(id: Uuid) -> Self {
        Self { kind: ReferenceKind::Adjustment, id }
    }

    pub fn count_session(id: Uuid) -> Self {
        Self { kind: ReferenceKind::CountSession, id }
    }

    pub fn stock_import(id: Uuid) -> Self {
        Self { kind: ReferenceKind::StockImport, id }
    }

    pub fn initial_stock(id: Uuid) -> Self {
        Self { kind: ReferenceKind::InitialStock, id }
    }
}

/// A movement that has not yet been committed to the ledger.
///
/// Drafts are validated at construction (nonzero delta, sign discipline) and
/// carry everything a ledger entry needs except the sequence number, which
/// the store assigns during apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub entry_id: Uuid,
    pub tenant_id: TenantId,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub delta: i64,
    pub kind: MovementKind,
    pub reference: MovementRef,
    pub created_by: UserId,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl MovementDraft {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        delta: i64,
        kind: MovementKind,
        reference: MovementRef,
        created_by: UserId,
        occurred_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Self, LedgerError> {
        if delta == 0 {
            return Err(LedgerError::InvalidMovement(
                "delta cannot be zero".to_string(),
            ));
        }
        if !kind.admits_delta(delta) {
            return Err(LedgerError::InvalidMovement(format!(
                "movement kind '{kind}' does not admit delta {delta}"
            )));
        }

        Ok(Self {
            entry_id: Uuid::now_v7(),
            tenant_id,
            shop_id,
            product_id,
            delta,
            kind,
            reference,
            created_by,
            occurred_at,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(delta: i64, kind: MovementKind) -> Result<MovementDraft, LedgerError> {
        MovementDraft::new(
            TenantId::new(),
            ShopId::new(),
            ProductId::new(),
            delta,
            kind,
            MovementRef::sale(Uuid::now_v7()),
            UserId::new(),
            Utc::now(),
            None,
        )
    }

    #[test]
    fn sign_discipline_per_kind() {
        let cases = [
            (MovementKind::Initial, 5, true),
            (MovementKind::Initial, -5, false),
            (MovementKind::Import, 5, true),
            (MovementKind::Import, -5, false),
            (MovementKind::TransferIn, 5, true),
            (MovementKind::TransferIn, -5, false),
            (MovementKind::AdjustmentIn, 5, true),
            (MovementKind::AdjustmentIn, -5, false),
            (MovementKind::Sale, -5, true),
            (MovementKind::Sale, 5, false),
            (MovementKind::TransferOut, -5, true),
            (MovementKind::TransferOut, 5, false),
            (MovementKind::AdjustmentOut, -5, true),
            (MovementKind::AdjustmentOut, 5, false),
            (MovementKind::CountReconcile, -5, true),
            (MovementKind::CountReconcile, 5, true),
        ];

        for (kind, delta, admitted) in cases {
            assert_eq!(
                kind.admits_delta(delta),
                admitted,
                "kind {kind} delta {delta}"
            );
        }
    }

    #[test]
    fn zero_delta_is_never_admitted() {
        for kind in [
            MovementKind::Initial,
            MovementKind::Sale,
            MovementKind::AdjustmentIn,
            MovementKind::AdjustmentOut,
            MovementKind::TransferOut,
            MovementKind::TransferIn,
            MovementKind::CountReconcile,
            MovementKind::Import,
        ] {
            assert!(!kind.admits_delta(0), "kind {kind} admitted zero");
        }
    }

    #[test]
    fn draft_rejects_zero_delta() {
        let err = draft(0, MovementKind::CountReconcile).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidMovement(_)));
    }

    #[test]
    fn draft_rejects_sign_violations() {
        let err = draft(3, MovementKind::Sale).unwrap_err();
        match err {
            LedgerError::InvalidMovement(msg) => assert!(msg.contains("sale")),
            other => panic!("expected InvalidMovement, got {other:?}"),
        }
    }

    #[test]
    fn draft_accepts_well_formed_movements() {
        let d = draft(-2, MovementKind::Sale).unwrap();
        assert_eq!(d.delta, -2);
        assert_eq!(d.kind, MovementKind::Sale);
    }

    #[test]
    fn kind_serializes_with_stable_tags() {
        let json = serde_json::to_string(&MovementKind::CountReconcile).unwrap();
        assert_eq!(json, "\"count_reconcile\"");
        let json = serde_json::to_string(&MovementKind::TransferOut).unwrap();
        assert_eq!(json, "\"transfer_out\"");
    }
}
