//! Stock store contract.

use std::sync::Arc;

use shopstock_core::{ProductId, ShopId, TenantId};
use shopstock_ledger::{LedgerEntry, LedgerError, MovementDraft, StockLevel};

/// Atomic snapshot of one position for optimistic read-derive-write callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PositionView {
    /// Current on-hand quantity (0 when the position has never had stock).
    pub quantity: i64,
    /// Last assigned ledger sequence for the position (0 when empty).
    pub sequence: u64,
}

/// Authoritative store for stock levels and their append-only ledger.
///
/// The store owns the subsystem's core consistency contract: for every
/// (tenant, shop, product) position, the sum of ledger entry deltas equals
/// the stored quantity at all times, and the quantity never goes negative.
///
/// ## Apply semantics
///
/// `apply_movements`:
/// - re-reads every touched position inside the write transaction
/// - checks the non-negative precondition, including accumulation when two
///   drafts in the batch touch the same position
/// - appends entries with per-position monotonic sequence numbers and
///   updates quantities, all-or-nothing across the batch
///
/// Two concurrent decrements against one position either serialize or one
/// observably fails with `InsufficientStock`; lost updates cannot happen.
///
/// ## Implementation requirements
///
/// Implementations must reject batches mixing tenants, must assign sequence
/// numbers monotonically without gaps, and must leave no partial effect on
/// any failure. A timed-out or poisoned write is reported as `WriteFailed`
/// and must be treated by callers as not applied.
pub trait StockStore: Send + Sync {
    /// Apply a batch of movements as one atomic transaction.
    fn apply_movements(&self, drafts: Vec<MovementDraft>)
    -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Apply a single movement only if the position has not moved since the
    /// caller read `expected_sequence` (see [`StockStore::position`]).
    ///
    /// Fails with `SequenceConflict` on a stale read; the caller re-reads
    /// and re-derives its movement.
    fn apply_movement_guarded(
        &self,
        draft: MovementDraft,
        expected_sequence: u64,
    ) -> Result<LedgerEntry, LedgerError>;

    /// Atomically read quantity + last sequence for one position.
    fn position(&self, tenant_id: TenantId, shop_id: ShopId, product_id: ProductId)
    -> PositionView;

    /// Current stock level row, if the position has ever been touched.
    fn level(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Option<StockLevel>;

    /// All tracked stock level rows of a shop, ordered by product id.
    fn levels_for_shop(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<StockLevel>;

    /// Full ledger history of one position, in sequence order.
    fn entries(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Vec<LedgerEntry>;

    /// Ledger history across a shop, ordered by product id then sequence.
    fn entries_for_shop(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<LedgerEntry>;

    /// Upsert the catalog-supplied minimum threshold for a position.
    ///
    /// Touches neither quantity nor ledger.
    fn set_minimum_threshold(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        threshold: i64,
    ) -> Result<(), LedgerError>;

    /// Apply a single movement (delegates to the batch form).
    fn apply_movement(&self, draft: MovementDraft) -> Result<LedgerEntry, LedgerError> {
        let mut entries = self.apply_movements(vec![draft])?;
        entries
            .pop()
            .ok_or_else(|| LedgerError::WriteFailed("batch apply returned no entry".to_string()))
    }

    /// Current quantity, defaulting to 0 for an untouched position.
    fn quantity(&self, tenant_id: TenantId, shop_id: ShopId, product_id: ProductId) -> i64 {
        self.position(tenant_id, shop_id, product_id).quantity
    }
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn apply_movements(
        &self,
        drafts: Vec<MovementDraft>,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        (**self).apply_movements(drafts)
    }

    fn apply_movement_guarded(
        &self,
        draft: MovementDraft,
        expected_sequence: u64,
    ) -> Result<LedgerEntry, LedgerError> {
        (**self).apply_movement_guarded(draft, expected_sequence)
    }

    fn position(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> PositionView {
        (**self).position(tenant_id, shop_id, product_id)
    }

    fn level(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Option<StockLevel> {
        (**self).level(tenant_id, shop_id, product_id)
    }

    fn levels_for_shop(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<StockLevel> {
        (**self).levels_for_shop(tenant_id, shop_id)
    }

    fn entries(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Vec<LedgerEntry> {
        (**self).entries(tenant_id, shop_id, product_id)
    }

    fn entries_for_shop(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<LedgerEntry> {
        (**self).entries_for_shop(tenant_id, shop_id)
    }

    fn set_minimum_threshold(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        threshold: i64,
    ) -> Result<(), LedgerError> {
        (**self).set_minimum_threshold(tenant_id, shop_id, product_id, threshold)
    }
}
