//! In-memory stock store.

use std::collections::HashMap;
use std::sync::RwLock;

use shopstock_core::{ProductId, ShopId, TenantId};
use shopstock_ledger::{LedgerEntry, LedgerError, MovementDraft, StockLevel, checked_apply};

use super::r#trait::{PositionView, StockStore};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PositionKey {
    tenant_id: TenantId,
    shop_id: ShopId,
    product_id: ProductId,
}

impl PositionKey {
    fn of(draft: &MovementDraft) -> Self {
        Self {
            tenant_id: draft.tenant_id,
            shop_id: draft.shop_id,
            product_id: draft.product_id,
        }
    }
}

#[derive(Debug, Clone)]
struct Position {
    level: StockLevel,
    entries: Vec<LedgerEntry>,
}

impl Position {
    fn last_sequence(&self) -> u64 {
        self.entries.last().map(|e| e.sequence).unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct Inner {
    positions: HashMap<PositionKey, Position>,
    /// Thresholds pushed before a position's first movement are parked here
    /// and picked up when the position row is created.
    thresholds: HashMap<PositionKey, i64>,
}

/// In-memory stock store.
///
/// Intended for tests/dev. Every write batch runs under one write guard, so
/// the precondition re-check and both effects (entry append + quantity
/// update) are a single atomic step.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    inner: RwLock<Inner>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_locked(
        inner: &mut Inner,
        drafts: Vec<MovementDraft>,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        // All drafts must belong to one tenant.
        let tenant_id = drafts[0].tenant_id;
        for draft in &drafts {
            if draft.tenant_id != tenant_id {
                return Err(LedgerError::TenantMismatch);
            }
            // Drafts are validated at construction; re-check here so a
            // hand-built draft cannot bypass the discipline.
            if draft.delta == 0 || !draft.kind.admits_delta(draft.delta) {
                return Err(LedgerError::InvalidMovement(format!(
                    "movement kind '{}' does not admit delta {}",
                    draft.kind, draft.delta
                )));
            }
        }

        // First pass: check every precondition against projected quantities,
        // accumulating within the batch, before any effect is applied.
        let mut projected: HashMap<PositionKey, i64> = HashMap::new();
        for draft in &drafts {
            let key = PositionKey::of(draft);
            let current = projected.get(&key).copied().unwrap_or_else(|| {
                inner
                    .positions
                    .get(&key)
                    .map(|p| p.level.quantity)
                    .unwrap_or(0)
            });
            let next = checked_apply(draft.shop_id, draft.product_id, current, draft.delta)?;
            projected.insert(key, next);
        }

        // Second pass: commit. Nothing below can fail.
        let mut committed = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let key = PositionKey::of(&draft);
            let threshold = inner.thresholds.get(&key).copied().unwrap_or(0);
            let position = inner.positions.entry(key).or_insert_with(|| Position {
                level: StockLevel::empty(
                    draft.tenant_id,
                    draft.shop_id,
                    draft.product_id,
                    threshold,
                    draft.occurred_at,
                ),
                entries: Vec::new(),
            });

            let sequence = position.last_sequence() + 1;
            let occurred_at = draft.occurred_at;
            let delta = draft.delta;
            let entry = LedgerEntry::from_draft(draft, sequence);
            position.entries.push(entry.clone());
            position.level.apply(delta, occurred_at);
            committed.push(entry);
        }

        Ok(committed)
    }
}

impl StockStore for InMemoryStockStore {
    fn apply_movements(
        &self,
        drafts: Vec<MovementDraft>,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        if drafts.is_empty() {
            return Ok(vec![]);
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::WriteFailed("lock poisoned".to_string()))?;

        Self::apply_locked(&mut inner, drafts)
    }

    fn apply_movement_guarded(
        &self,
        draft: MovementDraft,
        expected_sequence: u64,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::WriteFailed("lock poisoned".to_string()))?;

        let found = inner
            .positions
            .get(&PositionKey::of(&draft))
            .map(|p| p.last_sequence())
            .unwrap_or(0);
        if found != expected_sequence {
            return Err(LedgerError::SequenceConflict {
                expected: expected_sequence,
                found,
            });
        }

        let mut entries = Self::apply_locked(&mut inner, vec![draft])?;
        entries
            .pop()
            .ok_or_else(|| LedgerError::WriteFailed("guarded apply returned no entry".to_string()))
    }

    fn position(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> PositionView {
        let key = PositionKey { tenant_id, shop_id, product_id };
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(_) => return PositionView { quantity: 0, sequence: 0 },
        };

        inner
            .positions
            .get(&key)
            .map(|p| PositionView {
                quantity: p.level.quantity,
                sequence: p.last_sequence(),
            })
            .unwrap_or(PositionView { quantity: 0, sequence: 0 })
    }

    fn level(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Option<StockLevel> {
        let key = PositionKey { tenant_id, shop_id, product_id };
        let inner = self.inner.read().ok()?;
        inner.positions.get(&key).map(|p| p.level.clone())
    }

    fn levels_for_shop(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<StockLevel> {
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(_) => return vec![],
        };

        let mut levels: Vec<_> = inner
            .positions
            .iter()
            .filter(|(key, _)| key.tenant_id == tenant_id && key.shop_id == shop_id)
            .map(|(_, p)| p.level.clone())
            .collect();
        // Deterministic listing order.
        levels.sort_by_key(|l| *l.product_id.as_uuid().as_bytes());
        levels
    }

    fn entries(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Vec<LedgerEntry> {
        let key = PositionKey { tenant_id, shop_id, product_id };
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(_) => return vec![],
        };
        inner
            .positions
            .get(&key)
            .map(|p| p.entries.clone())
            .unwrap_or_default()
    }

    fn entries_for_shop(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<LedgerEntry> {
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(_) => return vec![],
        };

        let mut entries: Vec<_> = inner
            .positions
            .iter()
            .filter(|(key, _)| key.tenant_id == tenant_id && key.shop_id == shop_id)
            .flat_map(|(_, p)| p.entries.iter().cloned())
            .collect();
        entries.sort_by_key(|e| (*e.product_id.as_uuid().as_bytes(), e.sequence));
        entries
    }

    fn set_minimum_threshold(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        threshold: i64,
    ) -> Result<(), LedgerError> {
        if threshold < 0 {
            return Err(LedgerError::NegativeThreshold { threshold });
        }

        let key = PositionKey { tenant_id, shop_id, product_id };
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::WriteFailed("lock poisoned".to_string()))?;

        inner.thresholds.insert(key, threshold);
        if let Some(position) = inner.positions.get_mut(&key) {
            position.level.minimum_threshold = threshold;
        }
        Ok(())
    }
}
