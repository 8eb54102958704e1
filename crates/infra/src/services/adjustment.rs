//! Manual adjustment orchestration.

use tracing::info;

use shopstock_adjustment::{Adjustment, AdjustmentError, AdjustmentRequest};
use shopstock_core::TenantId;
use shopstock_ledger::LedgerError;

use crate::entity_store::EntityStore;
use crate::stock_store::StockStore;

/// How often a stale position read is retried before giving up.
const MAX_ATTEMPTS: usize = 8;

/// Applies absolute-quantity overrides as read-derive-write cycles.
///
/// The change is derived from the quantity read together with the position's
/// ledger sequence; the guarded apply rejects the write if the position
/// moved in between, and the service re-reads and re-derives. This keeps the
/// recorded before/after pair truthful even under concurrent sales.
#[derive(Debug)]
pub struct AdjustmentService<S, R> {
    stock: S,
    adjustments: R,
}

impl<S, R> AdjustmentService<S, R> {
    pub fn new(stock: S, adjustments: R) -> Self {
        Self { stock, adjustments }
    }
}

impl<S, R> AdjustmentService<S, R>
where
    S: StockStore,
    R: EntityStore<Adjustment>,
{
    /// Set a position to an absolute quantity, recording the audited
    /// adjustment and its paired ledger movement.
    pub fn adjust(&self, request: AdjustmentRequest) -> Result<Adjustment, AdjustmentError> {
        let mut attempts = 0;
        loop {
            let view =
                self.stock
                    .position(request.tenant_id, request.shop_id, request.product_id);
            let (adjustment, draft) = Adjustment::prepare(request.clone(), view.quantity)?;

            match self.stock.apply_movement_guarded(draft, view.sequence) {
                Ok(_) => {
                    self.adjustments
                        .insert(request.tenant_id, adjustment.clone())?;
                    info!(
                        tenant_id = %request.tenant_id,
                        adjustment_id = %adjustment.id,
                        adjustment_number = adjustment.adjustment_number.as_str(),
                        shop_id = %adjustment.shop_id,
                        product_id = %adjustment.product_id,
                        quantity_change = adjustment.quantity_change,
                        reason = ?adjustment.reason,
                        "stock adjusted"
                    );
                    return Ok(adjustment);
                }
                Err(LedgerError::SequenceConflict { .. }) if attempts < MAX_ATTEMPTS => {
                    attempts += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn list(&self, tenant_id: TenantId) -> Vec<Adjustment> {
        self.adjustments.list(tenant_id)
    }
}
