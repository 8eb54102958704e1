//! Ledger façade for external writers (POS sales, onboarding, imports).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use shopstock_core::{ProductId, ShopId, TenantId, UserId};
use shopstock_ledger::{
    LedgerEntry, LedgerError, MovementDraft, MovementKind, MovementRef, StockLevel,
};

use crate::stock_store::StockStore;

/// One product line of a sale or an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuantity {
    pub product_id: ProductId,
    /// Units moved; strictly positive.
    pub quantity: i64,
}

/// Entry point for callers that write the ledger directly rather than
/// through a workflow: sale completion, initial stock, bulk imports.
///
/// Every call is one atomic movement batch; on `InsufficientStock` a sale
/// must not be allowed to complete.
#[derive(Debug)]
pub struct LedgerService<S> {
    store: S,
}

impl<S> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: StockStore> LedgerService<S> {
    /// Record a completed sale: one negative movement per line sold,
    /// all-or-nothing across the sale.
    pub fn record_sale(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        sale_id: Uuid,
        lines: &[ProductQuantity],
        cashier: UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let drafts = lines
            .iter()
            .map(|line| {
                MovementDraft::new(
                    tenant_id,
                    shop_id,
                    line.product_id,
                    -line.quantity,
                    MovementKind::Sale,
                    MovementRef::sale(sale_id),
                    cashier,
                    at,
                    None,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries = self.store.apply_movements(drafts)?;
        info!(
            tenant_id = %tenant_id,
            shop_id = %shop_id,
            sale_id = %sale_id,
            lines = entries.len(),
            "sale recorded"
        );
        Ok(entries)
    }

    /// Record the first stock of a position.
    pub fn record_initial_stock(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        quantity: i64,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        let draft = MovementDraft::new(
            tenant_id,
            shop_id,
            product_id,
            quantity,
            MovementKind::Initial,
            // No originating document exists; the reference points at the
            // product itself.
            MovementRef::initial_stock(*product_id.as_uuid()),
            actor,
            at,
            None,
        )?;

        let entry = self.store.apply_movement(draft)?;
        info!(
            tenant_id = %tenant_id,
            shop_id = %shop_id,
            product_id = %product_id,
            quantity,
            "initial stock recorded"
        );
        Ok(entry)
    }

    /// Record an external bulk import: one positive movement per line,
    /// all-or-nothing across the import.
    pub fn record_import(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        import_id: Uuid,
        lines: &[ProductQuantity],
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let drafts = lines
            .iter()
            .map(|line| {
                MovementDraft::new(
                    tenant_id,
                    shop_id,
                    line.product_id,
                    line.quantity,
                    MovementKind::Import,
                    MovementRef::stock_import(import_id),
                    actor,
                    at,
                    None,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries = self.store.apply_movements(drafts)?;
        info!(
            tenant_id = %tenant_id,
            shop_id = %shop_id,
            import_id = %import_id,
            lines = entries.len(),
            "import recorded"
        );
        Ok(entries)
    }

    /// Catalog push of a product's reorder threshold at one shop.
    pub fn set_minimum_threshold(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        threshold: i64,
    ) -> Result<(), LedgerError> {
        self.store
            .set_minimum_threshold(tenant_id, shop_id, product_id, threshold)
    }

    /// Current quantity, defaulting to 0 for an untouched position.
    pub fn quantity(&self, tenant_id: TenantId, shop_id: ShopId, product_id: ProductId) -> i64 {
        self.store.quantity(tenant_id, shop_id, product_id)
    }

    pub fn level(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Option<StockLevel> {
        self.store.level(tenant_id, shop_id, product_id)
    }

    /// Full movement history of one position, oldest first.
    pub fn entries(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Vec<LedgerEntry> {
        self.store.entries(tenant_id, shop_id, product_id)
    }
}
