//! Alert evaluation over current stock.

use shopstock_alerts::{StockAlert, evaluate, evaluate_levels};
use shopstock_core::{ProductId, ShopId, TenantId};

use crate::stock_store::StockStore;

/// Read-only alert view: recomputed from current stock levels and catalog
/// thresholds on every call, never maintained incrementally.
#[derive(Debug)]
pub struct AlertService<S> {
    stock: S,
}

impl<S> AlertService<S> {
    pub fn new(stock: S) -> Self {
        Self { stock }
    }
}

impl<S: StockStore> AlertService<S> {
    /// Alert classification for every tracked position of a shop.
    pub fn shop_alerts(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<StockAlert> {
        evaluate_levels(&self.stock.levels_for_shop(tenant_id, shop_id))
    }

    /// Only the positions an operator needs to act on.
    pub fn actionable_alerts(&self, tenant_id: TenantId, shop_id: ShopId) -> Vec<StockAlert> {
        let mut alerts = self.shop_alerts(tenant_id, shop_id);
        alerts.retain(|a| a.level.needs_attention());
        alerts
    }

    /// Alert classification for one position, if it is tracked.
    pub fn product_alert(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
    ) -> Option<StockAlert> {
        self.stock
            .level(tenant_id, shop_id, product_id)
            .map(|level| evaluate(&level))
    }
}
