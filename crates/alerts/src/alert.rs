//! Stock alert classification.

use serde::{Deserialize, Serialize};

use shopstock_core::{ProductId, ShopId};
use shopstock_ledger::StockLevel;

/// Alert severity for one position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Ok,
    Low,
    Critical,
    OutOfStock,
}

impl AlertLevel {
    /// Anything other than `Ok` needs operator attention.
    pub fn needs_attention(self) -> bool {
        !matches!(self, AlertLevel::Ok)
    }
}

/// Evaluated alert for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub minimum_threshold: i64,
    pub shortage: i64,
    pub level: AlertLevel,
}

/// Classify a quantity against its threshold.
///
/// An empty position is always out of stock. Below threshold, a position is
/// critical once it has fallen under half the threshold (integer comparison:
/// `2 * quantity < minimum_threshold`), low otherwise.
pub fn classify(quantity: i64, minimum_threshold: i64) -> AlertLevel {
    if quantity == 0 {
        return AlertLevel::OutOfStock;
    }
    if quantity >= minimum_threshold {
        return AlertLevel::Ok;
    }
    if 2 * quantity < minimum_threshold {
        AlertLevel::Critical
    } else {
        AlertLevel::Low
    }
}

/// Evaluate one stock level row.
pub fn evaluate(level: &StockLevel) -> StockAlert {
    StockAlert {
        shop_id: level.shop_id,
        product_id: level.product_id,
        quantity: level.quantity,
        minimum_threshold: level.minimum_threshold,
        shortage: level.shortage(),
        level: classify(level.quantity, level.minimum_threshold),
    }
}

/// Evaluate a set of stock level rows.
///
/// Always recomputed from current state: the view depends on quantities and
/// catalog thresholds that change independently, so nothing is maintained
/// incrementally.
pub fn evaluate_levels(levels: &[StockLevel]) -> Vec<StockAlert> {
    levels.iter().map(evaluate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shopstock_core::TenantId;

    fn level(quantity: i64, threshold: i64) -> StockLevel {
        let mut l = StockLevel::empty(
            TenantId::new(),
            ShopId::new(),
            ProductId::new(),
            threshold,
            Utc::now(),
        );
        l.quantity = quantity;
        l
    }

    #[test]
    fn classification_table() {
        let cases = [
            (0, 0, AlertLevel::OutOfStock),
            (0, 10, AlertLevel::OutOfStock),
            (1, 0, AlertLevel::Ok),
            (10, 10, AlertLevel::Ok),
            (11, 10, AlertLevel::Ok),
            // exactly half the threshold is low, not critical
            (5, 10, AlertLevel::Low),
            (9, 10, AlertLevel::Low),
            (4, 10, AlertLevel::Critical),
            (1, 3, AlertLevel::Critical),
            (1, 2, AlertLevel::Low),
        ];

        for (quantity, threshold, expected) in cases {
            assert_eq!(
                classify(quantity, threshold),
                expected,
                "quantity={quantity} threshold={threshold}"
            );
        }
    }

    #[test]
    fn evaluate_carries_shortage() {
        let alert = evaluate(&level(2, 10));
        assert_eq!(alert.shortage, 8);
        assert_eq!(alert.level, AlertLevel::Critical);
        assert!(alert.level.needs_attention());
    }

    #[test]
    fn ok_positions_need_no_attention() {
        let alert = evaluate(&level(12, 10));
        assert_eq!(alert.shortage, 0);
        assert!(!alert.level.needs_attention());
    }

    #[test]
    fn evaluates_every_row() {
        let rows = vec![level(0, 5), level(3, 5), level(8, 5)];
        let alerts = evaluate_levels(&rows);
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].level, AlertLevel::OutOfStock);
        assert_eq!(alerts[1].level, AlertLevel::Low);
        assert_eq!(alerts[2].level, AlertLevel::Ok);
    }
}
