//! Derived stock alerts: a read-only view over current stock levels and
//! catalog thresholds.

pub mod alert;

pub use alert::{AlertLevel, StockAlert, classify, evaluate, evaluate_levels};
