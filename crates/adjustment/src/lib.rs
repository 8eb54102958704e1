//! Manual adjustment domain: audited absolute-quantity overrides, each
//! paired with exactly one ledger movement.

pub mod adjustment;
pub mod error;

pub use adjustment::{Adjustment, AdjustmentId, AdjustmentReason, AdjustmentRequest};
pub use error::AdjustmentError;
