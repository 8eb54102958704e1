//! Application services: the only writers of the stock ledger, plus the
//! read-only alert view. Every external caller goes through one of these —
//! never through a raw quantity update — so a ledger entry and its quantity
//! mutation are never produced independently.

pub mod adjustment;
pub mod alerts;
pub mod counting;
pub mod ledger;
pub mod transfer;

pub use adjustment::AdjustmentService;
pub use alerts::AlertService;
pub use counting::CountingService;
pub use ledger::{LedgerService, ProductQuantity};
pub use transfer::TransferService;
