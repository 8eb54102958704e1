//! Stock ledger domain: movement kinds, drafts, committed entries, and
//! per-position stock levels.
//!
//! This crate contains business rules only, implemented as deterministic
//! domain logic (no IO, no storage). Stores that persist the ledger live in
//! `shopstock-infra`.

pub mod entry;
pub mod error;
pub mod level;
pub mod movement;

pub use entry::LedgerEntry;
pub use error::LedgerError;
pub use level::{StockLevel, checked_apply};
pub use movement::{MovementDraft, MovementKind, MovementRef, ReferenceKind};
