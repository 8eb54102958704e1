//! Stock storage: the authoritative quantity per position plus its
//! append-only movement ledger, behind a store trait.

mod in_memory;
mod r#trait;

pub use in_memory::InMemoryStockStore;
pub use r#trait::{PositionView, StockStore};
