//! Physical inventory reconciliation domain: count sessions that freeze
//! expected quantities, collect counted quantities, and reconcile recorded
//! stock against the physical count.

pub mod error;
pub mod session;

pub use error::CountingError;
pub use session::{
    CountLine, CountSession, SessionAction, SessionId, SessionStatus, UncountedLinePolicy,
};
