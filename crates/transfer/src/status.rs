//! Transfer lifecycle: statuses, actions, and the transition table.

use serde::{Deserialize, Serialize};

/// Transfer workflow status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    InTransit,
    Completed,
    Cancelled,
}

/// Operator action against a transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferAction {
    Approve,
    Ship,
    Receive,
    Cancel,
}

impl TransferStatus {
    /// The one transition table.
    ///
    /// Every action is validated here, never by per-action status checks, so
    /// an illegal transition is rejected by a single shared guard. `None`
    /// means the action is not legal from this status.
    pub fn transition(self, action: TransferAction) -> Option<TransferStatus> {
        use TransferAction::*;
        use TransferStatus::*;

        match (self, action) {
            (Pending, Approve) => Some(Approved),
            (Approved, Ship) => Some(InTransit),
            (InTransit, Receive) => Some(Completed),
            // Once shipped, goods are committed and must be received.
            (Pending, Cancel) | (Approved, Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled transfers have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Approved => "approved",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TransferAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferAction::Approve => "approve",
            TransferAction::Ship => "ship",
            TransferAction::Receive => "receive",
            TransferAction::Cancel => "cancel",
        }
    }
}

impl core::fmt::Display for TransferAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
