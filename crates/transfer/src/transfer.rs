//! Transfer workflow: moving product quantities between two shops through an
//! explicit sequence of states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopstock_core::{Entity, ProductId, ShopId, TenantId, UserId};
use shopstock_ledger::{MovementDraft, MovementKind, MovementRef};

use crate::error::TransferError;
use crate::status::{TransferAction, TransferStatus};

/// Transfer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TransferId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One product line of a transfer.
///
/// Owned by its parent transfer; shipped and received quantities stay unset
/// until the corresponding workflow step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLine {
    pub product_id: ProductId,
    pub quantity_requested: i64,
    pub quantity_shipped: Option<i64>,
    pub quantity_received: Option<i64>,
}

/// Requested line of a new transfer proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Command: propose a new transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub tenant_id: TenantId,
    pub transfer_id: TransferId,
    /// Opaque human-readable number from the external allocator.
    pub transfer_number: String,
    pub from_shop_id: ShopId,
    pub to_shop_id: ShopId,
    pub lines: Vec<RequestedLine>,
    pub requested_by: UserId,
    pub requested_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A transfer of product quantities from a source shop to a destination shop.
///
/// Created as a pending proposal; no stock is reserved or moved until the
/// shipping step. The shipping shop's stock is decremented exactly when it
/// physically loses the goods and the receiving shop's is incremented exactly
/// when it physically gains them; the gap between the two is the
/// `InTransit` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    id: TransferId,
    tenant_id: TenantId,
    transfer_number: String,
    from_shop_id: ShopId,
    to_shop_id: ShopId,
    status: TransferStatus,
    lines: Vec<TransferLine>,
    requested_by: UserId,
    requested_at: DateTime<Utc>,
    approved_by: Option<UserId>,
    approved_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    received_by: Option<UserId>,
    received_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    version: u64,
}

impl Transfer {
    /// Create a pending transfer proposal.
    pub fn create(request: TransferRequest) -> Result<Self, TransferError> {
        if request.from_shop_id == request.to_shop_id {
            return Err(TransferError::SameShop {
                shop_id: request.from_shop_id,
            });
        }
        if request.lines.is_empty() {
            return Err(TransferError::EmptyLines);
        }
        for line in &request.lines {
            if line.quantity <= 0 {
                return Err(TransferError::NonPositiveQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }
        }

        let lines = request
            .lines
            .into_iter()
            .map(|l| TransferLine {
                product_id: l.product_id,
                quantity_requested: l.quantity,
                quantity_shipped: None,
                quantity_received: None,
            })
            .collect();

        Ok(Self {
            id: request.transfer_id,
            tenant_id: request.tenant_id,
            transfer_number: request.transfer_number,
            from_shop_id: request.from_shop_id,
            to_shop_id: request.to_shop_id,
            status: TransferStatus::Pending,
            lines,
            requested_by: request.requested_by,
            requested_at: request.requested_at,
            approved_by: None,
            approved_at: None,
            shipped_at: None,
            received_by: None,
            received_at: None,
            notes: request.notes,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> TransferId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn transfer_number(&self) -> &str {
        &self.transfer_number
    }

    pub fn from_shop_id(&self) -> ShopId {
        self.from_shop_id
    }

    pub fn to_shop_id(&self) -> ShopId {
        self.to_shop_id
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn lines(&self) -> &[TransferLine] {
        &self.lines
    }

    pub fn requested_by(&self) -> UserId {
        self.requested_by
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn received_by(&self) -> Option<UserId> {
        self.received_by
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Run an action through the transition table.
    fn advance(&mut self, action: TransferAction) -> Result<(), TransferError> {
        let next = self
            .status
            .transition(action)
            .ok_or(TransferError::InvalidTransition {
                status: self.status,
                action,
            })?;
        self.status = next;
        self.version += 1;
        Ok(())
    }

    /// Approve the proposal. No ledger effect.
    pub fn approve(&mut self, approved_by: UserId, at: DateTime<Utc>) -> Result<(), TransferError> {
        self.advance(TransferAction::Approve)?;
        self.approved_by = Some(approved_by);
        self.approved_at = Some(at);
        Ok(())
    }

    /// Ship all lines from the source shop.
    ///
    /// Commits every line's shipped quantity to its requested quantity and
    /// returns one outbound draft per line. The caller must apply the drafts
    /// as a single atomic batch: if any line would drive source stock
    /// negative the whole shipment fails and no line may take effect.
    pub fn ship(
        &mut self,
        shipped_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<MovementDraft>, TransferError> {
        self.advance(TransferAction::Ship)?;
        self.shipped_at = Some(at);

        let mut drafts = Vec::with_capacity(self.lines.len());
        for line in &mut self.lines {
            line.quantity_shipped = Some(line.quantity_requested);
            drafts.push(MovementDraft::new(
                self.tenant_id,
                self.from_shop_id,
                line.product_id,
                -line.quantity_requested,
                MovementKind::TransferOut,
                MovementRef::transfer(self.id.0),
                shipped_by,
                at,
                None,
            )?);
        }
        Ok(drafts)
    }

    /// Receive all lines at the destination shop. Terminal.
    ///
    /// Received quantities equal shipped quantities (no in-transit loss is
    /// modelled); returns one inbound draft per line, to be applied as a
    /// single atomic batch.
    pub fn receive(
        &mut self,
        received_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<MovementDraft>, TransferError> {
        self.advance(TransferAction::Receive)?;
        self.received_by = Some(received_by);
        self.received_at = Some(at);

        let mut drafts = Vec::with_capacity(self.lines.len());
        for line in &mut self.lines {
            // ship() sets quantity_shipped on every line before InTransit is
            // reachable, so the fallback never fires in practice.
            let shipped = line.quantity_shipped.unwrap_or(line.quantity_requested);
            line.quantity_received = Some(shipped);
            drafts.push(MovementDraft::new(
                self.tenant_id,
                self.to_shop_id,
                line.product_id,
                shipped,
                MovementKind::TransferIn,
                MovementRef::transfer(self.id.0),
                received_by,
                at,
                None,
            )?);
        }
        Ok(drafts)
    }

    /// Cancel a transfer that has not shipped yet. Terminal, no ledger effect.
    pub fn cancel(&mut self) -> Result<(), TransferError> {
        self.advance(TransferAction::Cancel)
    }

    /// Roll a failed shipping attempt back to approved.
    ///
    /// Compensation for the case where the shipment's movement batch was
    /// rejected by the ledger (goods never left the shelf): clears per-line
    /// shipped quantities and the shipped timestamp. Not an operator action
    /// and not part of the transition table.
    pub fn abort_shipping(&mut self) -> Result<(), TransferError> {
        if self.status != TransferStatus::InTransit {
            return Err(TransferError::InvalidTransition {
                status: self.status,
                action: TransferAction::Ship,
            });
        }
        self.status = TransferStatus::Approved;
        self.shipped_at = None;
        for line in &mut self.lines {
            line.quantity_shipped = None;
        }
        self.version += 1;
        Ok(())
    }

    /// Roll a failed receipt attempt back to in-transit.
    ///
    /// Counterpart of [`Transfer::abort_shipping`] for the receive step.
    pub fn abort_receipt(&mut self) -> Result<(), TransferError> {
        if self.status != TransferStatus::Completed {
            return Err(TransferError::InvalidTransition {
                status: self.status,
                action: TransferAction::Receive,
            });
        }
        self.status = TransferStatus::InTransit;
        self.received_by = None;
        self.received_at = None;
        for line in &mut self.lines {
            line.quantity_received = None;
        }
        self.version += 1;
        Ok(())
    }
}

impl Entity for Transfer {
    type Id = TransferId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(lines: Vec<RequestedLine>) -> TransferRequest {
        TransferRequest {
            tenant_id: TenantId::new(),
            transfer_id: TransferId::new(),
            transfer_number: "TRF-0001".to_string(),
            from_shop_id: ShopId::new(),
            to_shop_id: ShopId::new(),
            lines,
            requested_by: UserId::new(),
            requested_at: Utc::now(),
            notes: None,
        }
    }

    fn one_line(quantity: i64) -> Vec<RequestedLine> {
        vec![RequestedLine {
            product_id: ProductId::new(),
            quantity,
        }]
    }

    #[test]
    fn create_starts_pending_with_unset_line_quantities() {
        let transfer = Transfer::create(request(one_line(5))).unwrap();
        assert_eq!(transfer.status(), TransferStatus::Pending);
        assert_eq!(transfer.version(), 1);
        assert_eq!(transfer.lines().len(), 1);
        assert_eq!(transfer.lines()[0].quantity_requested, 5);
        assert_eq!(transfer.lines()[0].quantity_shipped, None);
        assert_eq!(transfer.lines()[0].quantity_received, None);
    }

    #[test]
    fn create_rejects_same_shop() {
        let mut req = request(one_line(5));
        req.to_shop_id = req.from_shop_id;
        let err = Transfer::create(req).unwrap_err();
        assert!(matches!(err, TransferError::SameShop { .. }));
    }

    #[test]
    fn create_rejects_empty_lines() {
        let err = Transfer::create(request(vec![])).unwrap_err();
        assert!(matches!(err, TransferError::EmptyLines));
    }

    #[test]
    fn create_rejects_non_positive_quantities() {
        let err = Transfer::create(request(one_line(0))).unwrap_err();
        assert!(matches!(
            err,
            TransferError::NonPositiveQuantity { quantity: 0, .. }
        ));
    }

    #[test]
    fn ship_emits_one_outbound_draft_per_line() {
        let product_a = ProductId::new();
        let product_b = ProductId::new();
        let mut req = request(vec![
            RequestedLine { product_id: product_a, quantity: 5 },
            RequestedLine { product_id: product_b, quantity: 2 },
        ]);
        let from_shop = req.from_shop_id;
        req.notes = Some("restock downtown".to_string());

        let mut transfer = Transfer::create(req).unwrap();
        let approver = UserId::new();
        transfer.approve(approver, Utc::now()).unwrap();
        assert_eq!(transfer.approved_by(), Some(approver));

        let drafts = transfer.ship(UserId::new(), Utc::now()).unwrap();
        assert_eq!(transfer.status(), TransferStatus::InTransit);
        assert!(transfer.shipped_at().is_some());
        assert_eq!(drafts.len(), 2);
        for (draft, line) in drafts.iter().zip(transfer.lines()) {
            assert_eq!(line.quantity_shipped, Some(line.quantity_requested));
            assert_eq!(draft.shop_id, from_shop);
            assert_eq!(draft.delta, -line.quantity_requested);
            assert_eq!(draft.kind, MovementKind::TransferOut);
            assert_eq!(draft.reference.id, *transfer.id_typed().as_uuid());
        }
    }

    #[test]
    fn receive_mirrors_shipped_quantities_at_destination() {
        let mut transfer = Transfer::create(request(one_line(5))).unwrap();
        let to_shop = transfer.to_shop_id();
        transfer.approve(UserId::new(), Utc::now()).unwrap();
        transfer.ship(UserId::new(), Utc::now()).unwrap();

        let receiver = UserId::new();
        let drafts = transfer.receive(receiver, Utc::now()).unwrap();
        assert_eq!(transfer.status(), TransferStatus::Completed);
        assert_eq!(transfer.received_by(), Some(receiver));
        assert_eq!(transfer.lines()[0].quantity_received, Some(5));
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].shop_id, to_shop);
        assert_eq!(drafts[0].delta, 5);
        assert_eq!(drafts[0].kind, MovementKind::TransferIn);
    }

    #[test]
    fn shipped_and_received_deltas_cancel_out_per_line() {
        let mut transfer = Transfer::create(request(vec![
            RequestedLine { product_id: ProductId::new(), quantity: 5 },
            RequestedLine { product_id: ProductId::new(), quantity: 3 },
        ]))
        .unwrap();
        transfer.approve(UserId::new(), Utc::now()).unwrap();
        let out = transfer.ship(UserId::new(), Utc::now()).unwrap();
        let inn = transfer.receive(UserId::new(), Utc::now()).unwrap();

        for (o, i) in out.iter().zip(&inn) {
            assert_eq!(o.product_id, i.product_id);
            assert_eq!(o.delta, -i.delta);
        }
    }

    #[test]
    fn ship_requires_approval_first() {
        let mut transfer = Transfer::create(request(one_line(5))).unwrap();
        let err = transfer.ship(UserId::new(), Utc::now()).unwrap_err();
        match err {
            TransferError::InvalidTransition { status, action } => {
                assert_eq!(status, TransferStatus::Pending);
                assert_eq!(action, TransferAction::Ship);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(transfer.status(), TransferStatus::Pending);
    }

    #[test]
    fn cancel_is_allowed_until_shipped() {
        let mut pending = Transfer::create(request(one_line(5))).unwrap();
        pending.cancel().unwrap();
        assert_eq!(pending.status(), TransferStatus::Cancelled);

        let mut approved = Transfer::create(request(one_line(5))).unwrap();
        approved.approve(UserId::new(), Utc::now()).unwrap();
        approved.cancel().unwrap();
        assert_eq!(approved.status(), TransferStatus::Cancelled);

        let mut shipped = Transfer::create(request(one_line(5))).unwrap();
        shipped.approve(UserId::new(), Utc::now()).unwrap();
        shipped.ship(UserId::new(), Utc::now()).unwrap();
        let err = shipped.cancel().unwrap_err();
        assert!(matches!(err, TransferError::InvalidTransition { .. }));
        assert_eq!(shipped.status(), TransferStatus::InTransit);
    }

    #[test]
    fn abort_shipping_restores_the_approved_state() {
        let mut transfer = Transfer::create(request(one_line(5))).unwrap();
        transfer.approve(UserId::new(), Utc::now()).unwrap();
        transfer.ship(UserId::new(), Utc::now()).unwrap();
        let shipped_version = transfer.version();

        transfer.abort_shipping().unwrap();
        assert_eq!(transfer.status(), TransferStatus::Approved);
        assert_eq!(transfer.shipped_at(), None);
        assert_eq!(transfer.lines()[0].quantity_shipped, None);
        assert_eq!(transfer.version(), shipped_version + 1);

        // and the shipment can be retried
        transfer.ship(UserId::new(), Utc::now()).unwrap();
        assert_eq!(transfer.status(), TransferStatus::InTransit);
    }

    #[test]
    fn abort_shipping_requires_in_transit() {
        let mut transfer = Transfer::create(request(one_line(5))).unwrap();
        assert!(transfer.abort_shipping().is_err());
    }

    #[test]
    fn abort_receipt_restores_the_in_transit_state() {
        let mut transfer = Transfer::create(request(one_line(5))).unwrap();
        transfer.approve(UserId::new(), Utc::now()).unwrap();
        transfer.ship(UserId::new(), Utc::now()).unwrap();
        transfer.receive(UserId::new(), Utc::now()).unwrap();

        transfer.abort_receipt().unwrap();
        assert_eq!(transfer.status(), TransferStatus::InTransit);
        assert_eq!(transfer.received_by(), None);
        assert_eq!(transfer.lines()[0].quantity_received, None);
        // shipped quantities are untouched
        assert_eq!(transfer.lines()[0].quantity_shipped, Some(5));
    }

    #[test]
    fn version_increments_once_per_transition() {
        let mut transfer = Transfer::create(request(one_line(5))).unwrap();
        assert_eq!(transfer.version(), 1);
        transfer.approve(UserId::new(), Utc::now()).unwrap();
        assert_eq!(transfer.version(), 2);
        transfer.ship(UserId::new(), Utc::now()).unwrap();
        assert_eq!(transfer.version(), 3);
        transfer.receive(UserId::new(), Utc::now()).unwrap();
        assert_eq!(transfer.version(), 4);
    }

    proptest! {
        /// Any action sequence keeps the status inside the five known states,
        /// and terminal states absorb every further action.
        #[test]
        fn status_stays_closed_under_arbitrary_actions(
            actions in proptest::collection::vec(0u8..4, 0..12)
        ) {
            let mut transfer = Transfer::create(request(one_line(5))).unwrap();
            for raw in actions {
                let was_terminal = transfer.status().is_terminal();
                let result = match raw {
                    0 => transfer.approve(UserId::new(), Utc::now()),
                    1 => transfer.ship(UserId::new(), Utc::now()).map(|_| ()),
                    2 => transfer.receive(UserId::new(), Utc::now()).map(|_| ()),
                    _ => transfer.cancel(),
                };
                if was_terminal {
                    prop_assert!(result.is_err(), "terminal status accepted an action");
                }
                prop_assert!(matches!(
                    transfer.status(),
                    TransferStatus::Pending
                        | TransferStatus::Approved
                        | TransferStatus::InTransit
                        | TransferStatus::Completed
                        | TransferStatus::Cancelled
                ));
            }
        }
    }
}
