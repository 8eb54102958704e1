//! Transfer workflow orchestration.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use shopstock_core::{Entity, ExpectedVersion, TenantId, UserId};
use shopstock_transfer::{Transfer, TransferError, TransferId, TransferRequest};

use crate::entity_store::EntityStore;
use crate::stock_store::StockStore;

/// Coordinates the transfer state machine with the stock ledger.
///
/// Transitions are serialized through the entity store's optimistic version
/// check, so racing operators (approve vs. cancel, a double-clicked ship)
/// cannot both win and movements cannot be applied twice. For the two
/// ledger-affecting steps the service claims the transition first and applies
/// the movement batch second; when the batch is rejected, the claim is
/// compensated so the transfer observably stays in its pre-step status. A
/// durable implementation should instead commit the transition and its
/// movements in one storage transaction, which closes the brief window in
/// which a claimed-but-compensated transition is visible to readers.
#[derive(Debug)]
pub struct TransferService<S, R> {
    stock: S,
    transfers: R,
}

impl<S, R> TransferService<S, R> {
    pub fn new(stock: S, transfers: R) -> Self {
        Self { stock, transfers }
    }
}

impl<S, R> TransferService<S, R>
where
    S: StockStore,
    R: EntityStore<Transfer>,
{
    /// Propose a transfer. No stock is reserved or moved.
    pub fn create(&self, request: TransferRequest) -> Result<Transfer, TransferError> {
        let transfer = Transfer::create(request)?;
        self.transfers
            .insert(transfer.tenant_id(), transfer.clone())?;
        info!(
            tenant_id = %transfer.tenant_id(),
            transfer_id = %transfer.id_typed(),
            transfer_number = transfer.transfer_number(),
            from_shop_id = %transfer.from_shop_id(),
            to_shop_id = %transfer.to_shop_id(),
            lines = transfer.lines().len(),
            "transfer created"
        );
        Ok(transfer)
    }

    pub fn get(&self, tenant_id: TenantId, transfer_id: TransferId) -> Option<Transfer> {
        self.transfers.get(tenant_id, &transfer_id)
    }

    pub fn list(&self, tenant_id: TenantId) -> Vec<Transfer> {
        self.transfers.list(tenant_id)
    }

    fn load(&self, tenant_id: TenantId, transfer_id: TransferId) -> Result<Transfer, TransferError> {
        self.transfers
            .get(tenant_id, &transfer_id)
            .ok_or(TransferError::NotFound(transfer_id))
    }

    /// Approve a pending transfer. No ledger effect.
    pub fn approve(
        &self,
        tenant_id: TenantId,
        transfer_id: TransferId,
        approved_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Transfer, TransferError> {
        let current = self.load(tenant_id, transfer_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let mut updated = current;
        updated.approve(approved_by, at)?;
        self.transfers.update(tenant_id, updated.clone(), expected)?;
        info!(
            tenant_id = %tenant_id,
            transfer_id = %transfer_id,
            approved_by = %approved_by,
            "transfer approved"
        );
        Ok(updated)
    }

    /// Cancel a transfer that has not shipped. No ledger effect, terminal.
    pub fn cancel(
        &self,
        tenant_id: TenantId,
        transfer_id: TransferId,
    ) -> Result<Transfer, TransferError> {
        let current = self.load(tenant_id, transfer_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let mut updated = current;
        updated.cancel()?;
        self.transfers.update(tenant_id, updated.clone(), expected)?;
        info!(tenant_id = %tenant_id, transfer_id = %transfer_id, "transfer cancelled");
        Ok(updated)
    }

    /// Ship all lines out of the source shop as one atomic movement batch.
    ///
    /// If any line would drive source stock negative, nothing moves and the
    /// transfer observably remains approved.
    pub fn ship(
        &self,
        tenant_id: TenantId,
        transfer_id: TransferId,
        shipped_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Transfer, TransferError> {
        let current = self.load(tenant_id, transfer_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let mut updated = current;
        let drafts = updated.ship(shipped_by, at)?;

        // Claim the transition first: a racing ship or cancel loses on the
        // version check and can never double-apply the batch.
        self.transfers.update(tenant_id, updated.clone(), expected)?;

        match self.stock.apply_movements(drafts) {
            Ok(entries) => {
                info!(
                    tenant_id = %tenant_id,
                    transfer_id = %transfer_id,
                    lines = entries.len(),
                    "transfer shipped"
                );
                Ok(updated)
            }
            Err(err) => {
                let claimed = ExpectedVersion::Exact(updated.version());
                let mut reverted = updated;
                if reverted.abort_shipping().is_ok() {
                    let _ = self.transfers.update(tenant_id, reverted, claimed);
                }
                warn!(
                    tenant_id = %tenant_id,
                    transfer_id = %transfer_id,
                    error = %err,
                    "shipping movements rejected; transfer returned to approved"
                );
                Err(err.into())
            }
        }
    }

    /// Receive all lines into the destination shop as one atomic movement
    /// batch. Terminal.
    pub fn receive(
        &self,
        tenant_id: TenantId,
        transfer_id: TransferId,
        received_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Transfer, TransferError> {
        let current = self.load(tenant_id, transfer_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let mut updated = current;
        let drafts = updated.receive(received_by, at)?;

        self.transfers.update(tenant_id, updated.clone(), expected)?;

        match self.stock.apply_movements(drafts) {
            Ok(entries) => {
                info!(
                    tenant_id = %tenant_id,
                    transfer_id = %transfer_id,
                    lines = entries.len(),
                    "transfer received"
                );
                Ok(updated)
            }
            Err(err) => {
                // Inbound movements only fail on infrastructure errors.
                let claimed = ExpectedVersion::Exact(updated.version());
                let mut reverted = updated;
                if reverted.abort_receipt().is_ok() {
                    let _ = self.transfers.update(tenant_id, reverted, claimed);
                }
                warn!(
                    tenant_id = %tenant_id,
                    transfer_id = %transfer_id,
                    error = %err,
                    "receiving movements rejected; transfer returned to in-transit"
                );
                Err(err.into())
            }
        }
    }
}
