//! Count session orchestration.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use shopstock_core::{Entity, ExpectedVersion, ProductId, ShopId, TenantId, UserId};
use shopstock_counting::{CountSession, CountingError, SessionId, UncountedLinePolicy};

use crate::entity_store::EntityStore;
use crate::stock_store::StockStore;

/// Coordinates physical count sessions with the stock ledger.
///
/// Validation follows the same claim-then-apply shape as transfer shipping:
/// the session is moved to completed under an optimistic version check (a
/// racing double-validate loses), then the reconciling batch is applied
/// all-or-nothing; a rejected batch rolls the session back to in-progress
/// with its counts intact.
#[derive(Debug)]
pub struct CountingService<S, R> {
    stock: S,
    sessions: R,
}

impl<S, R> CountingService<S, R> {
    pub fn new(stock: S, sessions: R) -> Self {
        Self { stock, sessions }
    }
}

impl<S, R> CountingService<S, R>
where
    S: StockStore,
    R: EntityStore<CountSession>,
{
    /// Create a draft session for a shop.
    pub fn create(
        &self,
        tenant_id: TenantId,
        session_id: SessionId,
        inventory_number: String,
        shop_id: ShopId,
        uncounted_policy: UncountedLinePolicy,
    ) -> Result<CountSession, CountingError> {
        let session = CountSession::create(
            session_id,
            tenant_id,
            inventory_number,
            shop_id,
            uncounted_policy,
        );
        self.sessions.insert(tenant_id, session.clone())?;
        info!(
            tenant_id = %tenant_id,
            session_id = %session_id,
            inventory_number = session.inventory_number(),
            shop_id = %shop_id,
            "count session created"
        );
        Ok(session)
    }

    pub fn get(&self, tenant_id: TenantId, session_id: SessionId) -> Option<CountSession> {
        self.sessions.get(tenant_id, &session_id)
    }

    fn load(
        &self,
        tenant_id: TenantId,
        session_id: SessionId,
    ) -> Result<CountSession, CountingError> {
        self.sessions
            .get(tenant_id, &session_id)
            .ok_or(CountingError::NotFound(session_id))
    }

    /// Snapshot the shop's tracked stock and begin counting.
    ///
    /// The snapshot is taken exactly once; sales during the count do not
    /// disturb the frozen expected quantities.
    pub fn start(
        &self,
        tenant_id: TenantId,
        session_id: SessionId,
        started_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<CountSession, CountingError> {
        let current = self.load(tenant_id, session_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let levels = self.stock.levels_for_shop(tenant_id, current.shop_id());
        let mut updated = current;
        updated.start(&levels, started_by, at)?;
        self.sessions.update(tenant_id, updated.clone(), expected)?;
        info!(
            tenant_id = %tenant_id,
            session_id = %session_id,
            lines = updated.lines().len(),
            "count session started"
        );
        Ok(updated)
    }

    /// Record (or overwrite) one counted quantity; returns the discrepancy.
    pub fn record_count(
        &self,
        tenant_id: TenantId,
        session_id: SessionId,
        product_id: ProductId,
        counted_quantity: i64,
        counted_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<i64, CountingError> {
        let current = self.load(tenant_id, session_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let mut updated = current;
        let discrepancy = updated.record_count(product_id, counted_quantity, counted_by, at)?;
        self.sessions.update(tenant_id, updated, expected)?;
        Ok(discrepancy)
    }

    /// Validate the session: apply every nonzero discrepancy as one atomic
    /// reconciling batch and complete the session.
    pub fn validate(
        &self,
        tenant_id: TenantId,
        session_id: SessionId,
        completed_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<CountSession, CountingError> {
        let current = self.load(tenant_id, session_id)?;
        let expected = ExpectedVersion::Exact(current.version());

        let mut updated = current;
        let drafts = updated.validate(completed_by, at)?;

        // Claim completion first; a racing validate loses the version check.
        self.sessions.update(tenant_id, updated.clone(), expected)?;

        match self.stock.apply_movements(drafts) {
            Ok(entries) => {
                info!(
                    tenant_id = %tenant_id,
                    session_id = %session_id,
                    reconciled = entries.len(),
                    "count session validated"
                );
                Ok(updated)
            }
            Err(err) => {
                let claimed = ExpectedVersion::Exact(updated.version());
                let mut reverted = updated;
                if reverted.abort_validation().is_ok() {
                    let _ = self.sessions.update(tenant_id, reverted, claimed);
                }
                warn!(
                    tenant_id = %tenant_id,
                    session_id = %session_id,
                    error = %err,
                    "reconciling movements rejected; session returned to in-progress"
                );
                Err(err.into())
            }
        }
    }
}
