//! Physical inventory count sessions.
//!
//! A session freezes expected quantities once at start, collects counted
//! quantities incrementally, and on validation emits one reconciling
//! movement per nonzero discrepancy. The frozen snapshot makes discrepancy a
//! measure of drift between the start of the count and the count itself:
//! sales that happen while counting already produced their own ledger
//! entries and must not be double-counted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopstock_core::{Entity, ProductId, ShopId, TenantId, UserId};
use shopstock_ledger::{MovementDraft, MovementKind, MovementRef, StockLevel};

use crate::error::CountingError;

/// Count session identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
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

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Count session status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    InProgress,
    Completed,
}

/// Action against a count session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Start,
    RecordCount,
    Validate,
}

impl SessionStatus {
    /// Central allowed-action table; every session operation consults it.
    pub fn permits(self, action: SessionAction) -> bool {
        matches!(
            (self, action),
            (SessionStatus::Draft, SessionAction::Start)
                | (SessionStatus::InProgress, SessionAction::RecordCount)
                | (SessionStatus::InProgress, SessionAction::Validate)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Draft => "draft",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl core::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionAction::Start => "start",
            SessionAction::RecordCount => "record a count for",
            SessionAction::Validate => "validate",
        }
    }
}

impl core::fmt::Display for SessionAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What validation does with lines that were never counted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncountedLinePolicy {
    /// Uncounted means "not checked": the line produces no ledger effect.
    #[default]
    Skip,
    /// Uncounted means "nothing on the shelf": reconcile the line to zero.
    CountAsZero,
}

/// One counted position of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountLine {
    pub product_id: ProductId,
    /// Stock level snapshot taken once at session start, never re-taken.
    pub expected_quantity: i64,
    pub counted_quantity: Option<i64>,
    pub counted_by: Option<UserId>,
    pub counted_at: Option<DateTime<Utc>>,
}

impl CountLine {
    /// Counted minus expected; `None` until a count is recorded.
    pub fn discrepancy(&self) -> Option<i64> {
        self.counted_quantity.map(|c| c - self.expected_quantity)
    }
}

/// A physical inventory count for one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSession {
    id: SessionId,
    tenant_id: TenantId,
    inventory_number: String,
    shop_id: ShopId,
    status: SessionStatus,
    uncounted_policy: UncountedLinePolicy,
    lines: Vec<CountLine>,
    started_by: Option<UserId>,
    started_at: Option<DateTime<Utc>>,
    completed_by: Option<UserId>,
    completed_at: Option<DateTime<Utc>>,
    version: u64,
}

impl CountSession {
    /// Create a draft session; the snapshot is taken later by [`Self::start`].
    pub fn create(
        id: SessionId,
        tenant_id: TenantId,
        inventory_number: String,
        shop_id: ShopId,
        uncounted_policy: UncountedLinePolicy,
    ) -> Self {
        Self {
            id,
            tenant_id,
            inventory_number,
            shop_id,
            status: SessionStatus::Draft,
            uncounted_policy,
            lines: Vec::new(),
            started_by: None,
            started_at: None,
            completed_by: None,
            completed_at: None,
            version: 1,
        }
    }

    pub fn id_typed(&self) -> SessionId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn inventory_number(&self) -> &str {
        &self.inventory_number
    }

    pub fn shop_id(&self) -> ShopId {
        self.shop_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn uncounted_policy(&self) -> UncountedLinePolicy {
        self.uncounted_policy
    }

    pub fn lines(&self) -> &[CountLine] {
        &self.lines
    }

    pub fn started_by(&self) -> Option<UserId> {
        self.started_by
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_by(&self) -> Option<UserId> {
        self.completed_by
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    fn guard(&self, action: SessionAction) -> Result<(), CountingError> {
        if !self.status.permits(action) {
            return Err(CountingError::InvalidState {
                status: self.status,
                action,
            });
        }
        Ok(())
    }

    /// Freeze the shop's tracked positions into count lines and begin counting.
    pub fn start(
        &mut self,
        levels: &[StockLevel],
        started_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), CountingError> {
        self.guard(SessionAction::Start)?;
        if levels.is_empty() {
            return Err(CountingError::EmptyShopInventory {
                shop_id: self.shop_id,
            });
        }

        self.lines = levels
            .iter()
            .map(|level| CountLine {
                product_id: level.product_id,
                expected_quantity: level.quantity,
                counted_quantity: None,
                counted_by: None,
                counted_at: None,
            })
            .collect();
        self.status = SessionStatus::InProgress;
        self.started_by = Some(started_by);
        self.started_at = Some(at);
        self.version += 1;
        Ok(())
    }

    /// Record (or overwrite) the counted quantity for one product.
    ///
    /// Returns the line's discrepancy, recomputed on every entry. Allowed any
    /// number of times while counting is in progress.
    pub fn record_count(
        &mut self,
        product_id: ProductId,
        counted_quantity: i64,
        counted_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<i64, CountingError> {
        self.guard(SessionAction::RecordCount)?;
        if counted_quantity < 0 {
            return Err(CountingError::NegativeCount {
                quantity: counted_quantity,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CountingError::UnknownProduct { product_id })?;

        line.counted_quantity = Some(counted_quantity);
        line.counted_by = Some(counted_by);
        line.counted_at = Some(at);
        self.version += 1;
        Ok(counted_quantity - line.expected_quantity)
    }

    /// Close the session and emit one reconciling draft per nonzero
    /// discrepancy. Terminal: afterwards the lines are historical record.
    ///
    /// Uncounted lines follow the session's [`UncountedLinePolicy`]. The
    /// caller must apply the drafts as a single atomic batch.
    pub fn validate(
        &mut self,
        completed_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<MovementDraft>, CountingError> {
        self.guard(SessionAction::Validate)?;

        let mut drafts = Vec::new();
        for line in &self.lines {
            let counted = match (line.counted_quantity, self.uncounted_policy) {
                (Some(c), _) => c,
                (None, UncountedLinePolicy::CountAsZero) => 0,
                (None, UncountedLinePolicy::Skip) => continue,
            };
            let discrepancy = counted - line.expected_quantity;
            if discrepancy == 0 {
                continue;
            }
            drafts.push(MovementDraft::new(
                self.tenant_id,
                self.shop_id,
                line.product_id,
                discrepancy,
                MovementKind::CountReconcile,
                MovementRef::count_session(self.id.0),
                completed_by,
                at,
                None,
            )?);
        }

        self.status = SessionStatus::Completed;
        self.completed_by = Some(completed_by);
        self.completed_at = Some(at);
        self.version += 1;
        Ok(drafts)
    }

    /// Roll a failed validation attempt back to in-progress.
    ///
    /// Compensation for the case where the reconciling batch was rejected by
    /// the ledger (e.g. concurrent sales drained a position below its
    /// negative discrepancy). Counts are preserved; the operator re-counts
    /// the offending line and validates again.
    pub fn abort_validation(&mut self) -> Result<(), CountingError> {
        if self.status != SessionStatus::Completed {
            return Err(CountingError::InvalidState {
                status: self.status,
                action: SessionAction::Validate,
            });
        }
        self.status = SessionStatus::InProgress;
        self.completed_by = None;
        self.completed_at = None;
        self.version += 1;
        Ok(())
    }
}

impl Entity for CountSession {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
