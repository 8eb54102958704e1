//! Tenant-isolated workflow entity storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shopstock_core::{DomainError, DomainResult, Entity, ExpectedVersion, TenantId};

/// Tenant-isolated store for versioned workflow entities.
///
/// Updates are optimistic: the caller states the version it loaded, and a
/// stale write fails with a conflict. Two racing transitions against one
/// entity therefore serialize — the loser must reload and retry (or give
/// up), it can never silently overwrite the winner.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Insert a new entity; fails with a conflict when the id is taken.
    fn insert(&self, tenant_id: TenantId, entity: E) -> DomainResult<()>;

    /// Replace a stored entity after checking the expected version.
    fn update(&self, tenant_id: TenantId, entity: E, expected: ExpectedVersion)
    -> DomainResult<()>;

    fn get(&self, tenant_id: TenantId, id: &E::Id) -> Option<E>;

    fn list(&self, tenant_id: TenantId) -> Vec<E>;
}

impl<E, S> EntityStore<E> for Arc<S>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    fn insert(&self, tenant_id: TenantId, entity: E) -> DomainResult<()> {
        (**self).insert(tenant_id, entity)
    }

    fn update(
        &self,
        tenant_id: TenantId,
        entity: E,
        expected: ExpectedVersion,
    ) -> DomainResult<()> {
        (**self).update(tenant_id, entity, expected)
    }

    fn get(&self, tenant_id: TenantId, id: &E::Id) -> Option<E> {
        (**self).get(tenant_id, id)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<E> {
        (**self).list(tenant_id)
    }
}

/// In-memory tenant-isolated entity store for tests/dev.
#[derive(Debug)]
pub struct InMemoryEntityStore<E: Entity> {
    inner: RwLock<HashMap<(TenantId, E::Id), E>>,
}

impl<E: Entity> InMemoryEntityStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EntityStore<E> for InMemoryEntityStore<E>
where
    E: Entity + Clone + Send + Sync + 'static,
    E::Id: Send + Sync,
{
    fn insert(&self, tenant_id: TenantId, entity: E) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("entity store lock poisoned"))?;

        let key = (tenant_id, entity.id().clone());
        if map.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "entity {:?} already exists",
                key.1
            )));
        }
        map.insert(key, entity);
        Ok(())
    }

    fn update(
        &self,
        tenant_id: TenantId,
        entity: E,
        expected: ExpectedVersion,
    ) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("entity store lock poisoned"))?;

        let key = (tenant_id, entity.id().clone());
        let stored = map.get(&key).ok_or(DomainError::NotFound)?;
        expected.check(stored.version())?;
        map.insert(key, entity);
        Ok(())
    }

    fn get(&self, tenant_id: TenantId, id: &E::Id) -> Option<E> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, id.clone())).cloned()
    }

    fn list(&self, tenant_id: TenantId) -> Vec<E> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.iter()
            .filter_map(|((t, _), e)| if *t == tenant_id { Some(e.clone()) } else { None })
            .collect()
    }
}
