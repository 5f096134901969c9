//! Delegation store contract and the in-memory reference implementation.

use crate::model::{Delegation, DelegationState};
use std::collections::HashMap;
use std::sync::RwLock;
use warden_core::EngineError;

/// Persistence capability for delegations.
///
/// The engine owns none of the storage; hosts implement this over their
/// database. Errors propagate to the caller unchanged — a listing that
/// cannot be produced must surface the failure rather than silently
/// returning an empty list.
pub trait DelegationStore: Send + Sync {
    /// Persist a freshly validated delegation.
    fn create(&self, delegation: Delegation) -> Result<(), EngineError>;

    /// Mark a delegation revoked. The record is retained for audit until a
    /// retention sweep purges it.
    fn revoke(&self, id: &str) -> Result<(), EngineError>;

    /// All delegations with status `Active` held by `delegate_id`.
    ///
    /// Expiry is not applied here; callers holding a clock filter with
    /// [`Delegation::is_active`].
    fn active_for_delegate(&self, delegate_id: &str) -> Result<Vec<Delegation>, EngineError>;

    /// Eagerly transition active delegations whose expiry has passed to
    /// `Expired`. Returns how many records changed state.
    fn sweep_expired(&self, now_ms: u64) -> Result<usize, EngineError>;
}

/// A `RwLock<HashMap>` store for embedders and tests. Nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryDelegationStore {
    inner: RwLock<HashMap<String, Delegation>>,
}

impl InMemoryDelegationStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Delegation>>, EngineError>
    {
        self.inner.read().map_err(|_| EngineError::store("delegation store lock poisoned".to_owned()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Delegation>>, EngineError> {
        self.inner
            .write()
            .map_err(|_| EngineError::store("delegation store lock poisoned".to_owned()))
    }
}

impl DelegationStore for InMemoryDelegationStore {
    fn create(&self, delegation: Delegation) -> Result<(), EngineError> {
        let mut map = self.write()?;
        if map.contains_key(&delegation.id) {
            return Err(EngineError::store(format!(
                "delegation '{}' already exists",
                delegation.id
            )));
        }
        map.insert(delegation.id.clone(), delegation);
        Ok(())
    }

    fn revoke(&self, id: &str) -> Result<(), EngineError> {
        let mut map = self.write()?;
        match map.get_mut(id) {
            Some(delegation) => {
                delegation.status = DelegationState::Revoked;
                Ok(())
            }
            None => Err(EngineError::store(format!("unknown delegation '{id}'"))),
        }
    }

    fn active_for_delegate(&self, delegate_id: &str) -> Result<Vec<Delegation>, EngineError> {
        let map = self.read()?;
        let mut out: Vec<Delegation> = map
            .values()
            .filter(|d| d.status == DelegationState::Active && d.delegate_id == delegate_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn sweep_expired(&self, now_ms: u64) -> Result<usize, EngineError> {
        let mut map = self.write()?;
        let mut swept = 0;
        for delegation in map.values_mut() {
            if delegation.status == DelegationState::Active && delegation.is_expired(now_ms) {
                delegation.status = DelegationState::Expired;
                swept += 1;
            }
        }
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::DelegationScope;
    use warden_core::Attributes;

    fn delegation(id: &str, delegate: &str, expires_at_ms: Option<u64>) -> Delegation {
        Delegation {
            id: id.into(),
            delegator_id: "user:a".into(),
            delegate_id: delegate.into(),
            scope: DelegationScope::new(["*"], ["*"]),
            created_at_ms: 0,
            expires_at_ms,
            transitive: false,
            status: DelegationState::Active,
            metadata: Attributes::new(),
        }
    }

    #[test]
    fn revoked_records_are_retained_but_inactive() {
        let store = InMemoryDelegationStore::new();
        store.create(delegation("d1", "user:b", None)).unwrap();
        store.revoke("d1").unwrap();
        assert!(store.active_for_delegate("user:b").unwrap().is_empty());
        // Revoking again still finds the (retained) record.
        store.revoke("d1").unwrap();
    }

    #[test]
    fn revoking_unknown_id_errors() {
        let store = InMemoryDelegationStore::new();
        assert!(store.revoke("ghost").is_err());
    }

    #[test]
    fn sweep_expires_exactly_the_overdue() {
        let store = InMemoryDelegationStore::new();
        store.create(delegation("d1", "user:b", Some(100))).unwrap();
        store.create(delegation("d2", "user:b", Some(200))).unwrap();
        store.create(delegation("d3", "user:b", None)).unwrap();
        assert_eq!(store.sweep_expired(100).unwrap(), 1);
        assert_eq!(store.sweep_expired(100).unwrap(), 0);
        let active = store.active_for_delegate("user:b").unwrap();
        let ids: Vec<&str> = active.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["d2", "d3"]);
    }

    #[test]
    fn duplicate_create_errors() {
        let store = InMemoryDelegationStore::new();
        store.create(delegation("d1", "user:b", None)).unwrap();
        assert!(store.create(delegation("d1", "user:b", None)).is_err());
    }
}
