//! The delegation lifecycle model.

use crate::scope::DelegationScope;
use serde::{Deserialize, Serialize};
use warden_core::Attributes;

/// Lifecycle state of a delegation.
///
/// `Active` is the initial state; `Revoked` (explicit) and `Expired`
/// (time-driven) are absorbing. Expiry may be observed lazily at read time
/// or applied eagerly by a store sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationState {
    /// The grant is live (subject to expiry).
    Active,
    /// The grant was withdrawn; the record is retained for audit.
    Revoked,
    /// The grant ran past its expiry.
    Expired,
}

/// A bounded grant of permissions from one subject to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    /// Unique id (UUIDv4).
    pub id: String,
    /// Subject granting the permissions.
    pub delegator_id: String,
    /// Subject receiving them.
    pub delegate_id: String,
    /// What the grant covers.
    pub scope: DelegationScope,
    /// Creation instant, milliseconds since epoch.
    pub created_at_ms: u64,
    /// Expiry instant, or `None` for an open-ended grant.
    pub expires_at_ms: Option<u64>,
    /// Whether the delegate may re-delegate within the scope.
    pub transitive: bool,
    /// Lifecycle state.
    pub status: DelegationState,
    /// Host-defined annotations (reason, ticket id, ...).
    #[serde(default)]
    pub metadata: Attributes,
}

impl Delegation {
    /// Whether the grant has run out at `now_ms`. An expiry exactly equal to
    /// now counts as expired.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_some_and(|e| e <= now_ms)
    }

    /// Whether the grant confers permissions at `now_ms`.
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.status == DelegationState::Active && !self.is_expired(now_ms)
    }

    /// Whether the delegate may pass the grant on.
    pub const fn can_transit(&self) -> bool {
        self.transitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delegation(expires_at_ms: Option<u64>, status: DelegationState) -> Delegation {
        Delegation {
            id: "d1".into(),
            delegator_id: "user:a".into(),
            delegate_id: "user:b".into(),
            scope: DelegationScope::new(["document:42"], ["edit"]),
            created_at_ms: 1_000,
            expires_at_ms,
            transitive: false,
            status,
            metadata: Attributes::new(),
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let d = delegation(Some(5_000), DelegationState::Active);
        assert!(!d.is_expired(4_999));
        assert!(d.is_expired(5_000));
        assert!(d.is_expired(5_001));
    }

    #[test]
    fn open_ended_grants_never_expire() {
        let d = delegation(None, DelegationState::Active);
        assert!(!d.is_expired(u64::MAX));
        assert!(d.is_active(u64::MAX));
    }

    #[test]
    fn terminal_states_are_inactive() {
        assert!(!delegation(None, DelegationState::Revoked).is_active(0));
        assert!(!delegation(None, DelegationState::Expired).is_active(0));
    }
}
