//! Delegation lifecycle and rule projection.

use crate::model::{Delegation, DelegationState};
use crate::scope::DelegationScope;
use crate::store::DelegationStore;
use crate::validate::DelegationValidator;
use std::sync::Arc;
use uuid::Uuid;
use warden_core::{Attributes, Clock, Effect, EngineError, PolicyRule, Priority, Subject};

/// Priority of rules projected from delegations.
pub const DELEGATED_RULE_PRIORITY: Priority = Priority(50);

/// Creates, revokes, lists, and projects delegations.
///
/// Creation validates first and persists second — a rejected delegation is
/// never partially stored.
pub struct DelegationManager {
    validator: DelegationValidator,
    store: Arc<dyn DelegationStore>,
    clock: Arc<dyn Clock>,
}

impl DelegationManager {
    /// A manager over the given validator, store, and clock.
    pub fn new(
        validator: DelegationValidator,
        store: Arc<dyn DelegationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { validator, store, clock }
    }

    /// Create and store a delegation from `delegator` to `delegate`.
    pub fn delegate(
        &self,
        delegator: &Subject,
        delegate: &Subject,
        scope: DelegationScope,
        expires_at_ms: Option<u64>,
        transitive: bool,
        metadata: Attributes,
    ) -> Result<Delegation, EngineError> {
        let delegation = Delegation {
            id: Uuid::new_v4().to_string(),
            delegator_id: delegator.id.clone(),
            delegate_id: delegate.id.clone(),
            scope,
            created_at_ms: self.clock.now_ms(),
            expires_at_ms,
            transitive,
            status: DelegationState::Active,
            metadata,
        };
        self.validator.validate(&delegation, delegator)?;
        self.store.create(delegation.clone())?;
        Ok(delegation)
    }

    /// Mark a delegation revoked. The record is retained for audit.
    pub fn revoke(&self, id: &str) -> Result<(), EngineError> {
        self.store.revoke(id)
    }

    /// The delegations currently conferring permissions on `delegate`:
    /// status `Active` and not yet expired by this manager's clock.
    pub fn find_active_delegations(
        &self,
        delegate: &Subject,
    ) -> Result<Vec<Delegation>, EngineError> {
        let now_ms = self.clock.now_ms();
        Ok(self
            .store
            .active_for_delegate(&delegate.id)?
            .into_iter()
            .filter(|d| d.is_active(now_ms))
            .collect())
    }

    /// Project every active delegation held by `delegate` into allow rules:
    /// the Cartesian product of each scope's resources and actions, at
    /// [`DELEGATED_RULE_PRIORITY`].
    pub fn to_policy_rules(&self, delegate: &Subject) -> Result<Vec<PolicyRule>, EngineError> {
        let mut rules = Vec::new();
        for delegation in self.find_active_delegations(delegate)? {
            for resource in &delegation.scope.resources {
                for action in &delegation.scope.actions {
                    let mut rule = PolicyRule::new(
                        delegate.id.clone(),
                        Some(resource.as_str()),
                        action.clone(),
                        Effect::Allow,
                    )
                    .with_priority(DELEGATED_RULE_PRIORITY.0);
                    if let Some(domain) = &delegation.scope.domain {
                        rule = rule.with_domain(domain.clone());
                    }
                    rules.push(rule);
                }
            }
        }
        Ok(rules)
    }

    /// Containment-only precheck: could `delegator` delegate `scope`?
    pub fn can_delegate(
        &self,
        delegator: &Subject,
        scope: &DelegationScope,
    ) -> Result<bool, EngineError> {
        self.validator.can_delegate(delegator, scope)
    }
}
