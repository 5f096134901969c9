//! Delegation validation: containment, cycles, expiry.

use crate::model::Delegation;
use crate::scope::DelegationScope;
use crate::store::DelegationStore;
use evaluator::PolicyEvaluator;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use warden_core::{
    Action, Clock, DelegationDenial, EngineError, PolicyLoader, Resource, Subject,
};

const DAY_MS: u64 = 24 * 60 * 60 * 1_000;

/// Checks a delegation before it is ever stored.
///
/// Three gates, in order: permission containment (the delegator must itself
/// hold every non-wildcard permission the scope grants), cycle detection
/// (the transitive delegation graph must stay acyclic), and expiry sanity.
/// Wildcard scope entries are skipped by containment — proving containment
/// for them is undecidable against wildcarded policies, so runtime
/// evaluation remains the defense for those grants.
pub struct DelegationValidator {
    loader: Arc<dyn PolicyLoader>,
    evaluator: PolicyEvaluator,
    store: Arc<dyn DelegationStore>,
    clock: Arc<dyn Clock>,
    max_duration_days: Option<u32>,
    max_traversal_depth: usize,
}

impl DelegationValidator {
    /// Default bound on cycle-detection BFS depth.
    pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 16;

    /// A validator over the given capabilities.
    pub fn new(
        loader: Arc<dyn PolicyLoader>,
        evaluator: PolicyEvaluator,
        store: Arc<dyn DelegationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            loader,
            evaluator,
            store,
            clock,
            max_duration_days: None,
            max_traversal_depth: Self::DEFAULT_MAX_TRAVERSAL_DEPTH,
        }
    }

    /// Cap delegation lifetimes. With a cap configured, open-ended
    /// delegations are rejected too.
    #[must_use]
    pub const fn with_max_duration_days(mut self, days: u32) -> Self {
        self.max_duration_days = Some(days);
        self
    }

    /// Bound the cycle-detection traversal. Exceeding the bound rejects the
    /// delegation rather than accepting it unverified.
    #[must_use]
    pub const fn with_max_traversal_depth(mut self, depth: usize) -> Self {
        self.max_traversal_depth = depth;
        self
    }

    /// Run all three gates against a candidate delegation.
    pub fn validate(
        &self,
        delegation: &Delegation,
        delegator: &Subject,
    ) -> Result<(), EngineError> {
        if let Some(denial) = self.containment_failure(delegator, &delegation.scope)? {
            return Err(denial.into());
        }
        self.check_cycles(delegation)?;
        self.check_expiry(delegation)?;
        Ok(())
    }

    /// Containment-only check: could `delegator` delegate `scope` right now?
    ///
    /// Loader failures propagate; they are not a "no".
    pub fn can_delegate(
        &self,
        delegator: &Subject,
        scope: &DelegationScope,
    ) -> Result<bool, EngineError> {
        Ok(self.containment_failure(delegator, scope)?.is_none())
    }

    /// The first scope entry the delegator does not hold, if any.
    ///
    /// Each non-wildcard `(resource_pattern, action_pattern)` pair is turned
    /// into a concrete probe request and evaluated against the delegator's
    /// own policy.
    fn containment_failure(
        &self,
        delegator: &Subject,
        scope: &DelegationScope,
    ) -> Result<Option<DelegationDenial>, EngineError> {
        for resource_pattern in &scope.resources {
            if resource_pattern == "*" {
                continue;
            }
            let resource = Resource::from_id(resource_pattern.clone());
            let policy = self.loader.policy_for(delegator, &resource)?;
            for action_pattern in &scope.actions {
                if action_pattern == "*" {
                    continue;
                }
                let action = Action::new(action_pattern.clone());
                if !self.evaluator.evaluate(&policy, delegator, &resource, &action).is_allow() {
                    return Ok(Some(DelegationDenial::PermissionNotHeld {
                        resource: resource_pattern.clone(),
                        action: action_pattern.clone(),
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Breadth-first walk of the active transitive delegation graph.
    ///
    /// Edges run from a delegate to its delegators. Starting at the new
    /// delegation's delegate, reaching its delegator means the new edge
    /// would close a loop.
    fn check_cycles(&self, delegation: &Delegation) -> Result<(), EngineError> {
        let now_ms = self.clock.now_ms();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
        visited.insert(delegation.delegate_id.clone());
        frontier.push_back((delegation.delegate_id.clone(), 0));

        while let Some((node, depth)) = frontier.pop_front() {
            for upstream in self.store.active_for_delegate(&node)? {
                if !upstream.can_transit() || !upstream.is_active(now_ms) {
                    continue;
                }
                if upstream.delegator_id == delegation.delegator_id {
                    return Err(DelegationDenial::CycleDetected {
                        delegator: delegation.delegator_id.clone(),
                        delegate: delegation.delegate_id.clone(),
                    }
                    .into());
                }
                if visited.insert(upstream.delegator_id.clone()) {
                    if depth + 1 > self.max_traversal_depth {
                        return Err(DelegationDenial::TraversalDepthExceeded {
                            max_depth: self.max_traversal_depth,
                        }
                        .into());
                    }
                    frontier.push_back((upstream.delegator_id, depth + 1));
                }
            }
        }
        Ok(())
    }

    fn check_expiry(&self, delegation: &Delegation) -> Result<(), EngineError> {
        let now_ms = self.clock.now_ms();
        match delegation.expires_at_ms {
            None => match self.max_duration_days {
                None => Ok(()),
                Some(_) => Err(DelegationDenial::MissingExpiry.into()),
            },
            Some(expires_at_ms) => {
                if expires_at_ms <= now_ms {
                    return Err(DelegationDenial::AlreadyExpired { expires_at_ms }.into());
                }
                if let Some(max_days) = self.max_duration_days {
                    if expires_at_ms > now_ms + u64::from(max_days) * DAY_MS {
                        return Err(DelegationDenial::ExceedsMaxDuration { max_days }.into());
                    }
                }
                Ok(())
            }
        }
    }
}
