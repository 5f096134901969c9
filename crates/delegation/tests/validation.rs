//! Validation gates: containment, cycles, expiry.

use delegation::{
    DelegationManager, DelegationScope, DelegationValidator, InMemoryDelegationStore,
};
use evaluator::PolicyEvaluator;
use matcher::AclMatcher;
use std::sync::Arc;
use warden_core::{
    Attributes, DelegationDenial, Effect, EngineError, FixedClock, Policy, PolicyRule,
    StaticPolicyLoader, Subject,
};

fn harness(loader: StaticPolicyLoader, clock: Arc<FixedClock>) -> DelegationManager {
    let store = Arc::new(InMemoryDelegationStore::new());
    let validator = DelegationValidator::new(
        Arc::new(loader),
        PolicyEvaluator::new(Arc::new(AclMatcher)),
        store.clone(),
        clock.clone(),
    );
    DelegationManager::new(validator, store, clock)
}

fn capped_harness(
    loader: StaticPolicyLoader,
    clock: Arc<FixedClock>,
    max_days: u32,
) -> DelegationManager {
    let store = Arc::new(InMemoryDelegationStore::new());
    let validator = DelegationValidator::new(
        Arc::new(loader),
        PolicyEvaluator::new(Arc::new(AclMatcher)),
        store.clone(),
        clock.clone(),
    )
    .with_max_duration_days(max_days);
    DelegationManager::new(validator, store, clock)
}

fn editing_loader() -> StaticPolicyLoader {
    StaticPolicyLoader::new().with_policy(
        "document:42",
        Policy::from_rules(vec![PolicyRule::new(
            "user:a",
            Some("document:42"),
            "edit",
            Effect::Allow,
        )]),
    )
}

fn denial(err: EngineError) -> DelegationDenial {
    match err {
        EngineError::DelegationRejected(denial) => denial,
        other => panic!("expected a delegation rejection, got {other:?}"),
    }
}

#[test]
fn delegator_cannot_grant_what_it_lacks() {
    let m = harness(editing_loader(), Arc::new(FixedClock::at(1_000)));
    let err = m
        .delegate(
            &Subject::new("user:a"),
            &Subject::new("user:b"),
            DelegationScope::new(["document:42"], ["delete"]),
            None,
            false,
            Attributes::new(),
        )
        .unwrap_err();
    assert_eq!(
        denial(err),
        DelegationDenial::PermissionNotHeld {
            resource: "document:42".into(),
            action: "delete".into()
        }
    );
}

#[test]
fn wildcard_scope_entries_skip_containment() {
    // The delegator holds nothing at all, but wildcard entries are too broad
    // to verify and are left to runtime evaluation.
    let m = harness(StaticPolicyLoader::new(), Arc::new(FixedClock::at(1_000)));
    let full = m.delegate(
        &Subject::new("user:a"),
        &Subject::new("user:b"),
        DelegationScope::new(["*"], ["*"]),
        None,
        false,
        Attributes::new(),
    );
    assert!(full.is_ok());

    // A concrete resource with a wildcard action still probes nothing.
    let half = m.delegate(
        &Subject::new("user:a"),
        &Subject::new("user:c"),
        DelegationScope::new(["document:42"], ["*"]),
        None,
        false,
        Attributes::new(),
    );
    assert!(half.is_ok());
}

#[test]
fn can_delegate_reports_containment_without_storing() {
    let m = harness(editing_loader(), Arc::new(FixedClock::at(1_000)));
    let a = Subject::new("user:a");
    assert!(m.can_delegate(&a, &DelegationScope::new(["document:42"], ["edit"])).unwrap());
    assert!(!m.can_delegate(&a, &DelegationScope::new(["document:42"], ["delete"])).unwrap());
    assert!(m.find_active_delegations(&Subject::new("user:b")).unwrap().is_empty());
}

#[test]
fn transitive_cycle_is_rejected() {
    let m = harness(StaticPolicyLoader::new(), Arc::new(FixedClock::at(1_000)));
    let a = Subject::new("user:a");
    let b = Subject::new("user:b");
    m.delegate(&a, &b, DelegationScope::new(["*"], ["*"]), None, true, Attributes::new())
        .unwrap();

    let err = m
        .delegate(&b, &a, DelegationScope::new(["*"], ["*"]), None, true, Attributes::new())
        .unwrap_err();
    assert_eq!(
        denial(err),
        DelegationDenial::CycleDetected { delegator: "user:b".into(), delegate: "user:a".into() }
    );
}

#[test]
fn longer_transitive_cycles_are_found() {
    let m = harness(StaticPolicyLoader::new(), Arc::new(FixedClock::at(1_000)));
    let a = Subject::new("user:a");
    let b = Subject::new("user:b");
    let c = Subject::new("user:c");
    let scope = || DelegationScope::new(["*"], ["*"]);
    m.delegate(&a, &b, scope(), None, true, Attributes::new()).unwrap();
    m.delegate(&b, &c, scope(), None, true, Attributes::new()).unwrap();

    let err = m.delegate(&c, &a, scope(), None, true, Attributes::new()).unwrap_err();
    assert!(matches!(denial(err), DelegationDenial::CycleDetected { .. }));
}

#[test]
fn non_transitive_grants_do_not_close_cycles() {
    let m = harness(StaticPolicyLoader::new(), Arc::new(FixedClock::at(1_000)));
    let a = Subject::new("user:a");
    let b = Subject::new("user:b");
    let scope = || DelegationScope::new(["*"], ["*"]);
    m.delegate(&a, &b, scope(), None, false, Attributes::new()).unwrap();
    // The reverse direction is fine: the first grant cannot be re-delegated.
    assert!(m.delegate(&b, &a, scope(), None, false, Attributes::new()).is_ok());
}

#[test]
fn traversal_depth_bound_fails_closed() {
    let clock = Arc::new(FixedClock::at(1_000));
    let store = Arc::new(InMemoryDelegationStore::new());
    let validator = DelegationValidator::new(
        Arc::new(StaticPolicyLoader::new()),
        PolicyEvaluator::new(Arc::new(AclMatcher)),
        store.clone(),
        clock.clone(),
    )
    .with_max_traversal_depth(1);
    let m = DelegationManager::new(validator, store, clock);

    let scope = || DelegationScope::new(["*"], ["*"]);
    let b = Subject::new("user:b");
    let c = Subject::new("user:c");
    let d = Subject::new("user:d");
    // Chain: b can reach c, c can reach d (both transitive).
    m.delegate(&c, &b, scope(), None, true, Attributes::new()).unwrap();
    m.delegate(&d, &c, scope(), None, true, Attributes::new()).unwrap();

    // Validating a grant to b needs to walk b -> c -> d, past the bound.
    let err = m
        .delegate(&Subject::new("user:a"), &b, scope(), None, true, Attributes::new())
        .unwrap_err();
    assert_eq!(denial(err), DelegationDenial::TraversalDepthExceeded { max_depth: 1 });
}

#[test]
fn expiry_must_be_in_the_future() {
    let clock = Arc::new(FixedClock::at(5_000));
    let m = harness(editing_loader(), clock);
    let attempt = |expires_at_ms: Option<u64>| {
        m.delegate(
            &Subject::new("user:a"),
            &Subject::new("user:b"),
            DelegationScope::new(["document:42"], ["edit"]),
            expires_at_ms,
            false,
            Attributes::new(),
        )
    };
    // The boundary instant counts as expired.
    assert_eq!(
        denial(attempt(Some(5_000)).unwrap_err()),
        DelegationDenial::AlreadyExpired { expires_at_ms: 5_000 }
    );
    assert!(matches!(
        denial(attempt(Some(4_000)).unwrap_err()),
        DelegationDenial::AlreadyExpired { .. }
    ));
    assert!(attempt(Some(5_001)).is_ok());
    assert!(attempt(None).is_ok());
}

#[test]
fn duration_cap_bounds_and_requires_expiry() {
    let day_ms = 24 * 60 * 60 * 1_000;
    let clock = Arc::new(FixedClock::at(0));
    let m = capped_harness(editing_loader(), clock, 30);
    let attempt = |expires_at_ms: Option<u64>| {
        m.delegate(
            &Subject::new("user:a"),
            &Subject::new("user:b"),
            DelegationScope::new(["document:42"], ["edit"]),
            expires_at_ms,
            false,
            Attributes::new(),
        )
    };
    assert_eq!(denial(attempt(None).unwrap_err()), DelegationDenial::MissingExpiry);
    assert_eq!(
        denial(attempt(Some(31 * day_ms)).unwrap_err()),
        DelegationDenial::ExceedsMaxDuration { max_days: 30 }
    );
    assert!(attempt(Some(30 * day_ms)).is_ok());
}

#[test]
fn rejected_delegations_are_never_stored() {
    let m = harness(editing_loader(), Arc::new(FixedClock::at(1_000)));
    let b = Subject::new("user:b");
    let _ = m.delegate(
        &Subject::new("user:a"),
        &b,
        DelegationScope::new(["document:42"], ["delete"]),
        None,
        false,
        Attributes::new(),
    );
    assert!(m.find_active_delegations(&b).unwrap().is_empty());
}

#[test]
fn loader_failure_inside_validation_propagates() {
    use std::collections::HashMap;
    use warden_core::{PolicyLoader, Resource};

    struct FailingLoader;
    impl PolicyLoader for FailingLoader {
        fn policy_for(&self, _: &Subject, _: &Resource) -> Result<Policy, EngineError> {
            Err(EngineError::loader("policy backend offline".to_owned()))
        }
        fn policies_for_batch(
            &self,
            _: &Subject,
            _: &[Resource],
        ) -> Result<HashMap<String, Policy>, EngineError> {
            Err(EngineError::loader("policy backend offline".to_owned()))
        }
    }

    let clock = Arc::new(FixedClock::at(1_000));
    let store = Arc::new(InMemoryDelegationStore::new());
    let validator = DelegationValidator::new(
        Arc::new(FailingLoader),
        PolicyEvaluator::new(Arc::new(AclMatcher)),
        store.clone(),
        clock.clone(),
    );
    let m = DelegationManager::new(validator, store, clock);
    let err = m
        .delegate(
            &Subject::new("user:a"),
            &Subject::new("user:b"),
            DelegationScope::new(["document:42"], ["edit"]),
            None,
            false,
            Attributes::new(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Loader(_)));
}
