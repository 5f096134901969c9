//! Delegation lifecycle: creation, listing, revocation, expiry, projection.

use delegation::{
    DelegationManager, DelegationScope, DelegationState, DelegationStore, DelegationValidator,
    InMemoryDelegationStore, DELEGATED_RULE_PRIORITY,
};
use evaluator::PolicyEvaluator;
use matcher::AclMatcher;
use std::sync::Arc;
use warden_core::{
    Attributes, Clock, Effect, FixedClock, Policy, PolicyRule, StaticPolicyLoader, Subject,
};

fn manager(clock: Arc<FixedClock>) -> DelegationManager {
    // The delegator holds edit+read on document:42 and report:7.
    let policy = Policy::from_rules(vec![
        PolicyRule::new("user:a", Some("document:42"), "edit", Effect::Allow),
        PolicyRule::new("user:a", Some("document:42"), "read", Effect::Allow),
        PolicyRule::new("user:a", Some("report:7"), "read", Effect::Allow),
        PolicyRule::new("user:a", Some("report:7"), "edit", Effect::Allow),
    ]);
    let loader = Arc::new(
        StaticPolicyLoader::new()
            .with_policy("document:42", policy.clone())
            .with_policy("report:7", policy),
    );
    let store = Arc::new(InMemoryDelegationStore::new());
    let validator = DelegationValidator::new(
        loader,
        PolicyEvaluator::new(Arc::new(AclMatcher)),
        store.clone(),
        clock.clone(),
    );
    DelegationManager::new(validator, store, clock)
}

#[test]
fn delegate_mints_an_active_uuid_grant() {
    let clock = Arc::new(FixedClock::at(1_000));
    let m = manager(clock);
    let delegation = m
        .delegate(
            &Subject::new("user:a"),
            &Subject::new("user:b"),
            DelegationScope::new(["document:42"], ["edit"]),
            Some(10_000),
            false,
            Attributes::new(),
        )
        .unwrap();
    assert_eq!(delegation.status, DelegationState::Active);
    assert_eq!(delegation.created_at_ms, 1_000);
    assert_eq!(delegation.id.len(), 36);
    assert!(delegation.id.chars().all(|c| c.is_ascii_hexdigit() || c == '-'));
    assert_eq!(delegation.delegator_id, "user:a");
    assert_eq!(delegation.delegate_id, "user:b");
}

#[test]
fn expiry_is_observed_lazily_at_read_time() {
    let clock = Arc::new(FixedClock::at(1_000));
    let m = manager(clock.clone());
    let b = Subject::new("user:b");
    m.delegate(
        &Subject::new("user:a"),
        &b,
        DelegationScope::new(["document:42"], ["edit"]),
        Some(2_000),
        false,
        Attributes::new(),
    )
    .unwrap();

    assert_eq!(m.find_active_delegations(&b).unwrap().len(), 1);
    // An expiry exactly equal to now counts as expired.
    clock.set_ms(2_000);
    assert!(m.find_active_delegations(&b).unwrap().is_empty());
    assert!(m.to_policy_rules(&b).unwrap().is_empty());
}

#[test]
fn revocation_removes_the_grant_but_keeps_the_record() {
    let clock = Arc::new(FixedClock::at(1_000));
    let m = manager(clock);
    let b = Subject::new("user:b");
    let delegation = m
        .delegate(
            &Subject::new("user:a"),
            &b,
            DelegationScope::new(["document:42"], ["edit"]),
            None,
            false,
            Attributes::new(),
        )
        .unwrap();

    m.revoke(&delegation.id).unwrap();
    assert!(m.find_active_delegations(&b).unwrap().is_empty());
    // The record is retained: revoking again still resolves the id.
    m.revoke(&delegation.id).unwrap();
    // Unknown ids surface a store error.
    assert!(m.revoke("no-such-delegation").is_err());
}

#[test]
fn projection_is_the_scope_cartesian_product() {
    let clock = Arc::new(FixedClock::at(1_000));
    let m = manager(clock);
    let b = Subject::new("user:b");
    m.delegate(
        &Subject::new("user:a"),
        &b,
        DelegationScope::new(["document:42", "report:7"], ["read", "edit"]),
        None,
        false,
        Attributes::new(),
    )
    .unwrap();

    let mut rules = m.to_policy_rules(&b).unwrap();
    rules.sort_by(|x, y| x.signature().cmp(&y.signature()));
    assert_eq!(rules.len(), 4);
    for rule in &rules {
        assert_eq!(rule.subject, "user:b");
        assert_eq!(rule.effect, Effect::Allow);
        assert_eq!(rule.priority, DELEGATED_RULE_PRIORITY);
    }
    let pairs: Vec<(&str, &str)> = rules
        .iter()
        .map(|r| (r.resource.as_deref().unwrap_or_default(), r.action.as_str()))
        .collect();
    assert!(pairs.contains(&("document:42", "read")));
    assert!(pairs.contains(&("document:42", "edit")));
    assert!(pairs.contains(&("report:7", "read")));
    assert!(pairs.contains(&("report:7", "edit")));
}

#[test]
fn wait_then_sweep_transitions_to_expired() {
    let clock = Arc::new(FixedClock::at(1_000));
    let store = Arc::new(InMemoryDelegationStore::new());
    let loader = Arc::new(StaticPolicyLoader::new().with_policy(
        "document:42",
        Policy::from_rules(vec![PolicyRule::new(
            "user:a",
            Some("document:42"),
            "edit",
            Effect::Allow,
        )]),
    ));
    let validator = DelegationValidator::new(
        loader,
        PolicyEvaluator::new(Arc::new(AclMatcher)),
        store.clone(),
        clock.clone(),
    );
    let m = DelegationManager::new(validator, store.clone(), clock.clone());
    m.delegate(
        &Subject::new("user:a"),
        &Subject::new("user:b"),
        DelegationScope::new(["document:42"], ["edit"]),
        Some(5_000),
        false,
        Attributes::new(),
    )
    .unwrap();

    clock.set_ms(6_000);
    assert_eq!(store.sweep_expired(clock.now_ms()).unwrap(), 1);
    assert!(store.active_for_delegate("user:b").unwrap().is_empty());
}
