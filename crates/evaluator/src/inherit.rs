//! Policy inheritance: path-based expansion and named `extends` chains.
//!
//! The two axes are orthogonal and compose — resolve `extends` first, then
//! expand paths against the target resource.

use std::collections::HashSet;
use warden_core::{ConditionalPolicyRule, EngineError, Policy, Resource};

/// Path-based inheritance: synthesize child rules for `target` from rules
/// whose resource is a strict path-prefix of `target.id`.
///
/// Every original rule is preserved; for each rule with resource `r` such
/// that `target.id` starts with `r + "/"`, an additional copy targeting
/// `target.id` is appended. `None` and `"*"` resources never inherit.
pub fn expand_inherited_rules(policy: &Policy, target: &Resource) -> Policy {
    let mut rules: Vec<ConditionalPolicyRule> = policy.rules().to_vec();
    for rule in policy.rules() {
        let Some(prefix) = rule.resource.as_deref() else {
            continue;
        };
        if prefix == "*" {
            continue;
        }
        if target.id.len() > prefix.len() + 1
            && target.id.starts_with(prefix)
            && target.id.as_bytes()[prefix.len()] == b'/'
        {
            let mut child = rule.clone();
            child.resource = Some(target.id.clone());
            rules.push(child);
        }
    }
    let mut out = Policy::from_rules(rules);
    out.name = policy.name.clone();
    out.extends = policy.extends.clone();
    out
}

/// Resolve a policy's `extends` chain bottom-up.
///
/// `lookup` maps a policy name to its definition. The chain is walked to the
/// root and folded with [`Policy::inherit_from`], so the root's rules come
/// first and the derived policy's last. An unknown base or a cycle in the
/// chain is a configuration error.
pub fn resolve_extends<F>(policy: &Policy, lookup: F) -> Result<Policy, EngineError>
where
    F: Fn(&str) -> Option<Policy>,
{
    let mut seen: HashSet<String> = policy.name.iter().cloned().collect();
    let mut bases = Vec::new();
    let mut next = policy.extends.clone();
    while let Some(base_name) = next {
        if !seen.insert(base_name.clone()) {
            return Err(EngineError::InvalidConfiguration(format!(
                "inheritance cycle through policy '{base_name}'"
            )));
        }
        let base = lookup(&base_name).ok_or_else(|| {
            EngineError::InvalidConfiguration(format!("unknown base policy '{base_name}'"))
        })?;
        next = base.extends.clone();
        bases.push(base);
    }
    let mut merged = policy.clone();
    for base in bases {
        merged = merged.inherit_from(&base);
    }
    Ok(merged)
}
