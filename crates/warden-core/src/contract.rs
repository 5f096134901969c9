//! Capability contracts the engine consumes.
//!
//! The core does no I/O of its own: policies, delegations, subjects, and
//! rate-limit state all arrive through these traits. Hosts implement them
//! over whatever storage and framework they run; the engine treats each call
//! as a synchronous function at the interface level.

use crate::entity::{Resource, Subject};
use crate::error::EngineError;
use crate::policy::Policy;
use std::collections::HashMap;

/// Supplies the policies governing a subject's access to resources.
pub trait PolicyLoader: Send + Sync {
    /// The policy governing `subject`'s access to `resource`. A resource
    /// with no stored policy yields the empty policy (which denies).
    fn policy_for(&self, subject: &Subject, resource: &Resource) -> Result<Policy, EngineError>;

    /// Policies for many resources in one call, keyed by resource id.
    ///
    /// Implementations should override this with a genuine batched fetch;
    /// the default degrades to one `policy_for` call per resource. Missing
    /// entries imply the empty policy; at most one policy per resource.
    fn policies_for_batch(
        &self,
        subject: &Subject,
        resources: &[Resource],
    ) -> Result<HashMap<String, Policy>, EngineError> {
        let mut out = HashMap::with_capacity(resources.len());
        for resource in resources {
            out.insert(resource.id.clone(), self.policy_for(subject, resource)?);
        }
        Ok(out)
    }
}

/// Resolves a host-specific request context into a [`Subject`].
///
/// The engine never inspects the context; it is opaque JSON the host
/// assembles from its session, token, or framework request.
pub trait SubjectResolver: Send + Sync {
    /// Produce the subject making the request described by `context`.
    fn resolve(&self, context: &serde_json::Value) -> Result<Subject, EngineError>;
}

/// Optional throttling capability, enforced above the core.
pub trait RateLimiter: Send + Sync {
    /// Record an attempt under `key`; `false` when the key is saturated.
    fn attempt(&self, key: &str, max_attempts: u32, decay_secs: u64) -> bool;

    /// Seconds until `key` has capacity again.
    fn available_in(&self, key: &str) -> u64;
}

/// A fixed in-memory policy table, keyed by resource id.
///
/// The reference [`PolicyLoader`]: embedders hand it the full policy set up
/// front and the engine runs without any external infrastructure. Nothing is
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyLoader {
    policies: HashMap<String, Policy>,
}

impl StaticPolicyLoader {
    /// An empty table; every lookup yields the empty (denying) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `policy` for `resource_id`, consuming and returning the
    /// loader.
    #[must_use]
    pub fn with_policy(mut self, resource_id: impl Into<String>, policy: Policy) -> Self {
        self.policies.insert(resource_id.into(), policy);
        self
    }
}

impl PolicyLoader for StaticPolicyLoader {
    fn policy_for(&self, _subject: &Subject, resource: &Resource) -> Result<Policy, EngineError> {
        Ok(self.policies.get(&resource.id).cloned().unwrap_or_default())
    }

    fn policies_for_batch(
        &self,
        _subject: &Subject,
        resources: &[Resource],
    ) -> Result<HashMap<String, Policy>, EngineError> {
        Ok(resources
            .iter()
            .filter_map(|r| self.policies.get(&r.id).map(|p| (r.id.clone(), p.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Effect, PolicyRule};

    #[test]
    fn missing_resource_yields_empty_policy() {
        let loader = StaticPolicyLoader::new();
        let p = loader.policy_for(&Subject::new("u"), &Resource::from_id("doc:1")).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn resolver_contract_is_host_shaped() {
        // A resolver reads whatever context shape its host produces; the
        // engine only sees the resulting subject.
        struct SessionResolver;
        impl SubjectResolver for SessionResolver {
            fn resolve(&self, context: &serde_json::Value) -> Result<Subject, EngineError> {
                let id = context
                    .get("session")
                    .and_then(|s| s.get("user_id"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        EngineError::InvalidConfiguration("context lacks session.user_id".into())
                    })?;
                Ok(Subject::new(id))
            }
        }

        let resolver = SessionResolver;
        let context = serde_json::json!({"session": {"user_id": "user:9"}});
        assert_eq!(resolver.resolve(&context).unwrap().id, "user:9");
        assert!(resolver.resolve(&serde_json::json!({})).is_err());
    }

    #[test]
    fn batch_omits_unknown_resources() {
        let loader = StaticPolicyLoader::new().with_policy(
            "doc:1",
            Policy::from_rules(vec![PolicyRule::new("u", Some("doc:1"), "read", Effect::Allow)]),
        );
        let out = loader
            .policies_for_batch(
                &Subject::new("u"),
                &[Resource::from_id("doc:1"), Resource::from_id("doc:2")],
            )
            .unwrap();
        assert!(out.contains_key("doc:1"));
        assert!(!out.contains_key("doc:2"));
    }
}
