//! Typed error taxonomy. The engine never raises opaque strings.

use thiserror::Error;

/// Boxed source error carried from a capability implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the engine.
///
/// Propagation policy: matching failures are local (a rule with an
/// unparseable pattern is skipped, never aborting the request), ABAC
/// condition failures collapse to a non-match, and capability errors pass
/// through to the caller unchanged as `Loader`/`Store` sources.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The policy loader capability failed; the source is untouched.
    #[error("policy loader failed")]
    Loader(#[source] BoxError),

    /// The delegation store capability failed; the source is untouched.
    #[error("delegation store failed")]
    Store(#[source] BoxError),

    /// A delegation was rejected by validation. Nothing was persisted.
    #[error("delegation rejected: {0}")]
    DelegationRejected(DelegationDenial),

    /// A rule pattern was not parseable by the selected matcher. Non-fatal:
    /// the offending rule is treated as non-matching.
    #[error("malformed pattern '{pattern}': {reason}")]
    MalformedPattern {
        /// The offending pattern text.
        pattern: String,
        /// Why it failed to parse.
        reason: String,
    },

    /// The engine was configured with an unknown matcher name, an
    /// unresolvable `extends` chain, or similar.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EngineError {
    /// Wrap a capability error from the policy loader.
    pub fn loader(source: impl Into<BoxError>) -> Self {
        Self::Loader(source.into())
    }

    /// Wrap a capability error from the delegation store.
    pub fn store(source: impl Into<BoxError>) -> Self {
        Self::Store(source.into())
    }
}

/// Why a delegation failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegationDenial {
    /// The delegator does not itself hold a permission the scope grants.
    #[error("delegator lacks '{action}' on '{resource}'")]
    PermissionNotHeld {
        /// Scope resource pattern that failed containment.
        resource: String,
        /// Scope action pattern that failed containment.
        action: String,
    },

    /// Creating the delegation would close a cycle in the transitive
    /// delegation graph.
    #[error("delegating from '{delegator}' to '{delegate}' would close a cycle")]
    CycleDetected {
        /// The would-be delegator.
        delegator: String,
        /// The would-be delegate.
        delegate: String,
    },

    /// The expiry is not in the future.
    #[error("expiry {expires_at_ms}ms is not in the future")]
    AlreadyExpired {
        /// The rejected expiry, milliseconds since epoch.
        expires_at_ms: u64,
    },

    /// The expiry exceeds the configured maximum duration.
    #[error("expiry exceeds the configured cap of {max_days} days")]
    ExceedsMaxDuration {
        /// The configured cap.
        max_days: u32,
    },

    /// An open-ended delegation was requested while a duration cap is
    /// configured.
    #[error("open-ended delegation requires no duration cap to be configured")]
    MissingExpiry,

    /// Cycle traversal gave up before completing; the delegation is refused
    /// rather than accepted unverified.
    #[error("delegation graph traversal exceeded depth {max_depth}")]
    TraversalDepthExceeded {
        /// The configured traversal bound.
        max_depth: usize,
    },
}

impl From<DelegationDenial> for EngineError {
    fn from(denial: DelegationDenial) -> Self {
        Self::DelegationRejected(denial)
    }
}
