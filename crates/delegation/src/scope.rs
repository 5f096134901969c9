//! Delegation scopes: which resources and actions a grant covers.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use warden_core::{Domain, EngineError};

/// The resource/action coverage of a delegation.
///
/// Patterns are globs (`*` any run of characters, `?` one character,
/// `[class]` a character set), matched case-sensitively. The scope covers a
/// request when at least one resource pattern and at least one action
/// pattern match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationScope {
    /// Resource-id patterns.
    pub resources: Vec<String>,
    /// Action-name patterns.
    pub actions: Vec<String>,
    /// Optional tenant partition the grant is confined to.
    #[serde(default)]
    pub domain: Option<Domain>,
}

impl DelegationScope {
    /// A scope over the given resource and action patterns.
    pub fn new<R, A>(resources: R, actions: A) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            actions: actions.into_iter().map(Into::into).collect(),
            domain: None,
        }
    }

    /// Confine the scope to a domain, consuming and returning it.
    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Whether the scope covers `(resource_id, action)`.
    pub fn matches(&self, resource_id: &str, action: &str) -> bool {
        self.resources.iter().any(|p| glob_match(p, resource_id))
            && self.actions.iter().any(|p| glob_match(p, action))
    }

    /// Validate every pattern in the scope.
    ///
    /// Matching treats an unparseable pattern as covering nothing; hosts
    /// that want the structured warning call this at authoring time.
    pub fn check(&self) -> Result<(), EngineError> {
        for pattern in self.resources.iter().chain(self.actions.iter()) {
            if let Err(e) = Pattern::new(pattern) {
                return Err(EngineError::MalformedPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Glob match; a pattern that fails to parse matches nothing.
pub(crate) fn glob_match(pattern: &str, value: &str) -> bool {
    Pattern::new(pattern).map(|p| p.matches(value)).unwrap_or(false)
}
