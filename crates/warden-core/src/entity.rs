//! The entities an authorization request is made of.

use crate::attr::{AttrValue, Attributes};
use serde::{Deserialize, Serialize};

/// The party requesting access.
///
/// Subjects are produced by a host-side resolver and never mutated by the
/// engine. Well-known attributes: `roles` (sequence of strings, consulted by
/// the RBAC matcher) and `superuser` (bool, consulted by the ACL matcher for
/// `"*"` rules). Everything else is free-form ABAC material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Opaque subject identifier (e.g. `user:123`).
    pub id: String,
    /// Free-form attribute bag.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Subject {
    /// Construct a subject with an empty attribute bag.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), attributes: Attributes::new() }
    }

    /// Attach an attribute, consuming and returning the subject.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Whether the subject carries `superuser: true`.
    pub fn is_superuser(&self) -> bool {
        self.attribute("superuser").and_then(AttrValue::as_bool).unwrap_or(false)
    }

    /// Whether the subject's `roles` attribute contains `role` verbatim.
    pub fn has_role(&self, role: &str) -> bool {
        self.attribute("roles")
            .and_then(AttrValue::as_seq)
            .is_some_and(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
    }
}

/// The thing access is requested to.
///
/// Ids follow a colon-delimited `type:instance` convention (`document:42`)
/// and a slash-delimited path convention for hierarchy
/// (`folder:5/document:42`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Opaque resource identifier.
    pub id: String,
    /// Resource type (the `document` in `document:42`).
    pub kind: String,
    /// Free-form attribute bag.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Resource {
    /// Construct a resource with an explicit type.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { id: id.into(), kind: kind.into(), attributes: Attributes::new() }
    }

    /// Construct a resource deriving the type from the id's leading
    /// colon-delimited segment (`document:42` has type `document`).
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let kind = id.split(':').next().unwrap_or_default().to_owned();
        Self { id, kind, attributes: Attributes::new() }
    }

    /// Attach an attribute, consuming and returning the resource.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

/// The operation being attempted.
///
/// Plain verbs (`read`) for ACL/RBAC/ABAC policies; `"METHOD /path"` strings
/// (`GET /api/docs`) activate RESTful matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name.
    pub name: String,
}

impl Action {
    /// Construct an action.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A multi-tenant partition for rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Opaque domain identifier.
    pub id: String,
    /// Free-form attribute bag.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Domain {
    /// Construct a domain with an empty attribute bag.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), attributes: Attributes::new() }
    }
}
