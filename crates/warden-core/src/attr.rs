//! Dynamic attribute values carried by subjects, resources, and domains.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An attribute bag. Keys are attribute names; iteration order is stable.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A dynamically typed attribute value.
///
/// Subjects and resources carry untyped key/value bags; this enum is the
/// closed set of shapes those values may take. Equality is strict: two values
/// are equal only when both the variant and the payload agree, so
/// `Int(1) != Float(1.0)`. Ordering comparisons are looser and treat the two
/// numeric variants as one numeric class (see [`AttrValue::compare`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean flag (e.g. `superuser`).
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Ordered sequence of values (e.g. `roles`).
    Seq(Vec<AttrValue>),
    /// Nested mapping.
    Map(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// Borrow the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Read the value as a float, widening integers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the value as a sequence, if it is one.
    pub fn as_seq(&self) -> Option<&[AttrValue]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Order two values when they belong to a comparable class.
    ///
    /// Numbers compare numerically across `Int`/`Float`; strings compare
    /// lexically. Everything else (and any cross-class pair) is incomparable
    /// and yields `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_number()?.partial_cmp(&other.as_number()?)
            }
            _ => None,
        }
    }

    /// Membership test: does this sequence contain `item`?
    ///
    /// Returns `None` when the receiver is not a sequence.
    pub fn contains(&self, item: &Self) -> Option<bool> {
        self.as_seq().map(|items| items.contains(item))
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(v: Vec<AttrValue>) -> Self {
        Self::Seq(v)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(v: Vec<&str>) -> Self {
        Self::Seq(v.into_iter().map(Into::into).collect())
    }
}
