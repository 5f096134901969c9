//! Warden core primitives: the authorization value layer, the typed error
//! taxonomy, and the capability contracts the engine consumes.
//!
//! Everything in this crate is immutable once constructed. Builders consume
//! and return values; nothing mutates in place after construction. The engine
//! proper (matchers, evaluators, delegation) lives in sibling crates and
//! treats these types as plain data.

#![deny(unsafe_code)]

/// Version of the warden core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attr;
pub mod clock;
pub mod contract;
pub mod entity;
pub mod error;
pub mod policy;
pub mod rule;

pub use attr::{AttrValue, Attributes};
pub use clock::{Clock, FixedClock, SystemClock};
pub use contract::{PolicyLoader, RateLimiter, StaticPolicyLoader, SubjectResolver};
pub use entity::{Action, Domain, Resource, Subject};
pub use error::{DelegationDenial, EngineError};
pub use policy::Policy;
pub use rule::{ConditionalPolicyRule, Effect, PolicyRule, Priority};
