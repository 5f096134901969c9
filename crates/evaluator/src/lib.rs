//! The evaluation pipeline: match, resolve, decide.
//!
//! [`PolicyEvaluator`] walks a policy's rules through a matcher and collapses
//! the matches under deny-override: no matches is a deny, any matching deny
//! is a deny, otherwise allow. Around that single decision sit
//! [`BatchPolicyEvaluator`] (one loader call, N decisions),
//! [`inherit`] (path-based and named policy inheritance),
//! [`compare`] (signature-based diffing), and [`Simulator`]
//! (side-effect-free timed evaluation).
//!
//! The pipeline is synchronous and side-effect-free apart from clock reads
//! inside ABAC conditions; every part is safe to call from multiple threads
//! on the same immutable inputs. Decisions are reported to an optional
//! in-process observer — the engine itself never logs.

#![deny(unsafe_code)]

pub mod batch;
pub mod diff;
pub mod evaluate;
pub mod inherit;
pub mod observe;
pub mod resolve;
pub mod simulate;

pub use batch::BatchPolicyEvaluator;
pub use diff::{compare, PolicyDiff};
pub use evaluate::PolicyEvaluator;
pub use inherit::{expand_inherited_rules, resolve_extends};
pub use observe::{
    decision_metrics, install_audit_sink, set_observer, AuditRecord, AuditSink, Decision,
    DecisionMetrics, DecisionObserver,
};
pub use resolve::{by_priority_desc, resolve_effect};
pub use simulate::{SimulationResult, Simulator};
