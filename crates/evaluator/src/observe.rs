//! In-process decision observability.
//!
//! The engine never logs. What it offers instead is a process-global
//! observer hook, a low-cardinality decision counter registry, and an audit
//! sink — all in-memory, all optional, all installed by the host.
//! [`crate::Simulator`] bypasses every hook here by design.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use warden_core::Effect;

/// A single authorization decision as observers see it.
#[derive(Debug, Clone)]
pub struct Decision {
    /// The resolved effect.
    pub effect: Effect,
    /// How many rules matched.
    pub matched: usize,
    /// Signature of the rule that settled the outcome: the first deny in
    /// priority order, else the first allow. `None` on default-deny.
    pub deciding_rule: Option<String>,
}

/// Observer invoked for each decision the evaluator emits.
///
/// Implementations must be cheap and non-blocking; avoid I/O on hot paths.
/// The phase is `"evaluate"` for single decisions and `"batch"` for each
/// per-resource decision inside a batch.
pub trait DecisionObserver: Send + Sync {
    /// Called with the evaluation phase and the decision.
    fn on_decision(&self, phase: &str, decision: &Decision);
}

static OBSERVER: OnceLock<RwLock<Option<Arc<dyn DecisionObserver>>>> = OnceLock::new();

/// Install or clear the process-global decision observer.
pub fn set_observer(observer: Option<Box<dyn DecisionObserver>>) {
    let cell = OBSERVER.get_or_init(|| RwLock::new(None));
    let mut w = cell.write().expect("observer write lock poisoned");
    *w = observer.map(Arc::from);
}

/// In-process counters for decisions keyed by `{phase, effect}`.
///
/// Low-cardinality by construction; intended for tests and local
/// observability, not persisted anywhere.
#[derive(Default)]
pub struct DecisionMetrics {
    inner: Arc<Mutex<HashMap<String, u64>>>,
}

impl DecisionMetrics {
    /// Read the current count for a `{phase, effect}` pair.
    pub fn decision_counter(&self, phase: &str, effect: Effect) -> u64 {
        let key = format!("{}:{}", phase, effect_str(effect));
        self.inner.lock().expect("metrics lock poisoned").get(&key).copied().unwrap_or(0)
    }

    fn inc(&self, phase: &str, effect: Effect) {
        let mut g = self.inner.lock().expect("metrics lock poisoned");
        *g.entry(format!("{}:{}", phase, effect_str(effect))).or_insert(0) += 1;
    }
}

fn effect_str(effect: Effect) -> &'static str {
    match effect {
        Effect::Allow => "allow",
        Effect::Deny => "deny",
    }
}

static METRICS: OnceLock<DecisionMetrics> = OnceLock::new();

/// Access the global decision metrics registry.
pub fn decision_metrics() -> &'static DecisionMetrics {
    METRICS.get_or_init(DecisionMetrics::default)
}

/// Audit record for a single decision.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// Evaluation phase (`evaluate` or `batch`).
    pub phase: String,
    /// The resolved effect.
    pub effect: Effect,
    /// Matching-rule count.
    pub matched: usize,
    /// Signature of the deciding rule, if any.
    pub deciding_rule: Option<String>,
}

/// Handle for draining captured audit records. Cheap to clone; thread-safe.
#[derive(Clone)]
pub struct AuditSink {
    inner: Arc<Mutex<Vec<AuditRecord>>>,
}

impl AuditSink {
    /// Drain and return all captured records.
    pub fn drain(&self) -> Vec<AuditRecord> {
        let mut g = self.inner.lock().expect("audit lock poisoned");
        std::mem::take(&mut *g)
    }
}

static AUDIT: OnceLock<AuditSink> = OnceLock::new();

/// Install (or retrieve) the process-global audit sink.
pub fn install_audit_sink() -> AuditSink {
    if let Some(s) = AUDIT.get() {
        return s.clone();
    }
    let sink = AuditSink { inner: Arc::new(Mutex::new(Vec::new())) };
    let _ = AUDIT.set(sink.clone());
    sink
}

/// Fan one decision out to metrics, the observer, and the audit sink.
pub(crate) fn notify(phase: &str, decision: &Decision) {
    decision_metrics().inc(phase, decision.effect);
    if let Some(lock) = OBSERVER.get() {
        if let Ok(r) = lock.read() {
            if let Some(obs) = r.as_ref() {
                obs.on_decision(phase, decision);
            }
        }
    }
    if let Some(sink) = AUDIT.get() {
        let mut g = sink.inner.lock().expect("audit lock poisoned");
        g.push(AuditRecord {
            phase: phase.to_owned(),
            effect: decision.effect,
            matched: decision.matched,
            deciding_rule: decision.deciding_rule.clone(),
        });
    }
}
