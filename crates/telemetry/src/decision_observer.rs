//! Decision observers: forward engine decisions to host telemetry.

use evaluator::{Decision, DecisionObserver};
use warden_core::Effect;

fn effect_str(effect: Effect) -> &'static str {
    match effect {
        Effect::Allow => "allow",
        Effect::Deny => "deny",
    }
}

/// Emits one `tracing` event per decision.
///
/// Cheap and non-blocking; pairs with [`crate::init_json_logging`] for
/// structured JSON output.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDecisionObserver;

impl DecisionObserver for TracingDecisionObserver {
    fn on_decision(&self, phase: &str, decision: &Decision) {
        tracing::debug!(
            phase,
            effect = effect_str(decision.effect),
            matched = decision.matched,
            deciding_rule = decision.deciding_rule.as_deref(),
            "authorization decision"
        );
    }
}

#[cfg(feature = "otel")]
pub mod otel {
    //! OTel-backed observer: a low-cardinality decision counter.
    #![allow(clippy::module_name_repetitions)]

    use super::effect_str;
    use evaluator::{Decision, DecisionObserver};
    use once_cell::sync::OnceCell;
    use opentelemetry::global;
    use opentelemetry::metrics::{Counter, Meter};
    use opentelemetry::KeyValue;

    struct Instruments {
        counter: Counter<u64>,
    }

    static INSTR: OnceCell<Instruments> = OnceCell::new();

    fn ensure_instruments() -> &'static Instruments {
        INSTR.get_or_init(|| {
            // Use the global meter provider (a no-op unless the host wired one).
            let meter: Meter = global::meter("warden.evaluator");
            let counter = meter
                .u64_counter("authz.decision.count")
                .with_description("Authorization decision counter")
                .init();
            Instruments { counter }
        })
    }

    /// Counts decisions as `authz.decision.count{phase, effect}`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct OtelDecisionObserver;

    impl DecisionObserver for OtelDecisionObserver {
        fn on_decision(&self, phase: &str, decision: &Decision) {
            let inst = ensure_instruments();
            let attrs = [
                KeyValue::new("phase", phase.to_string()),
                KeyValue::new("effect", effect_str(decision.effect).to_string()),
            ];
            inst.counter.add(1, &attrs);
        }
    }

    /// Return an observer instance, initializing the instruments once.
    pub fn global() -> OtelDecisionObserver {
        let _ = ensure_instruments();
        OtelDecisionObserver
    }
}
