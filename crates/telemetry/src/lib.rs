//! Observability adapters for hosts embedding the engine.
//!
//! The engine itself never logs — it only returns values and errors, and
//! reports decisions to an in-process observer hook. This crate is the
//! host-side half: structured-logging initialization and observer
//! implementations that forward decisions to `tracing` (always available)
//! or OpenTelemetry counters (behind the `otel` feature).

#![deny(unsafe_code)]

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

pub mod decision_observer;

#[cfg(feature = "otel")]
pub use decision_observer::otel::OtelDecisionObserver;
pub use decision_observer::TracingDecisionObserver;

/// Errors raised while wiring observability.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// OpenTelemetry setup failed.
    #[error("otel setup failed: {0}")]
    Otel(String),
}

/// Initialize structured logging (JSON) with env filter.
/// Set `RUST_LOG`, e.g. `"info,evaluator=debug"`.
pub fn init_json_logging() {
    let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Install the `tracing`-backed decision observer process-wide.
pub fn install_tracing_observer() {
    evaluator::set_observer(Some(Box::new(TracingDecisionObserver)));
}
