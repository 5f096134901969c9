//! Clock capability: every timestamp comparison in the engine goes through
//! this trait so tests can pin time to a fixed instant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in milliseconds since the UNIX epoch.
pub trait Clock: Send + Sync {
    /// Milliseconds since the UNIX epoch.
    fn now_ms(&self) -> u64;

    /// Whole seconds since the UNIX epoch (what `request.time` reads).
    fn now_secs(&self) -> u64 {
        self.now_ms() / 1000
    }
}

/// Production clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Manually controlled clock for deterministic tests.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicU64,
}

impl FixedClock {
    /// A clock pinned at `start_ms`.
    pub fn at(start_ms: u64) -> Self {
        Self { now_ms: AtomicU64::new(start_ms) }
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Pin the clock to an absolute instant.
    pub fn set_ms(&self, value: u64) {
        self.now_ms.store(value, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_deterministic() {
        let clk = FixedClock::at(1_000);
        assert_eq!(clk.now_ms(), 1_000);
        clk.advance_ms(5);
        assert_eq!(clk.now_ms(), 1_005);
        clk.set_ms(42);
        assert_eq!(clk.now_ms(), 42);
    }

    #[test]
    fn seconds_truncate_milliseconds() {
        let clk = FixedClock::at(1_999);
        assert_eq!(clk.now_secs(), 1);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clk = SystemClock;
        let a = clk.now_ms();
        let b = clk.now_ms();
        assert!(b >= a);
    }
}
