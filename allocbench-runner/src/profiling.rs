//! Timing instrumentation for the pipeline's coarse phases.
//!
//! The benchmark harness owns precise per-strategy timing; this module is
//! for the surrounding plumbing (load, simulate, export) when diagnosing a
//! slow run. Disabled unless `ALLOCBENCH_PROFILE=1`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

static PROFILING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Read `ALLOCBENCH_PROFILE` once at startup.
pub fn init() {
    let enabled = std::env::var("ALLOCBENCH_PROFILE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn is_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// A scope that logs its wall time on drop when profiling is enabled.
pub struct ProfileScope {
    name: &'static str,
    start: Instant,
}

impl ProfileScope {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if is_enabled() {
            eprintln!(
                "[PROFILE] {} took {:.3}ms",
                self.name,
                self.start.elapsed().as_secs_f64() * 1000.0
            );
        }
    }
}
