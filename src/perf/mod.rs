/// Performance measurement utilities
/// Scoped timers and per-function counters for the occlusion path
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};

use std::time::{Duration, Instant};

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
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

impl Drop for PerfTimer {
    fn drop(&mut self) {
        log::debug!("[PERF] {}: {}μs", self.name, self.elapsed().as_micros());
    }
}

/// Per-frame occlusion statistics, kept by each occluder.
///
/// Unlike [`FUNCTION_COUNTERS`] these are always on and only count
/// whole-operation events, never per-pixel work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcclusionStats {
    pub boxes_tested: u32,
    pub boxes_visible: u32,
    pub boxes_drawn: u32,
    pub triangles_rasterized: u32,
    pub faces_clipped: u32,
    pub faces_unevaluable: u32,
}

impl OcclusionStats {
    pub fn boxes_culled(&self) -> u32 {
        self.boxes_tested - self.boxes_visible
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}
