/// Instrumentation for the occlusion hot path
/// Global call counters, compiled in only with the `profiling` feature
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for function call tracking
pub struct FunctionCounters {
    // Query / write entry points
    pub boxes_tested: AtomicU64,
    pub boxes_visible: AtomicU64,
    pub boxes_drawn: AtomicU64,

    // Face handling
    pub faces_rasterized: AtomicU64,
    pub faces_clipped: AtomicU64,
    pub faces_unevaluable: AtomicU64,

    // Rasterization
    pub triangles_rasterized: AtomicU64,
    pub triangles_rejected: AtomicU64,
    pub bins_tested: AtomicU64,
    pub bins_drawn: AtomicU64,

    pub bitmask_clear_calls: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            boxes_tested: AtomicU64::new(0),
            boxes_visible: AtomicU64::new(0),
            boxes_drawn: AtomicU64::new(0),
            faces_rasterized: AtomicU64::new(0),
            faces_clipped: AtomicU64::new(0),
            faces_unevaluable: AtomicU64::new(0),
            triangles_rasterized: AtomicU64::new(0),
            triangles_rejected: AtomicU64::new(0),
            bins_tested: AtomicU64::new(0),
            bins_drawn: AtomicU64::new(0),
            bitmask_clear_calls: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 11] {
        [
            &self.boxes_tested,
            &self.boxes_visible,
            &self.boxes_drawn,
            &self.faces_rasterized,
            &self.faces_clipped,
            &self.faces_unevaluable,
            &self.triangles_rasterized,
            &self.triangles_rejected,
            &self.bins_tested,
            &self.bins_drawn,
            &self.bitmask_clear_calls,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            boxes_tested: self.boxes_tested.load(Ordering::Relaxed),
            boxes_visible: self.boxes_visible.load(Ordering::Relaxed),
            boxes_drawn: self.boxes_drawn.load(Ordering::Relaxed),
            faces_rasterized: self.faces_rasterized.load(Ordering::Relaxed),
            faces_clipped: self.faces_clipped.load(Ordering::Relaxed),
            faces_unevaluable: self.faces_unevaluable.load(Ordering::Relaxed),
            triangles_rasterized: self.triangles_rasterized.load(Ordering::Relaxed),
            triangles_rejected: self.triangles_rejected.load(Ordering::Relaxed),
            bins_tested: self.bins_tested.load(Ordering::Relaxed),
            bins_drawn: self.bins_drawn.load(Ordering::Relaxed),
            bitmask_clear_calls: self.bitmask_clear_calls.load(Ordering::Relaxed),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub boxes_tested: u64,
    pub boxes_visible: u64,
    pub boxes_drawn: u64,
    pub faces_rasterized: u64,
    pub faces_clipped: u64,
    pub faces_unevaluable: u64,
    pub triangles_rasterized: u64,
    pub triangles_rejected: u64,
    pub bins_tested: u64,
    pub bins_drawn: u64,
    pub bitmask_clear_calls: u64,
}

impl CounterSnapshot {
    /// Log a formatted report at info level
    pub fn log_report(&self) {
        log::info!("=== Occlusion Counters ===");
        log::info!(
            "boxes: tested {:10}  visible {:10}  drawn {:10}",
            self.boxes_tested,
            self.boxes_visible,
            self.boxes_drawn
        );
        if self.boxes_tested > 0 {
            let culled = self.boxes_tested - self.boxes_visible.min(self.boxes_tested);
            log::info!(
                "cull rate: {:6.2}%",
                culled as f64 / self.boxes_tested as f64 * 100.0
            );
        }
        log::info!(
            "faces: rasterized {:10}  clipped {:10}  unevaluable {:6}",
            self.faces_rasterized,
            self.faces_clipped,
            self.faces_unevaluable
        );
        log::info!(
            "triangles: {:10} (rejected {:10})",
            self.triangles_rasterized,
            self.triangles_rejected
        );
        log::info!(
            "bins: tested {:10}  drawn {:10}  clears {:6}",
            self.bins_tested,
            self.bins_drawn,
            self.bitmask_clear_calls
        );
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Increment a counter (only when the profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        #[cfg(not(feature = "profiling"))]
        {
            let _ = &$counter;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_every_counter() {
        let counters = FunctionCounters::new();
        for counter in counters.all() {
            counter.fetch_add(3, Ordering::Relaxed);
        }
        assert_eq!(counters.snapshot().bins_drawn, 3);

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
