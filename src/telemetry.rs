//! Telemetry - diagnostic ring buffer and timing histograms

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hdrhistogram::Histogram;
use parking_lot::{Mutex, RwLock};

// ============================================================================
// DIAGNOSTIC LOG - Bounded flight recorder
// ============================================================================

#[derive(Clone)]
pub struct DiagnosticLog {
    entries: Arc<RwLock<VecDeque<String>>>,
    max_size: usize,
}

impl DiagnosticLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn write(&self, message: String) {
        let mut log = self.entries.write();
        log.push_back(message);
        if log.len() > self.max_size {
            log.pop_front();
        }
    }

    pub fn read_all(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    /// Most recent `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let log = self.entries.read();
        log.iter().skip(log.len().saturating_sub(n)).cloned().collect()
    }
}

// ============================================================================
// TICK METRICS - Loop timing histograms
// ============================================================================

#[derive(Clone)]
pub struct TickMetrics {
    control_hist: Arc<Mutex<Histogram<u64>>>,
    tick_hist: Arc<Mutex<Histogram<u64>>>,
    dispatch_hist: Arc<Mutex<Histogram<u64>>>,
    // Jitter tracking (variance between consecutive tick durations)
    last_tick_ns: Arc<AtomicU64>,
    jitter_hist: Arc<Mutex<Histogram<u64>>>,
}

impl TickMetrics {
    pub fn new() -> Self {
        Self {
            control_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            tick_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            dispatch_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
            last_tick_ns: Arc::new(AtomicU64::new(0)),
            jitter_hist: Arc::new(Mutex::new(Histogram::new(3).unwrap())),
        }
    }

    /// Per-channel controller computation time.
    pub fn record_control(&self, duration: Duration) {
        self.control_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// Whole-tick duration (all channels). Also feeds the jitter histogram.
    pub fn record_tick(&self, duration: Duration) {
        let nanos = duration.as_nanos() as u64;
        self.tick_hist.lock().record(nanos).ok();

        let last = self.last_tick_ns.swap(nanos, Ordering::Relaxed);
        if last > 0 {
            let jitter = last.abs_diff(nanos);
            self.jitter_hist.lock().record(jitter).ok();
        }
    }

    /// Latency from press issue to host-side consumption.
    pub fn record_dispatch(&self, duration: Duration) {
        self.dispatch_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    pub fn report(&self) -> MetricsReport {
        let control = self.control_hist.lock();
        let tick = self.tick_hist.lock();
        let dispatch = self.dispatch_hist.lock();
        let jitter = self.jitter_hist.lock();

        MetricsReport {
            control_p50: Duration::from_nanos(control.value_at_quantile(0.5)),
            control_p99: Duration::from_nanos(control.value_at_quantile(0.99)),
            tick_p50: Duration::from_nanos(tick.value_at_quantile(0.5)),
            tick_p99: Duration::from_nanos(tick.value_at_quantile(0.99)),
            dispatch_p50: Duration::from_nanos(dispatch.value_at_quantile(0.5)),
            dispatch_p99: Duration::from_nanos(dispatch.value_at_quantile(0.99)),
            jitter_p99: Duration::from_nanos(jitter.value_at_quantile(0.99)),
        }
    }
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct MetricsReport {
    pub control_p50: Duration,
    pub control_p99: Duration,
    pub tick_p50: Duration,
    pub tick_p99: Duration,
    pub dispatch_p50: Duration,
    pub dispatch_p99: Duration,
    pub jitter_p99: Duration,
}
