//! Latency accounting for computed requests.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Summary over every latency sample recorded so far, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricsSnapshot {
    /// Number of samples.
    pub request_count: u64,
    /// Mean latency.
    pub avg_latency: f64,
    /// Slowest sample.
    pub max_latency: f64,
    /// Fastest sample.
    pub min_latency: f64,
}

/// Collects latency samples. History is unbounded: no windowing or decay.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    latencies: Mutex<Vec<Duration>>,
}

impl MetricsCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the time elapsed since `start`.
    pub fn record_latency(&self, start: Instant) {
        self.record(start.elapsed());
    }

    /// Records one latency sample.
    pub fn record(&self, latency: Duration) {
        self.latencies.lock().unwrap_or_else(PoisonError::into_inner).push(latency);
    }

    /// Computes the summary; all zeros when nothing was recorded.
    pub fn summary(&self) -> MetricsSnapshot {
        let latencies = self.latencies.lock().unwrap_or_else(PoisonError::into_inner);
        if latencies.is_empty() {
            return MetricsSnapshot::default();
        }

        let secs = latencies.iter().map(Duration::as_secs_f64);
        let total: f64 = secs.clone().sum();
        MetricsSnapshot {
            request_count: latencies.len() as u64,
            avg_latency: total / latencies.len() as f64,
            max_latency: secs.clone().fold(f64::MIN, f64::max),
            min_latency: secs.fold(f64::MAX, f64::min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_summary() {
        let metrics = MetricsCollector::new();
        assert_eq!(metrics.summary(), MetricsSnapshot::default());
    }

    #[test]
    fn test_summary_statistics() {
        let metrics = MetricsCollector::new();
        metrics.record(Duration::from_millis(100));
        metrics.record(Duration::from_millis(300));
        metrics.record(Duration::from_millis(200));

        let summary = metrics.summary();
        assert_eq!(summary.request_count, 3);
        assert!((summary.avg_latency - 0.2).abs() < 1e-9);
        assert!((summary.max_latency - 0.3).abs() < 1e-9);
        assert!((summary.min_latency - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_record_latency_measures_elapsed() {
        let metrics = MetricsCollector::new();
        let start = Instant::now();
        thread::sleep(Duration::from_millis(10));
        metrics.record_latency(start);

        let summary = metrics.summary();
        assert_eq!(summary.request_count, 1);
        assert!(summary.min_latency >= 0.01);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = Arc::new(MetricsCollector::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..250 {
                        metrics.record(Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.summary().request_count, 1000);
    }
}
