use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Add `n` to a counter, pinning at `u64::MAX` instead of wrapping
fn saturating_add(counter: &AtomicU64, n: u64) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_add(n)));
}

/// Process-wide service counters, shared by handle between requests
#[derive(Debug, Default)]
pub struct ServiceStats {
    recommendations_served: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    analyses_performed: AtomicU64,
    fallbacks_used: AtomicU64,
    failed_requests: AtomicU64,
    empty_responses: AtomicU64,
    strategy_failures: AtomicU64,
    total_response_micros: AtomicU64,
}

impl ServiceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_served(&self, elapsed: Duration) {
        saturating_add(&self.recommendations_served, 1);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        saturating_add(&self.total_response_micros, micros);
    }

    pub fn record_cache_hit(&self) {
        saturating_add(&self.cache_hits, 1);
    }

    pub fn record_cache_miss(&self) {
        saturating_add(&self.cache_misses, 1);
    }

    /// One cultural context computed, by the analyzer or the fallback
    pub fn record_analysis(&self) {
        saturating_add(&self.analyses_performed, 1);
    }

    pub fn record_fallback(&self) {
        saturating_add(&self.fallbacks_used, 1);
    }

    pub fn record_failed_request(&self) {
        saturating_add(&self.failed_requests, 1);
    }

    pub fn record_empty_response(&self) {
        saturating_add(&self.empty_responses, 1);
    }

    pub fn record_strategy_failure(&self) {
        saturating_add(&self.strategy_failures, 1);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let served = self.recommendations_served.load(Ordering::Relaxed);
        let micros = self.total_response_micros.load(Ordering::Relaxed);
        let avg_response_time_ms = if served == 0 {
            0.0
        } else {
            micros as f64 / served as f64 / 1000.0
        };

        StatsSnapshot {
            recommendations_served: served,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            analyses_performed: self.analyses_performed.load(Ordering::Relaxed),
            fallbacks_used: self.fallbacks_used.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            empty_responses: self.empty_responses.load(Ordering::Relaxed),
            strategy_failures: self.strategy_failures.load(Ordering::Relaxed),
            avg_response_time_ms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub recommendations_served: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub analyses_performed: u64,
    pub fallbacks_used: u64,
    pub failed_requests: u64,
    pub empty_responses: u64,
    pub strategy_failures: u64,
    pub avg_response_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_saturate() {
        let stats = ServiceStats::new();
        stats.analyses_performed.store(u64::MAX - 1, Ordering::Relaxed);
        stats.record_analysis();
        stats.record_analysis();
        stats.record_analysis();
        assert_eq!(stats.snapshot().analyses_performed, u64::MAX);
    }

    #[test]
    fn test_average_response_time() {
        let stats = ServiceStats::new();
        assert_eq!(stats.snapshot().avg_response_time_ms, 0.0);
        stats.record_served(Duration::from_millis(10));
        stats.record_served(Duration::from_millis(30));
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.recommendations_served, 2);
        assert!((snapshot.avg_response_time_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let stats = Arc::new(ServiceStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_cache_hit();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.snapshot().cache_hits, 8000);
    }
}
