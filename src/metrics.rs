use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

/// Rolling login-performance counters served by
/// `GET /api/metrics/login-performance`.
#[derive(Default)]
pub struct LoginMetrics {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    last_10_times: VecDeque<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LoginMetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_10_times: Vec<f64>,
    pub avg_time: f64,
}

impl LoginMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time a login-path operation and record its outcome.
    pub fn record<T, E>(&self, started: Instant, result: &Result<T, E>) {
        let elapsed = started.elapsed().as_secs_f64();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.total_requests += 1;
        match result {
            Ok(_) => inner.successful_requests += 1,
            Err(_) => inner.failed_requests += 1,
        }
        inner.last_10_times.push_back(elapsed);
        while inner.last_10_times.len() > 10 {
            inner.last_10_times.pop_front();
        }
    }

    pub fn snapshot(&self) -> LoginMetricsSnapshot {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let times: Vec<f64> = inner.last_10_times.iter().copied().collect();
        let avg_time = if times.is_empty() {
            0.0
        } else {
            times.iter().sum::<f64>() / times.len() as f64
        };
        LoginMetricsSnapshot {
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            last_10_times: times,
            avg_time,
        }
    }
}
