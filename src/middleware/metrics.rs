// Gateway metrics and monitoring middleware

use axum::{ extract::{ MatchedPath, Request, State }, middleware::Next, response::Response };
use std::{
    collections::HashMap,
    sync::{ Arc, Mutex, MutexGuard },
    time::{ Duration, Instant, SystemTime, UNIX_EPOCH },
};
use serde::{ Serialize, Deserialize };
use tracing::{ info, warn };

use crate::AppState;

const MAX_SAMPLES_PER_PATH: usize = 100;

/// Request counters shared by every handler
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<GatewayMetrics>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMetrics {
    pub request_count: HashMap<String, u64>,
    pub response_times: HashMap<String, Vec<u64>>, // milliseconds
    pub status_codes: HashMap<u16, u64>,
    pub error_count: u64,
    pub upstream_failures: HashMap<String, u64>,
    pub uptime_start: u64,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self {
            request_count: HashMap::new(),
            response_times: HashMap::new(),
            status_codes: HashMap::new(),
            error_count: 0,
            upstream_failures: HashMap::new(),
            uptime_start: unix_now(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GatewayMetrics> {
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a finished request
    pub fn record_request(&self, path: &str, status_code: u16, duration: Duration) {
        let mut metrics = self.lock();

        *metrics.request_count.entry(path.to_string()).or_insert(0) += 1;

        let times = metrics.response_times.entry(path.to_string()).or_default();
        times.push(duration.as_millis() as u64);
        if times.len() > MAX_SAMPLES_PER_PATH {
            let excess = times.len() - MAX_SAMPLES_PER_PATH;
            times.drain(0..excess);
        }

        *metrics.status_codes.entry(status_code).or_insert(0) += 1;

        if status_code >= 500 {
            metrics.error_count += 1;
            warn!("Server error on {}: {}", path, status_code);
        }
    }

    /// Record a request the Attendance Service could not answer properly
    pub fn record_upstream_failure(&self, route: &str) {
        let mut metrics = self.lock();
        *metrics.upstream_failures.entry(route.to_string()).or_insert(0) += 1;
    }

    /// Get current metrics snapshot
    pub fn get_metrics(&self) -> GatewayMetrics {
        self.lock().clone()
    }

    pub fn get_summary(&self) -> MetricsSummary {
        let metrics = self.lock();

        let total_requests: u64 = metrics.request_count.values().sum();
        let error_rate = if total_requests > 0 {
            ((metrics.error_count as f64) / (total_requests as f64)) * 100.0
        } else {
            0.0
        };

        let mut avg_response_times = HashMap::new();
        for (path, times) in &metrics.response_times {
            if !times.is_empty() {
                let avg = times.iter().sum::<u64>() / (times.len() as u64);
                avg_response_times.insert(path.clone(), avg);
            }
        }

        MetricsSummary {
            total_requests,
            error_rate,
            upstream_failures: metrics.upstream_failures.values().sum(),
            uptime_seconds: unix_now().saturating_sub(metrics.uptime_start),
            most_accessed_endpoints: top_entries(&metrics.request_count, 5),
            slowest_endpoints: top_entries(&avg_response_times, 5),
            avg_response_times,
        }
    }

    /// Reset metrics (useful for testing or periodic resets)
    pub fn reset(&self) {
        *self.lock() = GatewayMetrics::default();
    }
}

fn top_entries(values: &HashMap<String, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<_> = values.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(k, v)| (k.clone(), *v))
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub error_rate: f64,
    pub upstream_failures: u64,
    pub uptime_seconds: u64,
    pub avg_response_times: HashMap<String, u64>,
    pub most_accessed_endpoints: Vec<(String, u64)>,
    pub slowest_endpoints: Vec<(String, u64)>,
}

/// Metrics middleware for tracking request performance
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next
) -> Response {
    let start_time = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str())
        .unwrap_or("unmatched")
        .to_string();
    let method = request.method().clone();

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status_code = response.status().as_u16();
    state.metrics.record_request(&path, status_code, duration);

    info!("{} {} completed in {}ms with status {}", method, path, duration.as_millis(), status_code);

    response
}
