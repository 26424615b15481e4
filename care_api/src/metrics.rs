//! In-process request metrics with a Prometheus-style text exposition.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SeriesKey {
    method: String,
    path: String,
    status: u16,
}

#[derive(Debug, Clone, Copy, Default)]
struct Series {
    count: u64,
    latency_sum_secs: f64,
}

#[derive(Debug, Default)]
pub struct RequestMetrics {
    series: Mutex<BTreeMap<SeriesKey, Series>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: &str, path: &str, status: u16, latency_secs: f64) {
        let key = SeriesKey {
            method: method.to_string(),
            path: path.to_string(),
            status,
        };
        if let Ok(mut series) = self.series.lock() {
            let entry = series.entry(key).or_default();
            entry.count += 1;
            entry.latency_sum_secs += latency_secs;
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.series
            .lock()
            .map(|s| s.values().map(|v| v.count).sum())
            .unwrap_or(0)
    }

    /// Render the collected counters in Prometheus text format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# HELP care_requests_total Total requests to the CareBridge gateway\n");
        out.push_str("# TYPE care_requests_total counter\n");

        let series = match self.series.lock() {
            Ok(series) => series.clone(),
            Err(_) => return out,
        };

        for (key, value) in &series {
            let _ = writeln!(
                out,
                "care_requests_total{{method=\"{}\",path=\"{}\",status=\"{}\"}} {}",
                key.method, key.path, key.status, value.count
            );
        }

        out.push_str("# HELP care_request_latency_seconds_sum Cumulative request latency\n");
        out.push_str("# TYPE care_request_latency_seconds_sum counter\n");
        for (key, value) in &series {
            let _ = writeln!(
                out,
                "care_request_latency_seconds_sum{{method=\"{}\",path=\"{}\"}} {:.6}",
                key.method, key.path, value.latency_sum_secs
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_renders_series() {
        let metrics = RequestMetrics::new();
        metrics.record("GET", "/health", 200, 0.001);
        metrics.record("GET", "/health", 200, 0.002);
        metrics.record("GET", "/missing", 404, 0.001);

        assert_eq!(metrics.total_requests(), 3);

        let text = metrics.render();
        assert!(text
            .contains("care_requests_total{method=\"GET\",path=\"/health\",status=\"200\"} 2"));
        assert!(text
            .contains("care_requests_total{method=\"GET\",path=\"/missing\",status=\"404\"} 1"));
        assert!(text.contains("care_request_latency_seconds_sum"));
    }
}
