//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by mount, method, status
//! - `gateway_request_duration_seconds` (histogram): latency by mount
//!
//! Unmatched requests are recorded under the mount label `none`.
//! Non-standard methods share the method label `other`.
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const REQUEST_DURATION: &str = "gateway_request_duration_seconds";

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Bounded label for a request method.
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "other",
    }
}

/// Record one dispatched request.
pub fn record_request(mount: &str, method: &str, status: u16, start: Instant) {
    counter!(
        REQUESTS_TOTAL,
        "mount" => mount.to_string(),
        "method" => method_label(method),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "mount" => mount.to_string())
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("repos", "GET", 200, Instant::now());
            record_request("none", "GET", 404, Instant::now());
        });

        let rendered = handle.render();
        let repos = rendered
            .lines()
            .find(|l| l.starts_with(REQUESTS_TOTAL) && l.contains(r#"mount="repos""#))
            .unwrap();
        assert!(repos.contains(r#"status="200""#));
        assert!(repos.ends_with(" 1"));
        assert!(rendered.contains(r#"mount="none""#));
        assert!(rendered.contains(REQUEST_DURATION));
    }

    #[test]
    fn test_method_label_is_bounded() {
        assert_eq!(method_label("PATCH"), "PATCH");
        assert_eq!(method_label("get"), "other");
        assert_eq!(method_label("X-RANDOM-1"), "other");

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            for i in 0..50 {
                record_request("repos", &format!("M{i}"), 404, Instant::now());
            }
        });

        let rendered = handle.render();
        let series: Vec<_> = rendered
            .lines()
            .filter(|l| l.starts_with(REQUESTS_TOTAL) && l.contains(r#"mount="repos""#))
            .collect();
        assert_eq!(series.len(), 1);
        assert!(series[0].contains(r#"method="other""#));
        assert!(series[0].ends_with(" 50"));
    }
}
