//! Metrics collection and reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of codec metrics
#[derive(Debug, Clone)]
pub struct CodecSnapshot {
    pub messages_encoded: u64,
    pub messages_decoded: u64,
    pub framing_errors: u64,
    pub payloads_compressed: u64,
    pub payloads_decompressed: u64,
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_response_time_ms: f64,
    pub uptime_secs: u64,
}

/// Latency histogram buckets (in milliseconds)
const LATENCY_BUCKETS: &[f64] = &[0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0];

/// Histogram for tracking latency distribution
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: Vec<(f64, Arc<AtomicU64>)>,
    sum: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    fn new(buckets: &[f64]) -> Self {
        let bucket_counters = buckets
            .iter()
            .map(|&b| (b, Arc::new(AtomicU64::new(0))))
            .collect();

        Self {
            buckets: bucket_counters,
            sum: Arc::new(AtomicU64::new(0)),
            count: Arc::new(AtomicU64::new(0)),
        }
    }

    fn observe(&self, value_ms: f64) {
        // sum is kept in microseconds to survive sub-millisecond requests
        self.sum.fetch_add((value_ms * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        // cumulative: every bucket >= value is incremented
        for (bucket, counter) in &self.buckets {
            if value_ms <= *bucket {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn export_prometheus(&self, name: &str, help: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} histogram\n", name));

        for (bucket, counter) in &self.buckets {
            let count = counter.load(Ordering::Relaxed);
            output.push_str(&format!("{}_bucket{{le=\"{}\"}} {}\n", name, bucket, count));
        }

        let total_count = self.count.load(Ordering::Relaxed);
        output.push_str(&format!("{}_bucket{{le=\"+Inf\"}} {}\n", name, total_count));

        let sum_ms = self.sum.load(Ordering::Relaxed) as f64 / 1000.0;
        output.push_str(&format!("{}_sum {:.3}\n", name, sum_ms));
        output.push_str(&format!("{}_count {}\n", name, total_count));

        output
    }
}

/// Metrics collector for codec operations served by the gateway
pub struct CodecMetrics {
    start_time: Instant,
    messages_encoded: AtomicU64,
    messages_decoded: AtomicU64,
    framing_errors: AtomicU64,
    payloads_compressed: AtomicU64,
    payloads_decompressed: AtomicU64,
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_response_time_us: AtomicU64,
    request_latency: Histogram,
}

impl CodecMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            messages_encoded: AtomicU64::new(0),
            messages_decoded: AtomicU64::new(0),
            framing_errors: AtomicU64::new(0),
            payloads_compressed: AtomicU64::new(0),
            payloads_decompressed: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            request_latency: Histogram::new(LATENCY_BUCKETS),
        }
    }

    pub fn record_encoded(&self) {
        self.messages_encoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self) {
        self.messages_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compressed(&self) {
        self.payloads_compressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decompressed(&self) {
        self.payloads_decompressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a handled request
    pub fn record_request(&self, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let us = response_time.as_micros() as u64;
        self.total_response_time_us.fetch_add(us, Ordering::Relaxed);
        self.request_latency.observe(us as f64 / 1000.0);
    }

    /// Record a failed request
    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics
    pub fn snapshot(&self) -> CodecSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_response_time_us = self.total_response_time_us.load(Ordering::Relaxed);

        let avg_response_time_ms = if total_requests > 0 {
            total_response_time_us as f64 / total_requests as f64 / 1000.0
        } else {
            0.0
        };

        CodecSnapshot {
            messages_encoded: self.messages_encoded.load(Ordering::Relaxed),
            messages_decoded: self.messages_decoded.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            payloads_compressed: self.payloads_compressed.load(Ordering::Relaxed),
            payloads_decompressed: self.payloads_decompressed.load(Ordering::Relaxed),
            total_requests,
            total_errors: self.total_errors.load(Ordering::Relaxed),
            avg_response_time_ms,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let m = self.snapshot();

        let mut output = format!(
            "# HELP efficode_messages_encoded_total Messages encoded to wire strings\n\
             # TYPE efficode_messages_encoded_total counter\n\
             efficode_messages_encoded_total {}\n\
             \n\
             # HELP efficode_messages_decoded_total Wire strings decoded to messages\n\
             # TYPE efficode_messages_decoded_total counter\n\
             efficode_messages_decoded_total {}\n\
             \n\
             # HELP efficode_framing_errors_total Wire strings rejected by the framer\n\
             # TYPE efficode_framing_errors_total counter\n\
             efficode_framing_errors_total {}\n\
             \n\
             # HELP efficode_payloads_compressed_total Payloads emitted in tagged form\n\
             # TYPE efficode_payloads_compressed_total counter\n\
             efficode_payloads_compressed_total {}\n\
             \n\
             # HELP efficode_payloads_decompressed_total Tagged payloads resolved\n\
             # TYPE efficode_payloads_decompressed_total counter\n\
             efficode_payloads_decompressed_total {}\n\
             \n\
             # HELP efficode_requests_total Total number of requests\n\
             # TYPE efficode_requests_total counter\n\
             efficode_requests_total {}\n\
             \n\
             # HELP efficode_errors_total Total number of failed requests\n\
             # TYPE efficode_errors_total counter\n\
             efficode_errors_total {}\n\
             \n\
             # HELP efficode_avg_response_time_ms Average response time in milliseconds\n\
             # TYPE efficode_avg_response_time_ms gauge\n\
             efficode_avg_response_time_ms {:.2}\n\
             \n\
             # HELP efficode_uptime_seconds Uptime in seconds\n\
             # TYPE efficode_uptime_seconds counter\n\
             efficode_uptime_seconds {}\n\
             \n",
            m.messages_encoded,
            m.messages_decoded,
            m.framing_errors,
            m.payloads_compressed,
            m.payloads_decompressed,
            m.total_requests,
            m.total_errors,
            m.avg_response_time_ms,
            m.uptime_secs,
        );

        output.push_str(&self.request_latency.export_prometheus(
            "efficode_request_duration_ms",
            "Request duration in milliseconds",
        ));

        output
    }
}

impl Default for CodecMetrics {
    fn default() -> Self {
        Self::new()
    }
}
