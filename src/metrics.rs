//! Performance and outcome metrics for the screening service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::{Label, Verdict};

/// Metrics collector for the screening loop.
pub struct ScreeningMetrics {
    /// Total submissions processed (including failed ones)
    pub submissions_processed: AtomicU64,
    /// Verdicts by label
    fraud_verdicts: AtomicU64,
    legitimate_verdicts: AtomicU64,
    /// Recovered failures by stage
    encode_failures: AtomicU64,
    classify_failures: AtomicU64,
    /// Processing times in microseconds
    processing_times: RwLock<Vec<u64>>,
    /// Confidence distribution buckets (0.0-0.1 .. 0.9-1.0)
    confidence_buckets: RwLock<[u64; 10]>,
    /// Start time for throughput calculation
    start_time: Instant,
}

impl ScreeningMetrics {
    pub fn new() -> Self {
        Self {
            submissions_processed: AtomicU64::new(0),
            fraud_verdicts: AtomicU64::new(0),
            legitimate_verdicts: AtomicU64::new(0),
            encode_failures: AtomicU64::new(0),
            classify_failures: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            confidence_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a successful screening.
    pub fn record_verdict(&self, processing_time: Duration, verdict: &Verdict) {
        self.submissions_processed.fetch_add(1, Ordering::Relaxed);

        match verdict.label {
            Label::Fraud => self.fraud_verdicts.fetch_add(1, Ordering::Relaxed),
            Label::Legitimate => self.legitimate_verdicts.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Some(confidence) = verdict.confidence {
            let bucket = (confidence * 10.0).min(9.0) as usize;
            if let Ok(mut buckets) = self.confidence_buckets.write() {
                buckets[bucket] += 1;
            }
        }
    }

    /// Record an encoding failure (unknown label, missing feature, bounds).
    pub fn record_encode_failure(&self) {
        self.submissions_processed.fetch_add(1, Ordering::Relaxed);
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a classifier failure (unavailable model, inference error).
    pub fn record_classify_failure(&self) {
        self.submissions_processed.fetch_add(1, Ordering::Relaxed);
        self.classify_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics.
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Current throughput in submissions per second.
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.submissions_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_confidence_distribution(&self) -> [u64; 10] {
        *self.confidence_buckets.read().unwrap()
    }

    pub fn fraud_count(&self) -> u64 {
        self.fraud_verdicts.load(Ordering::Relaxed)
    }

    pub fn legitimate_count(&self) -> u64 {
        self.legitimate_verdicts.load(Ordering::Relaxed)
    }

    pub fn failure_counts(&self) -> (u64, u64) {
        (
            self.encode_failures.load(Ordering::Relaxed),
            self.classify_failures.load(Ordering::Relaxed),
        )
    }

    /// Log a summary of everything recorded so far.
    pub fn print_summary(&self) {
        let processed = self.submissions_processed.load(Ordering::Relaxed);
        let fraud = self.fraud_count();
        let legitimate = self.legitimate_count();
        let (encode_failures, classify_failures) = self.failure_counts();
        let processing = self.get_processing_stats();

        info!(
            processed = processed,
            fraud = fraud,
            legitimate = legitimate,
            encode_failures = encode_failures,
            classify_failures = classify_failures,
            throughput = format!("{:.1} tx/s", self.get_throughput()),
            "Screening metrics summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Processing time (μs)"
        );

        let buckets = self.get_confidence_distribution();
        let total: u64 = buckets.iter().sum();
        if total > 0 {
            for (i, &count) in buckets.iter().enumerate() {
                let pct = (count as f64 / total as f64) * 100.0;
                info!(
                    bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                    count = count,
                    pct = format!("{:.1}%", pct),
                    "Confidence distribution"
                );
            }
        }
    }
}

impl Default for ScreeningMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that logs a metrics summary on an interval.
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScreeningMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScreeningMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_recording() {
        let metrics = ScreeningMetrics::new();

        metrics.record_verdict(
            Duration::from_micros(120),
            &Verdict::new(Label::Fraud, Some(0.91)),
        );
        metrics.record_verdict(
            Duration::from_micros(80),
            &Verdict::new(Label::Legitimate, Some(0.12)),
        );
        metrics.record_encode_failure();

        assert_eq!(metrics.submissions_processed.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.fraud_count(), 1);
        assert_eq!(metrics.legitimate_count(), 1);
        assert_eq!(metrics.failure_counts(), (1, 0));
    }

    #[test]
    fn test_confidence_buckets() {
        let metrics = ScreeningMetrics::new();

        metrics.record_verdict(
            Duration::from_micros(50),
            &Verdict::new(Label::Fraud, Some(0.95)),
        );
        metrics.record_verdict(
            Duration::from_micros(50),
            &Verdict::new(Label::Fraud, Some(1.0)),
        );
        // No confidence: nothing recorded in the distribution
        metrics.record_verdict(Duration::from_micros(50), &Verdict::new(Label::Fraud, None));

        let buckets = metrics.get_confidence_distribution();
        assert_eq!(buckets[9], 2);
        assert_eq!(buckets.iter().sum::<u64>(), 2);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ScreeningMetrics::new();
        for us in [100u64, 200, 300] {
            metrics.record_verdict(
                Duration::from_micros(us),
                &Verdict::new(Label::Legitimate, None),
            );
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }
}
